use std::any::Any;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::{JoinHandle, JoinSet};

use crate::concurrency::CancellationContext;
use crate::config::RunConfig;
use crate::models::{Task, TaskError, WorkError};

type SharedQueue = Arc<Mutex<mpsc::Receiver<Task>>>;

/// Runs `tasks` on a pool of `config.effective_worker_count()` workers and
/// returns one error per task that failed, panicked or was skipped because
/// `ctx` was already cancelled when a worker picked it up.
///
/// Cancellation is only checked before a task starts; work already in
/// flight receives `ctx` and is expected to watch it itself. Failures are
/// returned in completion order, not submission order.
///
/// At most `min(effective_worker_count, tasks)` workers are spawned; a
/// larger pool would only add workers that see a closed queue.
///
/// Dropping the returned future aborts every worker together with the task
/// body it is running.
pub async fn run(
    ctx: &CancellationContext,
    config: &RunConfig,
    tasks: impl IntoIterator<Item = Task>,
) -> Vec<TaskError> {
    let tasks: Vec<Task> = tasks.into_iter().collect();
    let task_count = tasks.len();
    let workers = config.effective_worker_count();
    let capacity = task_count.max(1);

    tracing::debug!(task_count, workers, "starting task batch");

    let (queue_tx, queue_rx) = mpsc::channel::<Task>(capacity);
    let (result_tx, mut result_rx) = mpsc::channel::<TaskError>(capacity);
    let queue: SharedQueue = Arc::new(Mutex::new(queue_rx));

    // Workers beyond the task count would only ever observe a closed queue.
    let mut pool = JoinSet::new();
    for worker in 0..workers.min(task_count) {
        pool.spawn(worker_loop(
            worker,
            ctx.clone(),
            queue.clone(),
            result_tx.clone(),
        ));
    }
    drop(result_tx);

    for task in tasks {
        if queue_tx.send(task).await.is_err() {
            break;
        }
    }
    drop(queue_tx);

    while let Some(joined) = pool.join_next().await {
        if let Err(join_error) = joined {
            tracing::error!(error = %join_error, "task runner worker exited abnormally");
        }
    }

    let mut failures = Vec::new();
    while let Some(failure) = result_rx.recv().await {
        failures.push(failure);
    }

    tracing::debug!(task_count, failures = failures.len(), "finished task batch");
    failures
}

pub async fn run_with_default(
    ctx: &CancellationContext,
    tasks: impl IntoIterator<Item = Task>,
) -> Vec<TaskError> {
    run(ctx, &RunConfig::default(), tasks).await
}

async fn worker_loop(
    worker: usize,
    ctx: CancellationContext,
    queue: SharedQueue,
    results: mpsc::Sender<TaskError>,
) {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(task) = next else {
            break;
        };

        if let Some(failure) = execute(worker, &ctx, task).await
            && results.send(failure).await.is_err()
        {
            break;
        }
    }
}

async fn execute(worker: usize, ctx: &CancellationContext, task: Task) -> Option<TaskError> {
    let (name, work) = task.into_parts();

    if let Some(reason) = ctx.reason() {
        tracing::trace!(worker, name = %name, %reason, "skipping task after cancellation");
        return Some(TaskError::Cancelled { name, reason });
    }

    let task_ctx = ctx.clone();
    let mut body = AbortOnDrop(tokio::spawn(async move { work(task_ctx).await }));
    let outcome = (&mut body.0).await;

    match outcome {
        Ok(Ok(())) => None,
        Ok(Err(source)) => {
            tracing::debug!(worker, name = %name, error = %source, "task failed");
            Some(TaskError::Failed { name, source })
        }
        Err(join_error) if join_error.is_panic() => {
            let message = panic_message(join_error.into_panic());
            tracing::error!(worker, name = %name, message = %message, "task panicked");
            Some(TaskError::Panicked { name, message })
        }
        Err(join_error) => {
            tracing::debug!(worker, name = %name, error = %join_error, "task aborted");
            Some(TaskError::Failed {
                name,
                source: Box::new(join_error) as WorkError,
            })
        }
    }
}

/// Ties a task body to the worker awaiting it: aborting the worker aborts the body.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
