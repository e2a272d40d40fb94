use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::concurrency::CancellationContext;
use crate::models::WorkError;

pub type TaskFuture = Pin<Box<dyn Future<Output = Result<(), WorkError>> + Send>>;

pub type TaskWork = Box<dyn FnOnce(CancellationContext) -> TaskFuture + Send>;

/// A named unit of work handed to the runner. The name is only used to
/// attribute failures and does not need to be unique.
pub struct Task {
    name: String,
    work: TaskWork,
}

impl Task {
    pub fn new<F, Fut>(name: impl Into<String>, work: F) -> Self
    where
        F: FnOnce(CancellationContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), WorkError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            work: Box::new(move |ctx| Box::pin(work(ctx)) as TaskFuture),
        }
    }

    /// Wraps synchronous work. It runs on the blocking pool but still holds
    /// one worker slot for its whole duration.
    pub fn blocking<F>(name: impl Into<String>, work: F) -> Self
    where
        F: FnOnce(CancellationContext) -> Result<(), WorkError> + Send + 'static,
    {
        Self::new(name, move |ctx| async move {
            match tokio::task::spawn_blocking(move || work(ctx)).await {
                Ok(outcome) => outcome,
                Err(join_error) if join_error.is_panic() => {
                    std::panic::resume_unwind(join_error.into_panic())
                }
                Err(join_error) => Err(Box::new(join_error) as WorkError),
            }
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_parts(self) -> (String, TaskWork) {
        (self.name, self.work)
    }
}

impl Debug for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
