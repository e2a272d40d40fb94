pub mod error;
pub mod task;

pub use error::{CancellationReason, TaskError, WorkError};
pub use task::{Task, TaskFuture, TaskWork};
