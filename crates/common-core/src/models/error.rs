use std::error::Error;
use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Error reported by a task's own work. The runner never inspects it.
pub type WorkError = Box<dyn Error + Send + Sync + 'static>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CancellationReason {
    Cancelled,
    DeadlineExceeded,
}

impl Display for CancellationReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => f.write_str("context canceled"),
            Self::DeadlineExceeded => f.write_str("context deadline exceeded"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task \"{name}\" failed: {source}")]
    Failed {
        name: String,
        #[source]
        source: WorkError,
    },

    #[error("task \"{name}\" canceled: {reason}")]
    Cancelled {
        name: String,
        reason: CancellationReason,
    },

    #[error("task \"{name}\" panicked: {message}")]
    Panicked { name: String, message: String },
}

impl TaskError {
    pub fn name(&self) -> &str {
        match self {
            Self::Failed { name, .. }
            | Self::Cancelled { name, .. }
            | Self::Panicked { name, .. } => name,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked { .. })
    }
}
