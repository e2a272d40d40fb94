use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_WORKER_COUNT: usize = 5;

pub const WORKER_COUNT_ENV: &str = "COMMON_WORKER_COUNT";

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ConfigError {
    #[error("invalid {variable} value '{value}': expected an integer")]
    InvalidWorkerCount {
        variable: &'static str,
        value: String,
    },
}

/// Per-invocation settings for the task runner.
///
/// `worker_count` is signed so that zero and negative requests can be
/// expressed; both fall back to [`DEFAULT_WORKER_COUNT`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub worker_count: i64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT as i64,
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_worker_count(mut self, worker_count: i64) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn effective_worker_count(&self) -> usize {
        if self.worker_count <= 0 {
            DEFAULT_WORKER_COUNT
        } else {
            usize::try_from(self.worker_count).unwrap_or(usize::MAX)
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Same as [`RunConfig::from_env`] with an injectable variable lookup.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(WORKER_COUNT_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                config.worker_count = trimmed
                    .parse()
                    .map_err(|_| ConfigError::InvalidWorkerCount {
                        variable: WORKER_COUNT_ENV,
                        value: raw.clone(),
                    })?;
            }
        }
        Ok(config)
    }
}
