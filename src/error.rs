use std::error::Error as StdError;

use thiserror::Error;

pub type ScheduleResult<T> = Result<T, ScheduleError>;

#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Missing or unrecognised telescope selector.
    #[error("{0}")]
    Configuration(String),

    /// Malformed or missing semester code or date.
    #[error("Wrong format: {0}")]
    Format(String),

    /// Repository read or write failure.
    #[error("Storage fault: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// The schedule changed between the view the form came from and the edit.
    #[error("Schedule was modified by someone else since revision {submitted}")]
    StaleEdit { submitted: String },
}

impl ScheduleError {
    /// Wraps a backend error, keeping it as the source.
    pub fn storage<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        ScheduleError::Storage {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn storage_msg<S: ToString>(message: S) -> Self {
        ScheduleError::Storage {
            message: message.to_string(),
            source: None,
        }
    }
}
