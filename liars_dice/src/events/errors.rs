//! Event hub error types.

use thiserror::Error;

/// Event hub errors
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum HubError {
    /// The hub was shut down and takes no new subscribers
    #[error("event hub is shut down")]
    Closed,
}

/// Result type for event hub operations
pub type HubResult<T> = Result<T, HubError>;
