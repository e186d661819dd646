//! Error types for the review scheduler.
//!
//! Every failure is reported synchronously to the immediate caller. Nothing here
//! is retried internally.

use thiserror::Error;

/// All error types that can occur while scheduling reviews.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Grade outside 1..=5, empty identity field, malformed timestamp
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A review was submitted for a card that was never registered
    #[error("Card not found: {user_id}/{collection_id}/{card_name}")]
    NotFound {
        user_id: String,
        collection_id: String,
        card_name: String,
    },

    /// The durable store could not be reached or failed the operation.
    /// Constraint violations are reported as `InvalidArgument` instead.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[source] rusqlite::Error),

    /// A grade was submitted to a study session that has no cards left
    #[error("Study session is complete")]
    SessionComplete,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchedulerError {
    /// Builds a `NotFound` for the given identity.
    pub fn not_found(user_id: &str, collection_id: &str, card_name: &str) -> Self {
        SchedulerError::NotFound {
            user_id: user_id.to_string(),
            collection_id: collection_id.to_string(),
            card_name: card_name.to_string(),
        }
    }
}

impl From<rusqlite::Error> for SchedulerError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, ref message)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                SchedulerError::InvalidArgument(
                    message.clone().unwrap_or_else(|| failure.to_string()),
                )
            }
            other => SchedulerError::StoreUnavailable(other),
        }
    }
}

/// Result type alias for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;
