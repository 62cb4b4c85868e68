//! Backend-agnostic storage errors.

use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by result stores regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connectivity or permission failure reported by the backend.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Backend-prefixed description.
        message: String,
        /// Backend error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A live subscription stopped delivering snapshots.
    #[error("subscription to `{collection}` lost: {reason}")]
    SubscriptionLost {
        /// Collection the subscription watched.
        collection: String,
        /// Why it stopped.
        reason: String,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct an error describing an interrupted live subscription.
    pub fn subscription_lost(collection: impl Into<String>, reason: impl Into<String>) -> Self {
        StorageError::SubscriptionLost {
            collection: collection.into(),
            reason: reason.into(),
        }
    }
}
