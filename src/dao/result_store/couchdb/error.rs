//! Error types shared by the CouchDB storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`CouchDaoError`] failures.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures that can occur while interacting with CouchDB.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// A required `COUCH_*` variable is not set.
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the variable.
        var: &'static str,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The database could not be reached or created.
    #[error("failed to reach CouchDB database `{database}`")]
    Database {
        /// Database name.
        database: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// Creating or checking the database returned an unexpected status.
    #[error("unexpected CouchDB database response status {status} for `{database}`")]
    DatabaseStatus {
        /// Database name.
        database: String,
        /// Status returned by the server.
        status: StatusCode,
    },
    /// A request never reached the server.
    #[error("failed to send CouchDB request to `{path}`")]
    RequestSend {
        /// Request path below the server URL.
        path: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with an unexpected status.
    #[error("unexpected CouchDB response status {status} for `{path}`")]
    RequestStatus {
        /// Request path below the server URL.
        path: String,
        /// Status returned by the server.
        status: StatusCode,
    },
    /// The response body was not the expected JSON.
    #[error("failed to decode CouchDB response for `{path}`")]
    DecodeResponse {
        /// Request path below the server URL.
        path: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// A stored document could not be read as a result.
    #[error("failed to deserialize CouchDB document `{doc_id}`")]
    DeserializeDocument {
        /// Full document id.
        doc_id: String,
        /// Decoding error.
        #[source]
        source: serde_json::Error,
    },
    /// A document under a result prefix does not end in a UUID.
    #[error("invalid document ID `{doc_id}`")]
    InvalidDocId {
        /// Full document id.
        doc_id: String,
    },
}

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        StorageError::unavailable(format!("couchdb: {err}"), err)
    }
}
