use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for MongoDB store operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// `MONGO_URI` is not set.
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the variable.
        var: &'static str,
    },
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// URI as configured.
        uri: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The driver rejected the parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The server never answered a ping while connecting.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Pings sent before giving up.
        attempts: u32,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A periodic health ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Creating the `rollNo` index failed.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection name.
        collection: String,
        /// Indexed field.
        index: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Inserting a submission failed.
    #[error("failed to insert result into `{collection}`")]
    InsertResult {
        /// Collection name.
        collection: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Querying a collection failed.
    #[error("failed to list results of `{collection}`")]
    ListResults {
        /// Collection name.
        collection: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Deleting a result failed.
    #[error("failed to delete result `{id}` from `{collection}`")]
    DeleteResult {
        /// Collection name.
        collection: String,
        /// Result identifier.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Opening or reading a change stream failed.
    #[error("change stream on `{collection}` failed")]
    ChangeStream {
        /// Collection name.
        collection: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
}
