//! Result collections and their live subscriptions.

/// CouchDB backend.
#[cfg(feature = "couch-store")]
pub mod couchdb;
/// In-process backend.
pub mod memory;
/// MongoDB backend.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::{future::BoxFuture, stream::BoxStream};
use uuid::Uuid;

use crate::{
    dao::{
        models::{ResultEntity, ResultFields},
        storage::StorageResult,
    },
    leaderboard::Category,
};

/// Live sequence of whole-collection snapshots.
///
/// The first item is the collection as it stands when the subscription opens;
/// every later item replaces it entirely. Dropping the stream unsubscribes. An
/// `Err` item is terminal.
pub type SnapshotStream = BoxStream<'static, StorageResult<Vec<ResultEntity>>>;

/// Abstraction over the hosted document collections holding game results,
/// one collection per [`Category`].
pub trait ResultStore: Send + Sync {
    /// Persist a new result and return the identifier assigned to it.
    fn create(&self, category: Category, fields: ResultFields)
    -> BoxFuture<'static, StorageResult<Uuid>>;
    /// Fetch every result currently stored for `category`.
    fn list_all(&self, category: Category) -> BoxFuture<'static, StorageResult<Vec<ResultEntity>>>;
    /// Open a live subscription delivering whole-collection snapshots.
    fn subscribe(&self, category: Category) -> BoxFuture<'static, StorageResult<SnapshotStream>>;
    /// Remove a result. Resolves to `false` when the backend failed the delete;
    /// failures are logged by the backend rather than returned.
    fn delete(&self, category: Category, id: Uuid) -> BoxFuture<'static, bool>;
    /// Cheap round trip used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the connection in place after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
