//! Process-local [`ResultStore`] used for demos, local runs and tests.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use dashmap::DashMap;
use futures::{StreamExt, future::BoxFuture};
use indexmap::IndexMap;
use thiserror::Error;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dao::{
        models::{ResultEntity, ResultFields},
        result_store::{ResultStore, SnapshotStream},
        storage::{StorageError, StorageResult},
    },
    leaderboard::Category,
};

/// Failures simulated by the in-memory backend.
#[derive(Debug, Error)]
pub enum MemoryStoreError {
    /// Connectivity was switched off with [`MemoryResultStore::set_online`].
    #[error("in-memory store is offline")]
    Offline,
}

#[derive(Clone)]
enum Frame {
    Snapshot(Arc<Vec<ResultEntity>>),
    Interrupted(String),
}

struct Collection {
    records: IndexMap<Uuid, ResultFields>,
    frames: watch::Sender<Frame>,
}

impl Collection {
    fn new() -> Self {
        let (frames, _receiver) = watch::channel(Frame::Snapshot(Arc::new(Vec::new())));
        Self {
            records: IndexMap::new(),
            frames,
        }
    }

    fn snapshot(&self) -> Vec<ResultEntity> {
        self.records
            .iter()
            .map(|(id, fields)| ResultEntity::new(*id, fields.clone()))
            .collect()
    }

    fn publish(&self) {
        self.frames
            .send_replace(Frame::Snapshot(Arc::new(self.snapshot())));
    }
}

#[derive(Default)]
struct MemoryInner {
    collections: DashMap<Category, Collection>,
    offline: AtomicBool,
}

/// In-memory result collections with watch-based live snapshots.
#[derive(Clone, Default)]
pub struct MemoryResultStore {
    inner: Arc<MemoryInner>,
}

impl MemoryResultStore {
    /// Empty, online store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated connectivity. While offline every operation fails.
    pub fn set_online(&self, online: bool) {
        self.inner.offline.store(!online, Ordering::SeqCst);
    }

    /// Break every open subscription on `category` as a dropped connection would.
    pub fn interrupt(&self, category: Category, reason: impl Into<String>) {
        let collection = self
            .inner
            .collections
            .entry(category)
            .or_insert_with(Collection::new);
        collection
            .frames
            .send_replace(Frame::Interrupted(reason.into()));
    }

    /// Number of results stored for `category`.
    pub fn len(&self, category: Category) -> usize {
        self.inner
            .collections
            .get(&category)
            .map(|collection| collection.records.len())
            .unwrap_or_default()
    }

    /// Number of live subscriptions currently open on `category`.
    pub fn subscriber_count(&self, category: Category) -> usize {
        self.inner
            .collections
            .get(&category)
            .map(|collection| collection.frames.receiver_count())
            .unwrap_or_default()
    }

    fn ensure_online(&self) -> StorageResult<()> {
        if self.inner.offline.load(Ordering::SeqCst) {
            Err(StorageError::unavailable(
                "in-memory store is offline".into(),
                MemoryStoreError::Offline,
            ))
        } else {
            Ok(())
        }
    }

    fn insert(&self, category: Category, fields: ResultFields) -> StorageResult<Uuid> {
        self.ensure_online()?;
        let id = Uuid::new_v4();
        let mut collection = self
            .inner
            .collections
            .entry(category)
            .or_insert_with(Collection::new);
        collection.records.insert(id, fields);
        collection.publish();
        debug!(%category, %id, "result stored in memory");
        Ok(id)
    }

    fn remove(&self, category: Category, id: Uuid) -> bool {
        if let Err(err) = self.ensure_online() {
            warn!(%category, %id, error = %err, "in-memory delete failed");
            return false;
        }

        if let Some(mut collection) = self.inner.collections.get_mut(&category) {
            if collection.records.shift_remove(&id).is_some() {
                collection.publish();
            }
        }
        true
    }

    fn list(&self, category: Category) -> StorageResult<Vec<ResultEntity>> {
        self.ensure_online()?;
        Ok(self
            .inner
            .collections
            .get(&category)
            .map(|collection| collection.snapshot())
            .unwrap_or_default())
    }

    fn open_stream(&self, category: Category) -> StorageResult<SnapshotStream> {
        self.ensure_online()?;
        let receiver = {
            let collection = self
                .inner
                .collections
                .entry(category)
                .or_insert_with(Collection::new);
            // A previous interruption must not poison new subscribers.
            if matches!(*collection.frames.borrow(), Frame::Interrupted(_)) {
                collection.publish();
            }
            collection.frames.subscribe()
        };

        let collection_name = category.collection_name();
        let stream = async_stream::stream! {
            let mut frames = WatchStream::new(receiver);
            while let Some(frame) = frames.next().await {
                match frame {
                    Frame::Snapshot(records) => yield Ok(records.as_ref().clone()),
                    Frame::Interrupted(reason) => {
                        yield Err(StorageError::subscription_lost(collection_name.clone(), reason));
                        break;
                    }
                }
            }
        };
        Ok(Box::pin(stream))
    }
}

impl ResultStore for MemoryResultStore {
    fn create(
        &self,
        category: Category,
        fields: ResultFields,
    ) -> BoxFuture<'static, StorageResult<Uuid>> {
        let store = self.clone();
        Box::pin(async move { store.insert(category, fields) })
    }

    fn list_all(&self, category: Category) -> BoxFuture<'static, StorageResult<Vec<ResultEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list(category) })
    }

    fn subscribe(&self, category: Category) -> BoxFuture<'static, StorageResult<SnapshotStream>> {
        let store = self.clone();
        Box::pin(async move { store.open_stream(category) })
    }

    fn delete(&self, category: Category, id: Uuid) -> BoxFuture<'static, bool> {
        let store = self.clone();
        Box::pin(async move { store.remove(category, id) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_online() })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.health_check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str) -> ResultFields {
        ResultFields {
            name: name.into(),
            roll_no: format!("{name}-roll"),
            time_taken: Some(60.0),
            cgpa: Some(8.0),
            ..ResultFields::default()
        }
    }

    #[tokio::test]
    async fn listing_preserves_insertion_order() {
        let store = MemoryResultStore::new();
        store.create(Category::CodeRush, fields("a")).await.unwrap();
        store.create(Category::CodeRush, fields("b")).await.unwrap();
        store.create(Category::WordHunt, fields("c")).await.unwrap();

        let names: Vec<_> = store
            .list_all(Category::CodeRush)
            .await
            .unwrap()
            .into_iter()
            .map(|entity| entity.fields.name)
            .collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(store.len(Category::WordHunt), 1);
    }

    #[tokio::test]
    async fn subscription_starts_with_current_snapshot_and_sees_deletes() {
        let store = MemoryResultStore::new();
        let id = store.create(Category::TechPicto, fields("a")).await.unwrap();

        let mut stream = store.subscribe(Category::TechPicto).await.unwrap();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 1);

        assert!(store.delete(Category::TechPicto, id).await);
        let second = stream.next().await.unwrap().unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn offline_store_fails_operations() {
        let store = MemoryResultStore::new();
        let id = store.create(Category::CodeRush, fields("a")).await.unwrap();
        store.set_online(false);

        assert!(store.list_all(Category::CodeRush).await.is_err());
        assert!(store.subscribe(Category::CodeRush).await.is_err());
        assert!(!store.delete(Category::CodeRush, id).await);
        assert!(store.health_check().await.is_err());

        store.set_online(true);
        assert!(store.delete(Category::CodeRush, id).await);
    }

    #[tokio::test]
    async fn interruption_ends_stream_with_error() {
        let store = MemoryResultStore::new();
        let mut stream = store.subscribe(Category::WordHunt).await.unwrap();
        assert!(stream.next().await.unwrap().unwrap().is_empty());

        store.interrupt(Category::WordHunt, "connection reset");
        assert!(matches!(
            stream.next().await,
            Some(Err(StorageError::SubscriptionLost { .. }))
        ));
        assert!(stream.next().await.is_none());

        let mut fresh = store.subscribe(Category::WordHunt).await.unwrap();
        assert!(fresh.next().await.unwrap().is_ok());
    }
}
