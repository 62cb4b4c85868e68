use std::sync::Arc;

use futures::{StreamExt, TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::{establish_connection, ping},
    error::{MongoDaoError, MongoResult},
    models::{MongoResultDocument, doc_id},
};
use crate::{
    dao::{
        models::{ResultEntity, ResultFields},
        result_store::{ResultStore, SnapshotStream},
        storage::{StorageError, StorageResult},
    },
    leaderboard::Category,
};

/// [`ResultStore`] over one MongoDB collection per category. Live snapshots
/// follow the collection's change stream, which needs a replica set.
#[derive(Clone)]
pub struct MongoResultStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    database: RwLock<Database>,
    config: MongoConfig,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = self.database.read().await.clone();
        ping(&database)
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (_client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        *self.database.write().await = database;
        Ok(())
    }
}

impl MongoResultStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (_client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let store = Self {
            inner: Arc::new(MongoInner {
                database: RwLock::new(database),
                config,
            }),
        };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        for category in Category::ALL {
            let collection = self.raw_collection(category).await;
            let index = IndexModel::builder()
                .keys(doc! {"rollNo": 1})
                .options(
                    IndexOptions::builder()
                        .name(Some("roll_no_idx".to_owned()))
                        .build(),
                )
                .build();

            collection
                .create_index(index)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection: category.collection_name(),
                    index: "rollNo",
                    source,
                })?;
        }
        Ok(())
    }

    async fn collection(&self, category: Category) -> Collection<MongoResultDocument> {
        let guard = self.inner.database.read().await;
        guard.collection(&category.collection_name())
    }

    async fn raw_collection(&self, category: Category) -> Collection<Document> {
        let guard = self.inner.database.read().await;
        guard.collection(&category.collection_name())
    }

    async fn insert(&self, category: Category, fields: ResultFields) -> MongoResult<Uuid> {
        let id = Uuid::new_v4();
        self.collection(category)
            .await
            .insert_one(MongoResultDocument::new(id, fields))
            .await
            .map_err(|source| MongoDaoError::InsertResult {
                collection: category.collection_name(),
                source,
            })?;
        Ok(id)
    }

    async fn list(&self, category: Category) -> MongoResult<Vec<ResultEntity>> {
        // Read raw rows so one foreign document cannot fail the whole listing.
        let documents: Vec<Document> = self
            .raw_collection(category)
            .await
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::ListResults {
                collection: category.collection_name(),
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListResults {
                collection: category.collection_name(),
                source,
            })?;

        Ok(documents
            .into_iter()
            .filter_map(MongoResultDocument::parse)
            .collect())
    }

    async fn open_stream(&self, category: Category) -> MongoResult<SnapshotStream> {
        // Watch before listing so no change between the two is missed.
        let mut changes = Box::pin(
            self.raw_collection(category)
                .await
                .watch()
                .await
                .map_err(|source| MongoDaoError::ChangeStream {
                    collection: category.collection_name(),
                    source,
                })?,
        );
        let initial = self.list(category).await?;
        let store = self.clone();

        let stream = async_stream::stream! {
            yield Ok(initial);
            while let Some(event) = changes.next().await {
                if let Err(source) = event {
                    yield Err(StorageError::from(MongoDaoError::ChangeStream {
                        collection: category.collection_name(),
                        source,
                    }));
                    break;
                }
                match store.list(category).await {
                    Ok(entities) => yield Ok(entities),
                    Err(err) => {
                        yield Err(StorageError::from(err));
                        break;
                    }
                }
            }
            debug!(%category, "MongoDB change stream closed");
        };
        Ok(Box::pin(stream))
    }

    async fn remove(&self, category: Category, id: Uuid) -> MongoResult<()> {
        let result = self
            .raw_collection(category)
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteResult {
                collection: category.collection_name(),
                id,
                source,
            })?;
        if result.deleted_count == 0 {
            debug!(%category, %id, "result already gone");
        }
        Ok(())
    }
}

impl ResultStore for MongoResultStore {
    fn create(
        &self,
        category: Category,
        fields: ResultFields,
    ) -> BoxFuture<'static, StorageResult<Uuid>> {
        let store = self.clone();
        Box::pin(async move { store.insert(category, fields).await.map_err(Into::into) })
    }

    fn list_all(&self, category: Category) -> BoxFuture<'static, StorageResult<Vec<ResultEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list(category).await.map_err(Into::into) })
    }

    fn subscribe(&self, category: Category) -> BoxFuture<'static, StorageResult<SnapshotStream>> {
        let store = self.clone();
        Box::pin(async move { store.open_stream(category).await.map_err(Into::into) })
    }

    fn delete(&self, category: Category, id: Uuid) -> BoxFuture<'static, bool> {
        let store = self.clone();
        Box::pin(async move {
            match store.remove(category, id).await {
                Ok(()) => true,
                Err(err) => {
                    warn!(%category, %id, error = %err, "mongodb delete failed");
                    false
                }
            }
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
