use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
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

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, ChangesResponse, CouchResultDocument, DatabaseInfo, END_SUFFIX,
        RevisionOnly, collection_prefix, result_doc_id, seq_param,
    },
};

const ALL_DOCS: &str = "_all_docs";
const CHANGES: &str = "_changes";

/// [`ResultStore`] backed by a CouchDB database, with live snapshots driven by
/// the `_changes` long-poll feed.
#[derive(Clone)]
pub struct CouchResultStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
    longpoll_timeout_ms: u64,
}

impl CouchResultStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            database: Arc::from(config.database),
            auth: config
                .username
                .zip(config.password)
                .map(|(user, pass)| (Arc::from(user), Arc::from(pass))),
            longpoll_timeout_ms: config.longpoll_timeout_ms,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Some((user, pass)) => builder.basic_auth(user.as_ref(), Some(pass.as_ref())),
            None => builder,
        }
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.database_url(), path);
        self.authorized(self.client.request(method, url))
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = self.database_url();
        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::Database {
                database: database.clone(),
                source,
            })?;

        let status = match response.status() {
            StatusCode::NOT_FOUND => {
                self.authorized(self.client.put(&url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::Database {
                        database: database.clone(),
                        source,
                    })?
                    .status()
            }
            other => other,
        };

        if status.is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::DatabaseStatus { database, status })
        }
    }

    async fn send_json<T>(&self, path: &str, builder: RequestBuilder) -> CouchResult<T>
    where
        T: DeserializeOwned,
    {
        let response = builder
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path: path.to_string(),
                status: response.status(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| CouchDaoError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }

    async fn insert(&self, category: Category, fields: ResultFields) -> CouchResult<Uuid> {
        let id = Uuid::new_v4();
        let document = CouchResultDocument::new(category, id, fields);
        let builder = self.request(Method::PUT, &document.id).json(&document);
        self.send_json::<Value>(&document.id, builder).await?;
        Ok(id)
    }

    async fn list(&self, category: Category) -> CouchResult<Vec<ResultEntity>> {
        let prefix = collection_prefix(category);
        let query = [
            ("include_docs", "true".to_string()),
            ("startkey", format!("\"{prefix}\"")),
            ("endkey", format!("\"{prefix}{END_SUFFIX}\"")),
        ];
        let payload: AllDocsResponse = self
            .send_json(ALL_DOCS, self.request(Method::GET, ALL_DOCS).query(&query))
            .await?;

        let mut entities = Vec::with_capacity(payload.rows.len());
        for row in payload.rows {
            let Some(doc) = row.doc else {
                continue;
            };
            match CouchResultDocument::parse(&row.id, &prefix, doc) {
                Ok(entity) => entities.push(entity),
                Err(err) => warn!(%category, error = %err, "skipping unreadable result document"),
            }
        }
        Ok(entities)
    }

    async fn update_seq(&self) -> CouchResult<Value> {
        let url = self.database_url();
        let info: DatabaseInfo = self
            .send_json(&url, self.authorized(self.client.get(&url)))
            .await?;
        Ok(info.update_seq)
    }

    /// Wait for changes after `since`. Returns the new sequence and whether a
    /// change touched `prefix`.
    async fn wait_for_change(&self, since: &Value, prefix: &str) -> CouchResult<(Value, bool)> {
        let query = [
            ("feed", "longpoll".to_string()),
            ("since", seq_param(since)),
            ("timeout", self.longpoll_timeout_ms.to_string()),
        ];
        let changes: ChangesResponse = self
            .send_json(CHANGES, self.request(Method::GET, CHANGES).query(&query))
            .await?;
        let relevant = changes.results.iter().any(|row| row.id.starts_with(prefix));
        Ok((changes.last_seq, relevant))
    }

    async fn open_stream(&self, category: Category) -> CouchResult<SnapshotStream> {
        let mut since = self.update_seq().await?;
        let initial = self.list(category).await?;
        let store = self.clone();
        let prefix = collection_prefix(category);

        let stream = async_stream::stream! {
            yield Ok(initial);
            loop {
                let change = store.wait_for_change(&since, &prefix).await;
                match change {
                    Ok((next, false)) => since = next,
                    Ok((next, true)) => {
                        since = next;
                        match store.list(category).await {
                            Ok(entities) => yield Ok(entities),
                            Err(err) => {
                                yield Err(StorageError::from(err));
                                break;
                            }
                        }
                    }
                    Err(err) => {
                        yield Err(StorageError::from(err));
                        break;
                    }
                }
            }
        };
        Ok(Box::pin(stream))
    }

    async fn remove(&self, category: Category, id: Uuid) -> CouchResult<()> {
        let doc_id = result_doc_id(category, id);
        let response = self
            .request(Method::GET, &doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.clone(),
                source,
            })?;

        let revision = match response.status() {
            StatusCode::NOT_FOUND => {
                debug!(%category, %id, "result already gone");
                return Ok(());
            }
            status if status.is_success() => response
                .json::<RevisionOnly>()
                .await
                .map_err(|source| CouchDaoError::DecodeResponse {
                    path: doc_id.clone(),
                    source,
                })?,
            status => {
                return Err(CouchDaoError::RequestStatus {
                    path: doc_id,
                    status,
                });
            }
        };

        let builder = self
            .request(Method::DELETE, &doc_id)
            .query(&[("rev", revision.rev)]);
        self.send_json::<Value>(&doc_id, builder).await?;
        Ok(())
    }
}

impl ResultStore for CouchResultStore {
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
                    warn!(%category, %id, error = %err, "couchdb delete failed");
                    false
                }
            }
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.update_seq().await?;
            Ok(())
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
