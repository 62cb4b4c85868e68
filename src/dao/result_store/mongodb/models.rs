use mongodb::bson::{self, Document, doc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::dao::models::{ResultEntity, ResultFields};

/// Stored shape of a result: the client fields plus a textual UUID `_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoResultDocument {
    /// Textual UUID used as the primary key.
    #[serde(rename = "_id")]
    pub id: String,
    /// Client fields stored alongside the key.
    #[serde(flatten)]
    pub fields: ResultFields,
}

impl MongoResultDocument {
    /// Wrap `fields` under the textual form of `id`.
    pub fn new(id: Uuid, fields: ResultFields) -> Self {
        Self {
            id: id.to_string(),
            fields,
        }
    }

    /// Decode one raw row. Rows this API did not write (an `ObjectId` `_id`,
    /// a body that is not a result) are skipped with a warning instead of
    /// failing the whole listing.
    pub fn parse(document: Document) -> Option<ResultEntity> {
        let raw_id = document.get("_id").cloned();
        match bson::deserialize_from_document::<Self>(document) {
            Ok(parsed) => parsed.into_entity(),
            Err(err) => {
                warn!(doc_id = ?raw_id, error = %err, "skipping unreadable result document");
                None
            }
        }
    }

    /// Documents whose `_id` is not a UUID are skipped with a warning.
    pub fn into_entity(self) -> Option<ResultEntity> {
        match Uuid::parse_str(&self.id) {
            Ok(id) => Some(ResultEntity::new(id, self.fields)),
            Err(_) => {
                warn!(doc_id = %self.id, "skipping result with a non-UUID identifier");
                None
            }
        }
    }
}

/// Filter selecting the document stored under `id`.
pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}
