use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    dao::models::{ResultEntity, ResultFields},
    leaderboard::Category,
};

use super::error::CouchDaoError;

/// Upper bound used with `_all_docs` key ranges.
pub const END_SUFFIX: &str = "\u{ffff}";

/// Every result lives in one database; the category is encoded in the `_id`.
pub fn collection_prefix(category: Category) -> String {
    format!("{}::", category.collection_name())
}

pub fn result_doc_id(category: Category, id: Uuid) -> String {
    format!("{}{}", collection_prefix(category), id)
}

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseInfo {
    pub update_seq: Value,
}

#[derive(Debug, Deserialize)]
pub struct ChangesResponse {
    #[serde(default)]
    pub results: Vec<ChangeRow>,
    pub last_seq: Value,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRow {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct RevisionOnly {
    #[serde(rename = "_rev")]
    pub rev: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchResultDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub fields: ResultFields,
}

impl CouchResultDocument {
    pub fn new(category: Category, id: Uuid, fields: ResultFields) -> Self {
        Self {
            id: result_doc_id(category, id),
            rev: None,
            fields,
        }
    }

    /// Parse a raw `_all_docs` row body into an entity.
    pub fn parse(doc_id: &str, prefix: &str, value: Value) -> Result<ResultEntity, CouchDaoError> {
        let id = doc_id
            .strip_prefix(prefix)
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| CouchDaoError::InvalidDocId {
                doc_id: doc_id.to_string(),
            })?;
        let document: CouchResultDocument =
            serde_json::from_value(value).map_err(|source| CouchDaoError::DeserializeDocument {
                doc_id: doc_id.to_string(),
                source,
            })?;
        Ok(ResultEntity::new(id, document.fields))
    }
}

/// Render a `since` value as CouchDB expects it in the query string.
pub fn seq_param(seq: &Value) -> String {
    match seq {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
