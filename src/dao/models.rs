//! Result documents shared by every backend.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dao::lenient;

/// Document body of a submitted game attempt, shared by every storage backend.
///
/// Field names follow the camelCase layout the game clients write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResultFields {
    /// Participant display name.
    #[serde(default, deserialize_with = "lenient::text::deserialize")]
    pub name: String,
    /// Participant roll number.
    #[serde(default, deserialize_with = "lenient::text::deserialize")]
    pub roll_no: String,
    /// Course of study.
    #[serde(default, deserialize_with = "lenient::text::deserialize")]
    pub course: String,
    /// Branch of study.
    #[serde(default, deserialize_with = "lenient::text::deserialize")]
    pub branch: String,
    /// Year of study; integers are accepted and kept as text.
    #[serde(default, deserialize_with = "lenient::text::deserialize")]
    pub year: String,
    /// Seconds spent on the attempt; lower is better.
    #[serde(default, deserialize_with = "lenient::number::deserialize")]
    pub time_taken: Option<f64>,
    /// Participant CGPA; higher is better.
    #[serde(default, deserialize_with = "lenient::number::deserialize")]
    pub cgpa: Option<f64>,
    /// Roll number of the teammate, absent for solo entries.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_text::deserialize"
    )]
    pub teammate_roll_no: Option<String>,
    /// Creation time assigned by the server when the result was stored.
    #[serde(
        default,
        serialize_with = "lenient::timestamp::serialize",
        deserialize_with = "lenient::timestamp::deserialize"
    )]
    pub timestamp: Option<OffsetDateTime>,
}

/// A stored result together with the identifier the store assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEntity {
    /// Store-assigned identifier, unique within a category.
    pub id: Uuid,
    /// Document body.
    pub fields: ResultFields,
}

impl ResultEntity {
    /// Pair `fields` with the identifier the store assigned.
    pub fn new(id: Uuid, fields: ResultFields) -> Self {
        Self { id, fields }
    }
}
