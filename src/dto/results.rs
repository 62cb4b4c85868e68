//! Result submission payloads.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::ResultFields,
    dto::validation::{validate_not_blank, validate_teammate},
};

/// Result submitted by a game client when an attempt finishes.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateResultRequest {
    /// Participant name; must not be blank.
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    /// Participant roll number; must not be blank.
    #[validate(custom(function = "validate_not_blank"))]
    pub roll_no: String,
    /// Course of study.
    #[serde(default)]
    pub course: String,
    /// Branch of study.
    #[serde(default)]
    pub branch: String,
    /// Year of study.
    #[serde(default)]
    pub year: String,
    /// Seconds spent on the attempt.
    #[validate(range(min = 0.0))]
    pub time_taken: f64,
    /// CGPA between 0 and 10.
    #[validate(range(min = 0.0, max = 10.0))]
    pub cgpa: Option<f64>,
    /// Teammate roll number for pair entries.
    #[validate(custom(function = "validate_teammate"))]
    pub teammate_roll_no: Option<String>,
}

impl CreateResultRequest {
    /// Build the stored document, stamped with the server's clock.
    pub fn into_fields(self, timestamp: OffsetDateTime) -> ResultFields {
        ResultFields {
            name: self.name.trim().to_string(),
            roll_no: self.roll_no.trim().to_string(),
            course: self.course,
            branch: self.branch,
            year: self.year,
            time_taken: Some(self.time_taken),
            cgpa: self.cgpa,
            teammate_roll_no: self.teammate_roll_no.map(|value| value.trim().to_string()),
            timestamp: Some(timestamp),
        }
    }
}

/// Identifier assigned to a stored result.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateResultResponse {
    /// Identifier of the stored result.
    pub id: Uuid,
}
