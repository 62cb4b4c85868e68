//! DTO definitions used by the admin REST API and documentation layer.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{format_timestamp, validation::validate_not_blank},
    leaderboard::{
        Category, LeaderboardQuery, RankedEntry, SortKey, SortOrder, SortSpec, format_time,
    },
};

/// Credentials submitted from the admin login form.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    /// Operator identifier.
    #[validate(custom(function = "validate_not_blank"))]
    pub id: String,
    /// Operator key.
    #[validate(custom(function = "validate_not_blank"))]
    pub key: String,
}

/// Session token returned once an operator is admitted.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Value to send in the `X-Admin-Token` header.
    pub token: String,
    /// Identifier the operator signed in with.
    pub admin_id: String,
}

/// Search and sort options accepted by the leaderboard endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQueryParams {
    /// Case-insensitive substring matched against name and roll number.
    pub search: Option<String>,
    /// Column to rank by, `time_taken` when omitted.
    pub sort_by: Option<SortKey>,
    /// Direction of the primary column, `asc` when omitted.
    pub order: Option<SortOrder>,
}

impl From<LeaderboardQueryParams> for LeaderboardQuery {
    fn from(params: LeaderboardQueryParams) -> Self {
        let sort = SortSpec::new(
            params.sort_by.unwrap_or_default(),
            params.order.unwrap_or_default(),
        );
        LeaderboardQuery::new(params.search.unwrap_or_default(), sort)
    }
}

/// One row of the ranked table.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RankedEntryDto {
    /// 1-based position in this view.
    pub rank: usize,
    /// Identifier accepted by the delete route.
    pub id: Uuid,
    /// Participant name.
    pub name: String,
    /// Participant roll number.
    pub roll_no: String,
    /// Course of study.
    pub course: String,
    /// Branch of study.
    pub branch: String,
    /// Year of study.
    pub year: String,
    /// Seconds taken, omitted when unknown.
    pub time_taken: Option<f64>,
    /// `m:ss` rendering of `time_taken`, `-` when unknown.
    pub time_display: String,
    /// CGPA, omitted when unknown.
    pub cgpa: Option<f64>,
    /// Teammate roll number, omitted for solo entries.
    pub teammate_roll_no: Option<String>,
    /// RFC 3339 submission time.
    pub timestamp: Option<String>,
    /// Ranks 1 to 3 get highlighted.
    pub podium: bool,
}

impl From<&RankedEntry> for RankedEntryDto {
    fn from(entry: &RankedEntry) -> Self {
        let record = &entry.record;
        Self {
            rank: entry.rank,
            id: record.id,
            name: record.name.clone(),
            roll_no: record.roll_no.clone(),
            course: record.course.clone(),
            branch: record.branch.clone(),
            year: record.year.clone(),
            time_taken: record.time_taken,
            time_display: format_time(record.time_taken),
            cgpa: record.cgpa,
            teammate_roll_no: record.teammate_roll_no.clone(),
            timestamp: record.timestamp.map(format_timestamp),
            podium: entry.is_podium(),
        }
    }
}

/// Ranked, filtered view of one category.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    /// Category shown.
    pub category: Category,
    /// Ordering applied.
    pub sort: SortSpec,
    /// Search term applied, empty for none.
    pub search: String,
    /// Number of results in the category before filtering.
    pub total: usize,
    /// Matching results in rank order.
    pub entries: Vec<RankedEntryDto>,
}

impl LeaderboardResponse {
    /// Render `entries` ranked for `query`.
    pub fn new(
        category: Category,
        query: &LeaderboardQuery,
        total: usize,
        entries: &[RankedEntry],
    ) -> Self {
        Self {
            category,
            sort: query.sort,
            search: query.search.clone(),
            total,
            entries: entries.iter().map(RankedEntryDto::from).collect(),
        }
    }
}
