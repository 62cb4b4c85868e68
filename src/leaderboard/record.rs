//! Leaderboard view of a stored result.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::dao::models::ResultEntity;

/// Sort value used for a missing or non-numeric `time_taken`: slower than any real attempt.
pub const MISSING_TIME_SENTINEL: f64 = f64::INFINITY;
/// Sort value used for a missing or non-numeric `cgpa`: lower than any real score.
pub const MISSING_CGPA_SENTINEL: f64 = f64::NEG_INFINITY;

/// One submitted game attempt as seen by the leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// Store-assigned identifier.
    pub id: Uuid,
    /// Participant name; searched case-insensitively.
    pub name: String,
    /// Roll number; searched case-insensitively.
    pub roll_no: String,
    /// Course of study.
    pub course: String,
    /// Branch of study.
    pub branch: String,
    /// Year of study, as written by the client.
    pub year: String,
    /// Seconds taken, absent when missing or non-numeric.
    pub time_taken: Option<f64>,
    /// CGPA, absent when missing or non-numeric.
    pub cgpa: Option<f64>,
    /// Teammate roll number for pair entries.
    pub teammate_roll_no: Option<String>,
    /// Server time at submission.
    pub timestamp: Option<OffsetDateTime>,
}

impl ResultRecord {
    /// Value compared when ranking by time.
    pub fn time_key(&self) -> f64 {
        finite(self.time_taken).unwrap_or(MISSING_TIME_SENTINEL)
    }

    /// Value compared when ranking by CGPA.
    pub fn cgpa_key(&self) -> f64 {
        finite(self.cgpa).unwrap_or(MISSING_CGPA_SENTINEL)
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite())
}

impl From<ResultEntity> for ResultRecord {
    fn from(entity: ResultEntity) -> Self {
        let fields = entity.fields;
        Self {
            id: entity.id,
            name: fields.name,
            roll_no: fields.roll_no,
            course: fields.course,
            branch: fields.branch,
            year: fields.year,
            time_taken: finite(fields.time_taken),
            cgpa: finite(fields.cgpa),
            teammate_roll_no: fields.teammate_roll_no.filter(|value| !value.is_empty()),
            timestamp: fields.timestamp,
        }
    }
}

/// A record with its 1-based position in the current ranked view.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    /// 1-based position.
    pub rank: usize,
    /// Ranked record.
    pub record: ResultRecord,
}

impl RankedEntry {
    /// Whether the entry holds one of the three podium places.
    pub fn is_podium(&self) -> bool {
        self.rank <= 3
    }
}

/// Render seconds as `m:ss` with floored minutes and seconds, or `-` when unknown.
pub fn format_time(seconds: Option<f64>) -> String {
    match finite(seconds) {
        Some(seconds) => {
            let whole = seconds.max(0.0).floor() as u64;
            format!("{}:{:02}", whole / 60, whole % 60)
        }
        None => "-".to_string(),
    }
}
