//! CSV rendering of a ranked leaderboard.

use thiserror::Error;
use time::Date;

use crate::leaderboard::{Category, record::RankedEntry};

/// Header row written at the top of every export.
pub const EXPORT_HEADERS: [&str; 9] = [
    "Rank", "Name", "Roll No", "Course", "Branch", "Year", "Time (s)", "CGPA", "Teammate",
];
/// Placeholder written for solo entries.
pub const SOLO_PLACEHOLDER: &str = "-";

/// Failures while producing the CSV document.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A row could not be written.
    #[error("failed to write csv record")]
    Write(#[from] csv::Error),
    /// The writer could not be flushed into its buffer.
    #[error("failed to flush csv output")]
    Flush(#[source] std::io::Error),
    /// The encoded bytes were not UTF-8.
    #[error("csv output is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Encode `entries` as RFC 4180 CSV, quoting fields that contain the
/// delimiter, quotes or line breaks.
pub fn encode(entries: &[RankedEntry]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADERS)?;

    for entry in entries {
        let record = &entry.record;
        writer.write_record([
            entry.rank.to_string(),
            record.name.clone(),
            record.roll_no.clone(),
            record.course.clone(),
            record.branch.clone(),
            record.year.clone(),
            number_cell(record.time_taken),
            number_cell(record.cgpa),
            record
                .teammate_roll_no
                .clone()
                .unwrap_or_else(|| SOLO_PLACEHOLDER.to_string()),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Download name for an export produced on `date`, e.g. `coderush_results_2026-01-31.csv`.
pub fn export_file_name(category: Category, date: Date) -> String {
    format!(
        "{}_results_{:04}-{:02}-{:02}.csv",
        category.store_key(),
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

fn number_cell(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}
