//! HTTP payloads and their validation rules.

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Admin console payloads.
pub mod admin;
/// Category listing.
pub mod catalog;
/// Health check payloads.
pub mod health;
/// Result submission payloads.
pub mod results;
/// Server-Sent Event payloads.
pub mod sse;
/// Custom validator rules.
pub mod validation;

fn format_timestamp(time: OffsetDateTime) -> String {
    time.format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
