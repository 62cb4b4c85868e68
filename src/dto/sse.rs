//! Payloads pushed over the leaderboard event stream.

use serde::Serialize;
use utoipa::ToSchema;

use crate::leaderboard::Category;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE `event:` name.
    pub event: Option<String>,
    /// JSON body for the `data:` field.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Sent when the live subscription failed and the table was emptied.
///
/// The stream stays quiet afterwards; reconnecting reselects the category.
pub struct FeedUnavailableEvent {
    /// Category whose subscription failed.
    pub category: Category,
    /// Operator-facing explanation.
    pub message: String,
}
