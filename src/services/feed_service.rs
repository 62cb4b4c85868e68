//! Server-Sent Events view over a [`LeaderboardFeed`].
//!
//! Each connection owns its feed. A forwarder task ranks every snapshot the
//! feed publishes and pushes it into a bounded channel that backs the HTTP
//! response; when the client goes away the channel closes and the feed is
//! released.

use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, KeepAliveStream, Sse};
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::{
    dto::{
        admin::LeaderboardResponse,
        sse::{FeedUnavailableEvent, ServerEvent},
    },
    error::ServiceError,
    leaderboard::{
        AdminSession, Category, FeedSnapshot, FeedStatus, LeaderboardFeed, LeaderboardQuery,
    },
    state::SharedState,
};

/// Name of the event carrying a ranked view.
pub const LEADERBOARD_EVENT: &str = "leaderboard";
/// Name of the event announcing that the subscription failed.
pub const UNAVAILABLE_EVENT: &str = "unavailable";

/// Response stream type produced by [`open_stream`].
pub type LeaderboardSse = Sse<KeepAliveStream<ReceiverStream<Result<Event, Infallible>>>>;

/// Open a live feed on `category` and stream its ranked view.
pub async fn open_stream(
    state: &SharedState,
    session: &AdminSession,
    category: Category,
    query: LeaderboardQuery,
) -> Result<LeaderboardSse, ServiceError> {
    let store = state.require_result_store().await?;
    let feed = LeaderboardFeed::open(store, session)?;
    let receiver = feed.watch();
    feed.select(category).await;

    let (tx, rx) = mpsc::channel(state.config().stream_buffer());
    tokio::spawn(forward(feed, receiver, query, tx));
    info!(%category, "leaderboard stream connected");

    Ok(Sse::new(ReceiverStream::new(rx)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

async fn forward(
    feed: LeaderboardFeed,
    mut receiver: watch::Receiver<FeedSnapshot>,
    query: LeaderboardQuery,
    tx: mpsc::Sender<Result<Event, Infallible>>,
) {
    loop {
        let snapshot = receiver.borrow_and_update().clone();
        if let Some(payload) = render(&snapshot, &query) {
            if tx.send(Ok(to_event(payload))).await.is_err() {
                break;
            }
        }

        tokio::select! {
            _ = tx.closed() => break,
            changed = receiver.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    feed.close().await;
    info!("leaderboard stream disconnected");
}

/// Turn a feed snapshot into the event the console should see, if any.
pub fn render(snapshot: &FeedSnapshot, query: &LeaderboardQuery) -> Option<ServerEvent> {
    let category = snapshot.category?;
    let encoded = match snapshot.status {
        FeedStatus::Idle | FeedStatus::Loading => return None,
        FeedStatus::Live => {
            let ranked = query.rank(&snapshot.records);
            let view = LeaderboardResponse::new(category, query, snapshot.records.len(), &ranked);
            debug!(%category, rows = ranked.len(), "pushing leaderboard view");
            ServerEvent::json(LEADERBOARD_EVENT.to_string(), &view)
        }
        FeedStatus::Unavailable => ServerEvent::json(
            UNAVAILABLE_EVENT.to_string(),
            &FeedUnavailableEvent {
                category,
                message: "live results are unavailable; reconnect to retry".into(),
            },
        ),
    };

    match encoded {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(%category, error = %err, "failed to encode leaderboard event");
            None
        }
    }
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}
