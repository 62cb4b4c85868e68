//! Live, always-current record set for one selected category.
//!
//! Every `select`/`close` opens a new generation. The generation lives inside
//! the watched snapshot itself, so retiring a subscription and rejecting its
//! late deliveries happen under the same lock: a pump task only writes when the
//! snapshot it is about to replace still carries its own generation.

use std::sync::Arc;

use futures::StreamExt;
use tokio::{
    sync::{Mutex, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    dao::result_store::{ResultStore, SnapshotStream},
    error::ServiceError,
    leaderboard::{Category, record::ResultRecord, session::AdminSession},
};

/// Lifecycle of the feed's current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// No category selected.
    Idle,
    /// Subscription requested, first snapshot not delivered yet.
    Loading,
    /// Snapshot reflects the store.
    Live,
    /// Subscription failed; the record set is empty until the category is reselected.
    Unavailable,
}

/// What observers of a [`LeaderboardFeed`] see.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    /// Bumped by every `select` and `close`.
    pub generation: u64,
    /// Selected category, `None` while idle.
    pub category: Option<Category>,
    /// Lifecycle of this snapshot.
    pub status: FeedStatus,
    /// Records of the selected category in store order, unranked.
    pub records: Arc<Vec<ResultRecord>>,
}

impl FeedSnapshot {
    fn empty(generation: u64, category: Option<Category>, status: FeedStatus) -> Self {
        Self {
            generation,
            category,
            status,
            records: Arc::new(Vec::new()),
        }
    }
}

struct ActiveSubscription {
    category: Category,
    generation: u64,
    pump: JoinHandle<()>,
}

impl ActiveSubscription {
    async fn stop(self) {
        self.pump.abort();
        // Wait for the pump so the store stream is dropped before anything new opens.
        let _ = self.pump.await;
        debug!(
            category = %self.category,
            generation = self.generation,
            "leaderboard subscription released"
        );
    }
}

/// Keeps the result set of one category current through a live store subscription.
pub struct LeaderboardFeed {
    store: Arc<dyn ResultStore>,
    snapshot: Arc<watch::Sender<FeedSnapshot>>,
    active: Mutex<Option<ActiveSubscription>>,
}

impl LeaderboardFeed {
    /// Create an idle feed. Only admitted operators may open one.
    pub fn open(store: Arc<dyn ResultStore>, session: &AdminSession) -> Result<Self, ServiceError> {
        session.require_admitted()?;
        let (sender, _receiver) = watch::channel(FeedSnapshot::empty(0, None, FeedStatus::Idle));
        Ok(Self {
            store,
            snapshot: Arc::new(sender),
            active: Mutex::new(None),
        })
    }

    /// Observe snapshot replacements.
    pub fn watch(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot.subscribe()
    }

    /// Copy of the snapshot observers currently see.
    pub fn current(&self) -> FeedSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Switch the feed to `category`.
    ///
    /// The previous subscription is retired and fully released before the new
    /// one is requested. Concurrent `select`/`close` calls are serialized.
    pub async fn select(&self, category: Category) {
        let mut active = self.active.lock().await;
        let generation = self.advance(Some(category), FeedStatus::Loading);
        if let Some(previous) = active.take() {
            previous.stop().await;
        }

        match self.store.subscribe(category).await {
            Ok(stream) => {
                let pump = tokio::spawn(pump(self.snapshot.clone(), generation, category, stream));
                info!(%category, generation, "leaderboard subscription opened");
                *active = Some(ActiveSubscription {
                    category,
                    generation,
                    pump,
                });
            }
            Err(err) => {
                warn!(%category, error = %err, "failed to open leaderboard subscription; showing empty set");
                deliver(&self.snapshot, generation, |current| {
                    current.status = FeedStatus::Unavailable;
                });
            }
        }
    }

    /// Release the subscription and return to idle. Safe to call repeatedly.
    pub async fn close(&self) {
        let mut active = self.active.lock().await;
        let previous = active.take();
        if previous.is_none() && self.snapshot.borrow().status == FeedStatus::Idle {
            return;
        }

        self.advance(None, FeedStatus::Idle);
        if let Some(previous) = previous {
            previous.stop().await;
        }
    }

    /// Start a new generation, clearing the records observers see.
    fn advance(&self, category: Option<Category>, status: FeedStatus) -> u64 {
        let mut next = 0;
        self.snapshot.send_modify(|current| {
            next = current.generation + 1;
            *current = FeedSnapshot::empty(next, category, status);
        });
        next
    }
}

impl Drop for LeaderboardFeed {
    fn drop(&mut self) {
        if let Some(active) = self.active.get_mut().take() {
            active.pump.abort();
        }
    }
}

/// Apply `update` only if the snapshot still belongs to `generation`.
fn deliver(
    snapshot: &watch::Sender<FeedSnapshot>,
    generation: u64,
    update: impl FnOnce(&mut FeedSnapshot),
) -> bool {
    snapshot.send_if_modified(|current| {
        if current.generation != generation {
            return false;
        }
        update(current);
        true
    })
}

async fn pump(
    snapshot: Arc<watch::Sender<FeedSnapshot>>,
    generation: u64,
    category: Category,
    mut stream: SnapshotStream,
) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(entities) => {
                let records: Vec<ResultRecord> = entities.into_iter().map(Into::into).collect();
                let count = records.len();
                let delivered = deliver(&snapshot, generation, |current| {
                    current.status = FeedStatus::Live;
                    current.records = Arc::new(records);
                });
                if !delivered {
                    debug!(%category, generation, "dropping snapshot for retired subscription");
                    return;
                }
                debug!(%category, count, "leaderboard snapshot delivered");
            }
            Err(err) => {
                warn!(%category, error = %err, "leaderboard subscription failed; showing empty set");
                deliver(&snapshot, generation, |current| {
                    current.status = FeedStatus::Unavailable;
                    current.records = Arc::new(Vec::new());
                });
                return;
            }
        }
    }
    debug!(%category, generation, "leaderboard subscription ended by store");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;
    use crate::dao::{models::ResultFields, result_store::memory::MemoryResultStore};

    fn admitted() -> AdminSession {
        AdminSession::Admitted {
            admin_id: "judge".into(),
        }
    }

    fn fields(name: &str, time_taken: f64) -> ResultFields {
        ResultFields {
            name: name.into(),
            roll_no: name.to_uppercase(),
            time_taken: Some(time_taken),
            cgpa: Some(8.0),
            ..ResultFields::default()
        }
    }

    async fn wait_for(
        receiver: &mut watch::Receiver<FeedSnapshot>,
        predicate: impl Fn(&FeedSnapshot) -> bool,
    ) -> FeedSnapshot {
        timeout(Duration::from_secs(2), receiver.wait_for(|s| predicate(s)))
            .await
            .expect("feed did not reach the expected state")
            .expect("feed sender dropped")
            .clone()
    }

    fn names(snapshot: &FeedSnapshot) -> Vec<String> {
        snapshot.records.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn anonymous_sessions_cannot_open_a_feed() {
        let store = Arc::new(MemoryResultStore::new());
        let result = LeaderboardFeed::open(store, &AdminSession::Anonymous);
        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn select_delivers_current_records_then_changes() {
        let store = MemoryResultStore::new();
        store.create(Category::CodeRush, fields("asha", 90.0)).await.unwrap();

        let feed = LeaderboardFeed::open(Arc::new(store.clone()), &admitted()).unwrap();
        let mut receiver = feed.watch();
        feed.select(Category::CodeRush).await;

        let live = wait_for(&mut receiver, |s| s.status == FeedStatus::Live).await;
        assert_eq!(live.category, Some(Category::CodeRush));
        assert_eq!(names(&live), ["asha"]);

        store.create(Category::CodeRush, fields("ravi", 70.0)).await.unwrap();
        let grown = wait_for(&mut receiver, |s| s.records.len() == 2).await;
        assert_eq!(names(&grown), ["asha", "ravi"]);
    }

    #[tokio::test]
    async fn deleted_record_disappears_without_refresh() {
        let store = MemoryResultStore::new();
        let doomed = store.create(Category::TechPicto, fields("gone", 10.0)).await.unwrap();
        store.create(Category::TechPicto, fields("kept", 20.0)).await.unwrap();

        let feed = LeaderboardFeed::open(Arc::new(store.clone()), &admitted()).unwrap();
        let mut receiver = feed.watch();
        feed.select(Category::TechPicto).await;
        wait_for(&mut receiver, |s| s.records.len() == 2).await;

        assert!(store.delete(Category::TechPicto, doomed).await);
        let after = wait_for(&mut receiver, |s| s.records.len() == 1).await;
        assert_eq!(names(&after), ["kept"]);
        assert!(after.records.iter().all(|r| r.id != doomed));
    }

    #[tokio::test]
    async fn switching_category_never_shows_previous_records() {
        let store = MemoryResultStore::new();
        store.create(Category::CodeRush, fields("rush", 10.0)).await.unwrap();
        store.create(Category::WordHunt, fields("hunt", 20.0)).await.unwrap();

        let feed = LeaderboardFeed::open(Arc::new(store.clone()), &admitted()).unwrap();
        feed.select(Category::CodeRush).await;
        let mut receiver = feed.watch();
        wait_for(&mut receiver, |s| s.status == FeedStatus::Live).await;

        feed.select(Category::WordHunt).await;
        let switched = feed.current();
        assert_eq!(switched.category, Some(Category::WordHunt));
        assert!(switched.records.iter().all(|r| r.name != "rush"));

        // Writes to the old category must not reach the feed any more.
        store.create(Category::CodeRush, fields("late", 5.0)).await.unwrap();
        let live = wait_for(&mut receiver, |s| s.status == FeedStatus::Live).await;
        assert_eq!(names(&live), ["hunt"]);

        store.create(Category::WordHunt, fields("second", 30.0)).await.unwrap();
        let updated = wait_for(&mut receiver, |s| s.records.len() == 2).await;
        assert_eq!(updated.category, Some(Category::WordHunt));
        assert!(updated.records.iter().all(|r| r.name != "rush" && r.name != "late"));
    }

    #[tokio::test]
    async fn subscription_error_surfaces_empty_set_without_retry() {
        let store = MemoryResultStore::new();
        store.create(Category::CodeDebugging, fields("bug", 42.0)).await.unwrap();

        let feed = LeaderboardFeed::open(Arc::new(store.clone()), &admitted()).unwrap();
        let mut receiver = feed.watch();
        feed.select(Category::CodeDebugging).await;
        wait_for(&mut receiver, |s| s.status == FeedStatus::Live).await;

        store.interrupt(Category::CodeDebugging, "connection reset");
        let failed = wait_for(&mut receiver, |s| s.status == FeedStatus::Unavailable).await;
        assert!(failed.records.is_empty());

        store.create(Category::CodeDebugging, fields("after", 1.0)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(feed.current().status, FeedStatus::Unavailable);

        feed.select(Category::CodeDebugging).await;
        let recovered = wait_for(&mut receiver, |s| s.status == FeedStatus::Live).await;
        assert_eq!(recovered.records.len(), 2);
    }

    #[tokio::test]
    async fn unreachable_store_marks_feed_unavailable() {
        let store = MemoryResultStore::new();
        store.set_online(false);

        let feed = LeaderboardFeed::open(Arc::new(store), &admitted()).unwrap();
        feed.select(Category::WordHunt).await;

        let snapshot = feed.current();
        assert_eq!(snapshot.status, FeedStatus::Unavailable);
        assert_eq!(snapshot.category, Some(Category::WordHunt));
        assert!(snapshot.records.is_empty());
    }

    #[tokio::test]
    async fn close_is_idempotent_and_stops_updates() {
        let store = MemoryResultStore::new();
        let feed = LeaderboardFeed::open(Arc::new(store.clone()), &admitted()).unwrap();

        feed.close().await;
        assert_eq!(feed.current().generation, 0);

        feed.select(Category::CodeRush).await;
        let mut receiver = feed.watch();
        wait_for(&mut receiver, |s| s.status == FeedStatus::Live).await;

        feed.close().await;
        let closed = feed.current();
        assert_eq!(closed.status, FeedStatus::Idle);
        assert_eq!(closed.category, None);

        feed.close().await;
        assert_eq!(feed.current().generation, closed.generation);

        store.create(Category::CodeRush, fields("ignored", 1.0)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(feed.current().records.is_empty());
    }

    fn open_subscriptions(store: &MemoryResultStore) -> usize {
        Category::ALL
            .iter()
            .map(|category| store.subscriber_count(*category))
            .sum()
    }

    #[tokio::test]
    async fn concurrent_selects_leave_a_single_subscription() {
        let store = MemoryResultStore::new();
        store.create(Category::CodeRush, fields("rush", 10.0)).await.unwrap();
        store.create(Category::WordHunt, fields("hunt", 20.0)).await.unwrap();

        let feed = LeaderboardFeed::open(Arc::new(store.clone()), &admitted()).unwrap();
        let mut receiver = feed.watch();
        tokio::join!(
            feed.select(Category::CodeRush),
            feed.select(Category::WordHunt)
        );

        let live = wait_for(&mut receiver, |s| s.status == FeedStatus::Live).await;
        let winner = live.category.expect("one category stays selected");
        let (loser, expected) = if winner == Category::CodeRush {
            (Category::WordHunt, "rush")
        } else {
            (Category::CodeRush, "hunt")
        };
        assert_eq!(names(&live), [expected]);
        assert_eq!(store.subscriber_count(winner), 1);
        assert_eq!(open_subscriptions(&store), 1);

        store.create(loser, fields("stray", 1.0)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let settled = feed.current();
        assert_eq!(settled.category, Some(winner));
        assert_eq!(names(&settled), [expected]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_select_and_close_never_leak_subscriptions() {
        let store = MemoryResultStore::new();
        store.create(Category::CodeRush, fields("rush", 10.0)).await.unwrap();
        store.create(Category::WordHunt, fields("hunt", 20.0)).await.unwrap();
        let feed = Arc::new(LeaderboardFeed::open(Arc::new(store.clone()), &admitted()).unwrap());

        let tasks: Vec<_> = (0..24)
            .map(|round| {
                let feed = feed.clone();
                tokio::spawn(async move {
                    match round % 3 {
                        0 => feed.select(Category::CodeRush).await,
                        1 => feed.select(Category::WordHunt).await,
                        _ => feed.close().await,
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let current = feed.current();
        match current.category {
            Some(category) => {
                assert_eq!(store.subscriber_count(category), 1);
                assert_eq!(open_subscriptions(&store), 1);
                let mut receiver = feed.watch();
                let live = wait_for(&mut receiver, |s| s.status == FeedStatus::Live).await;
                assert!(live.records.iter().all(|r| {
                    r.name == if category == Category::CodeRush { "rush" } else { "hunt" }
                }));
            }
            None => {
                assert_eq!(current.status, FeedStatus::Idle);
                assert_eq!(open_subscriptions(&store), 0);
            }
        }

        feed.close().await;
        assert_eq!(open_subscriptions(&store), 0);
    }

    #[test]
    fn retired_generation_cannot_deliver() {
        let (sender, _receiver) = watch::channel(FeedSnapshot::empty(
            3,
            Some(Category::CodeRush),
            FeedStatus::Loading,
        ));

        assert!(!deliver(&sender, 2, |current| current.status = FeedStatus::Live));
        assert_eq!(sender.borrow().status, FeedStatus::Loading);

        assert!(deliver(&sender, 3, |current| current.status = FeedStatus::Live));
        assert_eq!(sender.borrow().status, FeedStatus::Live);
    }
}
