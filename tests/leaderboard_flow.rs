use std::{sync::Arc, time::Duration};

use leaderboard_admin_back::{
    dao::{
        models::ResultFields,
        result_store::{ResultStore, memory::MemoryResultStore},
    },
    leaderboard::{
        AdminCredentials, AdminSession, Category, FeedSnapshot, FeedStatus, LeaderboardFeed,
        LeaderboardQuery, SortKey, SortOrder, SortSpec, export,
    },
};
use tokio::{sync::watch, time::timeout};

fn attempt(name: &str, roll_no: &str, time_taken: Option<f64>, cgpa: Option<f64>) -> ResultFields {
    ResultFields {
        name: name.into(),
        roll_no: roll_no.into(),
        course: "BTech".into(),
        branch: "CSE".into(),
        year: "2".into(),
        time_taken,
        cgpa,
        ..ResultFields::default()
    }
}

async fn next_live(receiver: &mut watch::Receiver<FeedSnapshot>, len: usize) -> FeedSnapshot {
    timeout(
        Duration::from_secs(2),
        receiver.wait_for(|snapshot| {
            snapshot.status == FeedStatus::Live && snapshot.records.len() == len
        }),
    )
    .await
    .expect("feed did not deliver in time")
    .expect("feed closed")
    .clone()
}

#[tokio::test]
async fn operator_watches_ranks_deletes_and_exports() {
    let credentials = AdminCredentials::new("judge", "event-key");
    let session = AdminSession::sign_in(&credentials, "judge", "event-key");
    assert!(session.is_admitted());

    let store = MemoryResultStore::new();
    store
        .create(Category::CodeRush, attempt("A", "R1", Some(120.0), Some(8.0)))
        .await
        .unwrap();
    store
        .create(Category::CodeRush, attempt("B", "R2", Some(90.0), Some(7.0)))
        .await
        .unwrap();
    store
        .create(Category::CodeRush, attempt("C", "R3", Some(90.0), Some(9.0)))
        .await
        .unwrap();

    let feed = LeaderboardFeed::open(Arc::new(store.clone()), &session).unwrap();
    let mut receiver = feed.watch();
    feed.select(Category::CodeRush).await;
    let snapshot = next_live(&mut receiver, 3).await;

    let query = LeaderboardQuery::default();
    let ranked = query.rank(&snapshot.records);
    let order: Vec<_> = ranked
        .iter()
        .map(|entry| (entry.rank, entry.record.name.as_str()))
        .collect();
    assert_eq!(order, [(1, "C"), (2, "B"), (3, "A")]);

    let doomed = ranked[1].record.id;
    assert!(store.delete(Category::CodeRush, doomed).await);
    let snapshot = next_live(&mut receiver, 2).await;
    assert!(snapshot.records.iter().all(|record| record.id != doomed));

    let by_cgpa = LeaderboardQuery::new("", SortSpec::new(SortKey::Cgpa, SortOrder::Desc));
    let csv = export::encode(&by_cgpa.rank(&snapshot.records)).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("Rank,Name,Roll No,Course,Branch,Year,Time (s),CGPA,Teammate")
    );
    assert_eq!(lines.next(), Some("1,C,R3,BTech,CSE,2,90,9,-"));
    assert_eq!(lines.next(), Some("2,A,R1,BTech,CSE,2,120,8,-"));
    assert_eq!(lines.next(), None);

    feed.close().await;
    assert_eq!(feed.current().status, FeedStatus::Idle);
}

#[tokio::test]
async fn search_narrows_the_live_view_without_renumbering_gaps() {
    let store = MemoryResultStore::new();
    for (name, roll, time) in [("Alice", "X1", 50.0), ("Bob", "Y2", 40.0), ("alina", "Z3", 60.0)] {
        store
            .create(Category::WordHunt, attempt(name, roll, Some(time), None))
            .await
            .unwrap();
    }

    let admitted = AdminSession::Admitted {
        admin_id: "judge".into(),
    };
    let feed = LeaderboardFeed::open(Arc::new(store), &admitted).unwrap();
    let mut receiver = feed.watch();
    feed.select(Category::WordHunt).await;
    let snapshot = next_live(&mut receiver, 3).await;

    let ranked = LeaderboardQuery::new("ALI", SortSpec::default()).rank(&snapshot.records);
    let order: Vec<_> = ranked
        .iter()
        .map(|entry| (entry.rank, entry.record.name.as_str()))
        .collect();
    assert_eq!(order, [(1, "Alice"), (2, "alina")]);
}
