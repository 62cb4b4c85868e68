//! Leaderboard materialization: live feed, ranking, export and admission.

pub mod category;
pub mod export;
pub mod feed;
pub mod ranking;
pub mod record;
pub mod session;

pub use self::category::Category;
pub use self::feed::{FeedSnapshot, FeedStatus, LeaderboardFeed};
pub use self::ranking::{LeaderboardQuery, SortKey, SortOrder, SortSpec, rank_records};
pub use self::record::{RankedEntry, ResultRecord, format_time};
pub use self::session::{AdminCredentials, AdminSession};
