//! Deterministic ranking of a category's results.
//!
//! The primary key follows the requested direction while the tie-break always
//! favours the better performer: a faster time or a higher CGPA wins a tie no
//! matter which way the table is sorted. Records that tie on both keys are
//! ordered by id so the view never depends on the order the store listed them.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::leaderboard::record::{RankedEntry, ResultRecord};

/// Column the leaderboard is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Seconds taken; lower is better.
    #[default]
    TimeTaken,
    /// CGPA; higher is better.
    Cgpa,
}

/// Direction applied to the primary sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Smallest value first.
    #[default]
    Asc,
    /// Largest value first.
    Desc,
}

impl SortOrder {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// The opposite direction.
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct SortSpec {
    /// Primary column.
    pub key: SortKey,
    /// Direction of the primary column.
    pub order: SortOrder,
}

impl SortSpec {
    /// Sort by `key` in `order`.
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    /// Header-click behaviour: the active column flips direction, another
    /// column becomes active in ascending order.
    pub fn toggle(self, key: SortKey) -> Self {
        if self.key == key {
            Self::new(key, self.order.flipped())
        } else {
            Self::new(key, SortOrder::Asc)
        }
    }
}

/// Search term and sort specification the operator is currently viewing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeaderboardQuery {
    /// Case-insensitive substring matched against name and roll number.
    pub search: String,
    /// Ordering applied after filtering.
    pub sort: SortSpec,
}

impl LeaderboardQuery {
    /// Query for `search` ordered by `sort`.
    pub fn new(search: impl Into<String>, sort: SortSpec) -> Self {
        Self {
            search: search.into(),
            sort,
        }
    }

    /// Filter, sort and rank `records`.
    pub fn rank(&self, records: &[ResultRecord]) -> Vec<RankedEntry> {
        rank_records(records, &self.search, self.sort)
    }
}

/// Keep records whose name or roll number contains `search` (case-insensitive),
/// sort them per `sort`, and number them from 1.
pub fn rank_records(records: &[ResultRecord], search: &str, sort: SortSpec) -> Vec<RankedEntry> {
    let needle = search.to_lowercase();
    let mut kept: Vec<&ResultRecord> = records
        .iter()
        .filter(|record| matches_search(record, &needle))
        .collect();

    kept.sort_by(|a, b| compare(a, b, sort));

    kept.into_iter()
        .enumerate()
        .map(|(index, record)| RankedEntry {
            rank: index + 1,
            record: record.clone(),
        })
        .collect()
}

fn matches_search(record: &ResultRecord, needle: &str) -> bool {
    needle.is_empty()
        || record.name.to_lowercase().contains(needle)
        || record.roll_no.to_lowercase().contains(needle)
}

fn compare(a: &ResultRecord, b: &ResultRecord, sort: SortSpec) -> Ordering {
    let (primary, tie_break) = match sort.key {
        SortKey::TimeTaken => (
            compare_values(a.time_key(), b.time_key()),
            compare_values(b.cgpa_key(), a.cgpa_key()),
        ),
        SortKey::Cgpa => (
            compare_values(a.cgpa_key(), b.cgpa_key()),
            compare_values(a.time_key(), b.time_key()),
        ),
    };

    sort.order
        .apply(primary)
        .then(tie_break)
        .then_with(|| a.id.cmp(&b.id))
}

// Keys are finite or one of the infinite sentinels, never NaN.
fn compare_values(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn record(n: u128, name: &str, time_taken: Option<f64>, cgpa: Option<f64>) -> ResultRecord {
        ResultRecord {
            id: Uuid::from_u128(n),
            name: name.into(),
            roll_no: format!("21CS{n:03}"),
            course: "BTech".into(),
            branch: "CSE".into(),
            year: "2".into(),
            time_taken,
            cgpa,
            teammate_roll_no: None,
            timestamp: None,
        }
    }

    fn names(entries: &[RankedEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.record.name.as_str()).collect()
    }

    const TIME_ASC: SortSpec = SortSpec {
        key: SortKey::TimeTaken,
        order: SortOrder::Asc,
    };

    #[test]
    fn empty_input_yields_empty_view() {
        assert!(rank_records(&[], "", TIME_ASC).is_empty());
    }

    #[test]
    fn faster_time_ranks_first() {
        let records = [
            record(1, "slow", Some(125.0), Some(8.5)),
            record(2, "fast", Some(80.0), Some(7.2)),
        ];
        let ranked = rank_records(&records, "", TIME_ASC);

        assert_eq!(names(&ranked), ["fast", "slow"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].record.time_taken, Some(80.0));
        assert_eq!(ranked[1].rank, 2);
        assert_eq!(ranked[1].record.cgpa, Some(8.5));
    }

    #[test]
    fn equal_time_is_won_by_higher_cgpa() {
        let records = [
            record(1, "lower", Some(60.0), Some(8.5)),
            record(2, "higher", Some(60.0), Some(9.0)),
        ];
        assert_eq!(names(&rank_records(&records, "", TIME_ASC)), ["higher", "lower"]);

        let desc = SortSpec::new(SortKey::TimeTaken, SortOrder::Desc);
        assert_eq!(names(&rank_records(&records, "", desc)), ["higher", "lower"]);
    }

    #[test]
    fn equal_cgpa_is_won_by_lower_time() {
        let records = [
            record(1, "seventy", Some(70.0), Some(8.0)),
            record(2, "fifty", Some(50.0), Some(8.0)),
        ];
        let desc = SortSpec::new(SortKey::Cgpa, SortOrder::Desc);
        assert_eq!(names(&rank_records(&records, "", desc)), ["fifty", "seventy"]);

        let asc = SortSpec::new(SortKey::Cgpa, SortOrder::Asc);
        assert_eq!(names(&rank_records(&records, "", asc)), ["fifty", "seventy"]);
    }

    #[test]
    fn primary_direction_follows_order() {
        let records = [
            record(1, "a", Some(90.0), Some(6.0)),
            record(2, "b", Some(30.0), Some(9.5)),
            record(3, "c", Some(60.0), Some(7.0)),
        ];
        let by_cgpa_desc = SortSpec::new(SortKey::Cgpa, SortOrder::Desc);
        assert_eq!(names(&rank_records(&records, "", by_cgpa_desc)), ["b", "c", "a"]);

        let by_time_desc = SortSpec::new(SortKey::TimeTaken, SortOrder::Desc);
        assert_eq!(names(&rank_records(&records, "", by_time_desc)), ["a", "c", "b"]);
    }

    #[test]
    fn search_matches_name_or_roll_number_case_insensitively() {
        let records = [
            record(1, "Priya Sharma", Some(60.0), Some(8.0)),
            record(2, "Arjun", Some(70.0), Some(8.0)),
            record(12, "Meera", Some(80.0), Some(8.0)),
        ];

        assert_eq!(names(&rank_records(&records, "SHARMA", TIME_ASC)), ["Priya Sharma"]);
        assert_eq!(names(&rank_records(&records, "21cs01", TIME_ASC)), ["Meera"]);
        assert!(rank_records(&records, "zzz", TIME_ASC).is_empty());
    }

    #[test]
    fn empty_search_keeps_every_record() {
        let records = [
            record(1, "", None, None),
            record(2, "Arjun", Some(70.0), Some(8.0)),
            record(3, "Kabir", Some(10.0), None),
        ];
        assert_eq!(rank_records(&records, "", TIME_ASC).len(), records.len());
    }

    #[test]
    fn ranks_are_filtered_positions() {
        let records = [
            record(1, "Anu", Some(10.0), Some(8.0)),
            record(2, "Bala", Some(20.0), Some(8.0)),
            record(3, "Anand", Some(30.0), Some(8.0)),
        ];
        let ranked = rank_records(&records, "an", TIME_ASC);
        let ranks: Vec<_> = ranked.iter().map(|e| (e.rank, e.record.name.as_str())).collect();
        assert_eq!(ranks, [(1, "Anu"), (2, "Anand")]);
    }

    #[test]
    fn missing_values_sort_as_worst_when_ascending() {
        let records = [
            record(1, "no-time", None, Some(9.9)),
            record(2, "timed", Some(300.0), Some(5.0)),
        ];
        assert_eq!(names(&rank_records(&records, "", TIME_ASC)), ["timed", "no-time"]);

        let records = [
            record(1, "no-cgpa", Some(10.0), None),
            record(2, "graded", Some(300.0), Some(5.0)),
        ];
        let by_cgpa_desc = SortSpec::new(SortKey::Cgpa, SortOrder::Desc);
        assert_eq!(names(&rank_records(&records, "", by_cgpa_desc)), ["graded", "no-cgpa"]);
    }

    #[test]
    fn full_ties_are_independent_of_input_order() {
        let forward = [
            record(7, "seven", Some(60.0), Some(8.0)),
            record(3, "three", Some(60.0), Some(8.0)),
            record(5, "five", Some(60.0), Some(8.0)),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        let expected = ["three", "five", "seven"];
        assert_eq!(names(&rank_records(&forward, "", TIME_ASC)), expected);
        assert_eq!(names(&rank_records(&backward, "", TIME_ASC)), expected);
    }

    #[test]
    fn repeated_ranking_is_identical() {
        let records: Vec<_> = (0..40u32)
            .map(|n| {
                record(
                    u128::from((n * 7919) % 97),
                    &format!("p{n}"),
                    Some(f64::from(n % 5) * 15.0),
                    Some(f64::from(n % 3) + 7.0),
                )
            })
            .collect();

        for sort in [
            TIME_ASC,
            SortSpec::new(SortKey::TimeTaken, SortOrder::Desc),
            SortSpec::new(SortKey::Cgpa, SortOrder::Asc),
            SortSpec::new(SortKey::Cgpa, SortOrder::Desc),
        ] {
            let first = rank_records(&records, "", sort);
            let second = rank_records(&records, "", sort);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn toggling_same_key_flips_and_new_key_resets() {
        let spec = SortSpec::default();
        assert_eq!(spec, TIME_ASC);

        let flipped = spec.toggle(SortKey::TimeTaken);
        assert_eq!(flipped.order, SortOrder::Desc);

        let switched = flipped.toggle(SortKey::Cgpa);
        assert_eq!(switched, SortSpec::new(SortKey::Cgpa, SortOrder::Asc));
    }
}
