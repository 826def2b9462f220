use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub mod stats;

use crate::gerrit::Change;

/// Per-patch metrics derived from a Gerrit change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchPoint {
    /// Days between this change's creation and the first change's creation.
    pub date_offset: i64,
    /// Days between creation and merge, always positive.
    pub merge_latency: i64,
    pub size: u64,
    pub author: String,
}

/// Everything the chart builders need from the fetched changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointSet {
    pub points: Vec<PatchPoint>,
    pub start_date: NaiveDate,
    pub change_count: usize,
    /// Size at which the color ramp saturates to full red.
    pub size_threshold: f64,
}

impl PointSet {
    /// Reduce `changes` (sorted by creation time) to chart points.
    ///
    /// Changes without an owner username or merged on the day they were
    /// created are dropped. Returns `None` when `changes` is empty.
    pub fn derive(changes: &[Change], size_percentile: f64) -> Option<Self> {
        let start_date = changes.first()?.created_date();

        let sizes: Vec<f64> = changes.iter().map(|change| change.size() as f64).collect();
        let size_threshold = stats::percentile(&sizes, size_percentile).unwrap_or(0.0);
        info!("Lines of code {} percentile: {}", size_percentile, size_threshold);

        let points: Vec<PatchPoint> = changes
            .iter()
            .filter_map(|change| derive_point(change, start_date))
            .collect();

        debug!(
            "Kept {} of {} changes after dropping same-day merges and ownerless changes",
            points.len(),
            changes.len()
        );

        Some(Self {
            points,
            start_date,
            change_count: changes.len(),
            size_threshold,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Derive one point, `start_date` being the creation date of the earliest
/// change in the set.
pub fn derive_point(change: &Change, start_date: NaiveDate) -> Option<PatchPoint> {
    let created = change.created_date();
    let merged = change.merged_date();

    // A bogus createdOn is kept and shows up as a far off offset
    let date_offset = (created - start_date).num_days();
    let merge_latency = (merged - created).num_days();

    if merge_latency <= 0 {
        return None;
    }
    let author = change.author()?;

    Some(PatchPoint {
        date_offset,
        merge_latency,
        size: change.size(),
        author: author.to_string(),
    })
}

/// Drop points whose merge latency is at or above the given percentile of
/// `points`.
pub fn without_latency_outliers(points: &[PatchPoint], pct: f64) -> Vec<PatchPoint> {
    let latencies: Vec<f64> = points.iter().map(|p| p.merge_latency as f64).collect();
    match stats::percentile(&latencies, pct) {
        Some(cutoff) => points
            .iter()
            .filter(|p| (p.merge_latency as f64) < cutoff)
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gerrit::tests::{change, DAY};
    use crate::gerrit::{Approval, PatchSet};

    fn day(n: i64) -> NaiveDate {
        crate::gerrit::epoch_date(n * DAY)
    }

    #[test]
    fn same_day_merge_is_dropped() {
        assert_eq!(derive_point(&change(10, 10, Some("alice"), 5, 0), day(0)), None);
    }

    #[test]
    fn positive_latency_with_owner_is_kept() {
        let point = derive_point(&change(10, 12, Some("alice"), 5, 3), day(4)).unwrap();
        assert_eq!(
            point,
            PatchPoint {
                date_offset: 6,
                merge_latency: 2,
                size: 8,
                author: "alice".to_string(),
            }
        );
    }

    #[test]
    fn ownerless_change_is_dropped() {
        assert_eq!(derive_point(&change(10, 12, None, 5, 3), day(0)), None);
    }

    #[test]
    fn merged_before_created_is_dropped() {
        assert_eq!(derive_point(&change(12, 10, Some("alice"), 1, 0), day(0)), None);
    }

    #[test]
    fn submit_approval_drives_latency() {
        let mut c = change(10, 40, Some("bob"), 1, 0);
        c.current_patch_set = Some(PatchSet {
            size_insertions: 1,
            size_deletions: 0,
            approvals: Some(vec![Approval {
                kind: "SUBM".to_string(),
                granted_on: 13 * DAY,
            }]),
        });
        assert_eq!(derive_point(&c, day(10)).unwrap().merge_latency, 3);
    }

    #[test]
    fn bogus_creation_date_is_kept_leniently() {
        let mut c = change(10, 12, Some("alice"), 1, 0);
        c.created_on = 0;
        let point = derive_point(&c, day(5)).unwrap();
        assert_eq!(point.date_offset, -5);
        assert_eq!(point.merge_latency, 12);
    }

    #[test]
    fn derive_uses_first_change_as_baseline() {
        let changes = vec![
            change(100, 100, Some("a"), 10, 0),
            change(103, 110, Some("b"), 20, 0),
            change(105, 106, None, 30, 0),
            change(120, 125, Some("a"), 40, 0),
        ];
        let set = PointSet::derive(&changes, 75.0).unwrap();
        assert_eq!(set.change_count, 4);
        assert_eq!(set.start_date, day(100));
        let offsets: Vec<i64> = set.points.iter().map(|p| p.date_offset).collect();
        assert_eq!(offsets, vec![3, 20]);
        // 75th percentile over every fetched change, dropped ones included
        assert_eq!(set.size_threshold, 32.5);
    }

    #[test]
    fn derive_of_nothing_is_none() {
        assert!(PointSet::derive(&[], 75.0).is_none());
    }

    #[test]
    fn derive_with_every_change_dropped_is_empty() {
        let changes = vec![
            change(100, 100, Some("a"), 10, 0),
            change(101, 105, None, 20, 0),
            change(102, 101, Some("b"), 30, 0),
        ];
        let set = PointSet::derive(&changes, 75.0).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.change_count, 3);
    }

    #[test]
    fn outliers_at_or_above_percentile_are_removed() {
        let points: Vec<PatchPoint> = (1..=100)
            .map(|latency| PatchPoint {
                date_offset: latency,
                merge_latency: latency,
                size: 1,
                author: "a".to_string(),
            })
            .collect();
        let kept = without_latency_outliers(&points, 95.0);
        assert_eq!(kept.len(), 95);
        assert!(kept.iter().all(|p| (p.merge_latency as f64) < 95.05));
        assert_eq!(kept.last().unwrap().merge_latency, 95);
    }

    #[test]
    fn uniform_latencies_filter_everything() {
        let points = vec![
            PatchPoint {
                date_offset: 0,
                merge_latency: 4,
                size: 1,
                author: "a".to_string(),
            };
            3
        ];
        assert!(without_latency_outliers(&points, 95.0).is_empty());
    }
}
