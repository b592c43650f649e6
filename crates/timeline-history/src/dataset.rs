//! Assembly and validation of the final commit dataset.

use chrono::{DateTime, Duration, FixedOffset};
use timeline_core::{FilteredCommit, TimelineError};

/// Date range shown on the chart's time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayWindow {
    /// Left edge of the axis.
    pub start: DateTime<FixedOffset>,
    /// Right edge of the axis: one day after the newest commit.
    pub end: DateTime<FixedOffset>,
}

/// A validated, non-empty set of filtered commits.
///
/// Records are held in chronological order; [`CommitDataset::presentation`]
/// gives the grouped view without touching the collaborators again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDataset {
    records: Vec<FilteredCommit>,
    newest: DateTime<FixedOffset>,
}

impl CommitDataset {
    /// Validate `records` and put them in chronological order.
    ///
    /// Ties on the instant are broken by group, repository, branch and hash,
    /// so the order does not depend on discovery order.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::EmptyResult`] if `records` is empty and
    /// [`TimelineError::MissingField`] if a record has no timestamp. `days`
    /// and `committers` only feed the empty-result message.
    pub fn assemble(
        mut records: Vec<FilteredCommit>,
        days: u32,
        committers: &[String],
    ) -> Result<Self, TimelineError> {
        let mut newest: Option<DateTime<FixedOffset>> = None;
        for record in &records {
            let Some(ts) = record.commit.timestamp else {
                return Err(TimelineError::MissingField {
                    repo: record.repo_display_name.clone(),
                    hash: record.commit.hash.clone(),
                });
            };
            if newest.map_or(true, |n| ts.timestamp() > n.timestamp()) {
                newest = Some(ts);
            }
        }
        let newest = newest.ok_or_else(|| TimelineError::EmptyResult {
            days,
            committers: committers.to_vec(),
        })?;

        records.sort_by(|a, b| {
            a.commit
                .epoch_seconds
                .cmp(&b.commit.epoch_seconds)
                .then_with(|| a.group_label.cmp(&b.group_label))
                .then_with(|| a.repo_display_name.cmp(&b.repo_display_name))
                .then_with(|| a.branch_name.cmp(&b.branch_name))
                .then_with(|| a.commit.hash.cmp(&b.commit.hash))
        });

        Ok(Self { records, newest })
    }

    /// Records in ascending time order.
    pub fn chronological(&self) -> &[FilteredCommit] {
        &self.records
    }

    /// Records grouped by `(group_label, repo_display_name)`.
    ///
    /// The sort is stable, so each repository's commits stay in time order.
    pub fn presentation(&self) -> Vec<&FilteredCommit> {
        let mut view: Vec<&FilteredCommit> = self.records.iter().collect();
        view.sort_by(|a, b| {
            (&a.group_label, &a.repo_display_name).cmp(&(&b.group_label, &b.repo_display_name))
        });
        view
    }

    /// Distinct `(group_label, repo_display_name)` pairs in presentation order.
    pub fn repositories(&self) -> Vec<(&str, &str)> {
        let mut repos: Vec<(&str, &str)> = self
            .records
            .iter()
            .map(|r| (r.group_label.as_str(), r.repo_display_name.as_str()))
            .collect();
        repos.sort();
        repos.dedup();
        repos
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false`; an assembled dataset has at least one record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Axis range ending one day after the newest commit and spanning `span_days`.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::Config`] if either edge falls outside the
    /// representable date range.
    pub fn display_window(&self, span_days: u32) -> Result<DisplayWindow, TimelineError> {
        let out_of_range =
            || TimelineError::Config(format!("a display span of {span_days} days is out of range"));
        let end = self
            .newest
            .checked_add_signed(Duration::days(1))
            .ok_or_else(out_of_range)?;
        let start = end
            .checked_sub_signed(Duration::days(i64::from(span_days)))
            .ok_or_else(out_of_range)?;
        Ok(DisplayWindow { start, end })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::TimeZone;
    use timeline_core::{ChangeSize, RawCommit, RepositoryHandle};

    use super::*;

    fn record(group: &str, repo: &str, epoch: i64) -> FilteredCommit {
        let ts = FixedOffset::east_opt(0)
            .unwrap()
            .timestamp_opt(epoch, 0)
            .unwrap();
        let handle = RepositoryHandle {
            display_name: repo.into(),
            path: PathBuf::from(format!("/{group}/{repo}")),
            group_label: group.into(),
        };
        FilteredCommit::new(
            RawCommit {
                hash: format!("{repo}{epoch}"),
                committer_email: "me@example.com".into(),
                epoch_seconds: epoch,
                timestamp: Some(ts),
                message: "m".into(),
                total_changed_lines: 5,
            },
            &handle,
            "main",
        )
    }

    #[test]
    fn empty_input_is_empty_result() {
        let err = CommitDataset::assemble(Vec::new(), 7, &[".*".into()]).unwrap_err();
        assert!(matches!(err, TimelineError::EmptyResult { days: 7, .. }));
    }

    #[test]
    fn missing_timestamp_is_missing_field() {
        let mut bad = record("G", "A", 100);
        bad.commit.timestamp = None;
        let err = CommitDataset::assemble(vec![record("G", "B", 50), bad], 7, &[]).unwrap_err();
        match err {
            TimelineError::MissingField { repo, hash } => {
                assert_eq!(repo, "A");
                assert_eq!(hash, "A100");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn empty_check_runs_before_field_check() {
        let err = CommitDataset::assemble(Vec::new(), 1, &[]).unwrap_err();
        assert!(matches!(err, TimelineError::EmptyResult { .. }));
    }

    #[test]
    fn records_are_chronological() {
        let ds = CommitDataset::assemble(
            vec![record("G2", "B", 300), record("G1", "A", 100), record("G1", "C", 200)],
            7,
            &[],
        )
        .unwrap();
        let epochs: Vec<i64> = ds.chronological().iter().map(|r| r.commit.epoch_seconds).collect();
        assert_eq!(epochs, vec![100, 200, 300]);
        assert_eq!(ds.len(), 3);
        assert!(!ds.is_empty());
    }

    #[test]
    fn presentation_groups_and_keeps_time_order() {
        let ds = CommitDataset::assemble(
            vec![
                record("G2", "B", 50),
                record("G1", "Z", 400),
                record("G1", "A", 300),
                record("G1", "A", 100),
            ],
            7,
            &[],
        )
        .unwrap();
        let view: Vec<(String, String, i64)> = ds
            .presentation()
            .iter()
            .map(|r| {
                (
                    r.group_label.clone(),
                    r.repo_display_name.clone(),
                    r.commit.epoch_seconds,
                )
            })
            .collect();
        assert_eq!(
            view,
            vec![
                ("G1".into(), "A".into(), 100),
                ("G1".into(), "A".into(), 300),
                ("G1".into(), "Z".into(), 400),
                ("G2".into(), "B".into(), 50),
            ]
        );
        assert_eq!(ds.repositories(), vec![("G1", "A"), ("G1", "Z"), ("G2", "B")]);
    }

    #[test]
    fn order_does_not_depend_on_input_order() {
        let a = vec![record("G1", "A", 100), record("G2", "B", 100)];
        let b = vec![record("G2", "B", 100), record("G1", "A", 100)];
        assert_eq!(
            CommitDataset::assemble(a, 7, &[]).unwrap(),
            CommitDataset::assemble(b, 7, &[]).unwrap()
        );
    }

    #[test]
    fn display_window_ends_a_day_after_newest() {
        let newest = epoch_of(2024, 5, 10, 9);
        let ds = CommitDataset::assemble(
            vec![record("G", "A", newest - 86_400), record("G", "A", newest)],
            7,
            &[],
        )
        .unwrap();
        let window = ds.display_window(7).unwrap();
        assert_eq!(window.end.timestamp(), newest + 86_400);
        assert_eq!(window.start.timestamp(), newest + 86_400 - 7 * 86_400);
        assert_eq!(window.end.date_naive().to_string(), "2024-05-11");
    }

    #[test]
    fn display_window_change_size_is_irrelevant() {
        let mut big = record("G", "A", 1_000);
        big.change_size = ChangeSize::Big;
        let ds = CommitDataset::assemble(vec![big], 1, &[]).unwrap();
        let window = ds.display_window(1).unwrap();
        assert_eq!(window.end.timestamp() - window.start.timestamp(), 86_400);
    }

    #[test]
    fn unrepresentable_display_span_is_an_error() {
        let ds = CommitDataset::assemble(vec![record("G", "A", 1_000)], 1, &[]).unwrap();
        assert!(matches!(
            ds.display_window(4_000_000_000),
            Err(TimelineError::Config(_))
        ));
    }

    fn epoch_of(y: i32, m: u32, d: u32, h: u32) -> i64 {
        chrono::Utc
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .timestamp()
    }
}
