//! HTML rendering of the commit timeline.
//!
//! Produces a single self-contained page with an inline SVG scatter chart
//! (date against time of day, one colour per repository) and a legend
//! grouped by root directory.

pub mod chart;
pub mod html;

pub use html::{render_html, write_report};

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    use chrono::{Duration, FixedOffset, TimeZone};
    use timeline_core::{FilteredCommit, RawCommit, RepositoryHandle};
    use timeline_history::CommitDataset;

    /// A record `days_ago` days before 2024-05-10 at `hour`:00 UTC.
    pub fn record(group: &str, repo: &str, days_ago: i64, hour: u32, lines: u64) -> FilteredCommit {
        let utc = FixedOffset::east_opt(0).unwrap();
        let ts = utc.with_ymd_and_hms(2024, 5, 10, hour, 0, 0).unwrap() - Duration::days(days_ago);
        let handle = RepositoryHandle {
            display_name: repo.into(),
            path: PathBuf::from(format!("/{group}/{repo}")),
            group_label: group.into(),
        };
        FilteredCommit::new(
            RawCommit {
                hash: format!("{repo:0>8}{days_ago}{hour}"),
                committer_email: "dev@example.com".into(),
                epoch_seconds: ts.timestamp(),
                timestamp: Some(ts),
                message: "work".into(),
                total_changed_lines: lines,
            },
            &handle,
            "main",
        )
    }

    pub fn dataset(records: Vec<FilteredCommit>) -> CommitDataset {
        CommitDataset::assemble(records, 30, &[".*".into()]).unwrap()
    }
}
