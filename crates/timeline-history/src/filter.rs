//! Commit filtering by recency, hour of day, and committer identity.
//!
//! Each predicate is a free function so it can be checked on its own;
//! [`CommitFilter`] chains them in a fixed order.

use chrono::{DateTime, Duration, Timelike, Utc};
use regex::Regex;
use timeline_core::{RawCommit, TimelineConfig, TimelineError};

/// Inclusive range of wall-clock hours a commit may fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourWindow {
    /// First accepted hour.
    pub start: u32,
    /// Last accepted hour.
    pub end: u32,
}

impl Default for HourWindow {
    fn default() -> Self {
        Self { start: 5, end: 22 }
    }
}

/// The predicate chain applied to every collected commit.
///
/// Built once per run from the configuration and a fixed "now", so the same
/// commit always gets the same answer.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use timeline_core::TimelineConfig;
/// use timeline_history::filter::CommitFilter;
///
/// let config = TimelineConfig {
///     base_dirs: vec!["/srv/git".into()],
///     committers: vec![".*@example.com".into()],
///     days: 7,
///     ..TimelineConfig::default()
/// };
/// let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
/// let filter = CommitFilter::from_config(&config, now).unwrap();
/// assert_eq!(filter.cutoff(), Utc.with_ymd_and_hms(2024, 5, 3, 12, 0, 0).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct CommitFilter {
    cutoff: DateTime<Utc>,
    hours: HourWindow,
    authors: Vec<Regex>,
}

impl CommitFilter {
    /// Build the chain from explicit parts.
    pub fn new(cutoff: DateTime<Utc>, hours: HourWindow, authors: Vec<Regex>) -> Self {
        Self {
            cutoff,
            hours,
            authors,
        }
    }

    /// Build the chain from `config`, measuring the lookback window from `now`.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::Pattern`] if a committer pattern does not
    /// compile and [`TimelineError::Config`] if the lookback window reaches
    /// past the representable date range.
    pub fn from_config(config: &TimelineConfig, now: DateTime<Utc>) -> Result<Self, TimelineError> {
        Ok(Self::new(
            lookback_cutoff(now, config.days)?,
            HourWindow {
                start: config.start_hour,
                end: config.end_hour,
            },
            config.author_patterns()?,
        ))
    }

    /// Oldest instant still accepted by the recency predicate.
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    /// Whether `commit` passes every predicate.
    pub fn accepts(&self, commit: &RawCommit) -> bool {
        is_recent(commit, self.cutoff)
            && in_hour_window(commit, self.hours)
            && matches_author(commit, &self.authors)
    }
}

/// `now` minus `days` whole days.
///
/// # Errors
///
/// Returns [`TimelineError::Config`] if the result falls outside the date range.
pub fn lookback_cutoff(now: DateTime<Utc>, days: u32) -> Result<DateTime<Utc>, TimelineError> {
    now.checked_sub_signed(Duration::days(i64::from(days)))
        .ok_or_else(|| TimelineError::Config(format!("a lookback of {days} days is out of range")))
}

/// The commit instant is at or after `cutoff`.
pub fn is_recent(commit: &RawCommit, cutoff: DateTime<Utc>) -> bool {
    commit.epoch_seconds >= cutoff.timestamp()
}

/// The commit's wall-clock hour lies inside `hours`.
///
/// A commit without a resolvable timestamp never matches.
pub fn in_hour_window(commit: &RawCommit, hours: HourWindow) -> bool {
    commit
        .timestamp
        .map(|ts| (hours.start..=hours.end).contains(&ts.hour()))
        .unwrap_or(false)
}

/// The committer email matches at least one pattern.
///
/// Patterns are expected to be anchored (see
/// [`TimelineConfig::author_patterns`]), which makes this a full-string match.
pub fn matches_author(commit: &RawCommit, patterns: &[Regex]) -> bool {
    patterns.iter().any(|p| p.is_match(&commit.committer_email))
}
