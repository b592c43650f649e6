use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A repository found while walking a configured root directory.
///
/// # Examples
///
/// ```
/// use timeline_core::RepositoryHandle;
/// use std::path::PathBuf;
///
/// let handle = RepositoryHandle {
///     display_name: "dotfiles".into(),
///     path: PathBuf::from("/home/me/Documents/GitHub/dotfiles"),
///     group_label: "GitHub".into(),
/// };
/// assert_eq!(handle.group_label, "GitHub");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryHandle {
    /// Basename of the repository directory.
    pub display_name: String,
    /// Absolute path of the working tree (the directory holding `.git`).
    pub path: PathBuf,
    /// Basename of the configured root the repository was found under.
    pub group_label: String,
}

/// A commit read from a branch's ancestry, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    /// Full hex object id.
    pub hash: String,
    /// Committer email address.
    pub committer_email: String,
    /// Commit instant as stored by git (seconds since the Unix epoch).
    pub epoch_seconds: i64,
    /// `epoch_seconds` on the wall clock chosen by the [`TimezonePolicy`].
    ///
    /// `None` when the policy cannot represent the instant.
    pub timestamp: Option<DateTime<FixedOffset>>,
    /// First line of the commit message.
    pub message: String,
    /// Lines inserted plus lines deleted against the first parent.
    pub total_changed_lines: u64,
}

/// Ordinal change magnitude of a commit.
///
/// # Examples
///
/// ```
/// use timeline_core::ChangeSize;
///
/// assert_eq!(ChangeSize::classify(19), ChangeSize::Small);
/// assert_eq!(ChangeSize::classify(20), ChangeSize::Normal);
/// assert_eq!(ChangeSize::classify(100), ChangeSize::Big);
/// assert_eq!(ChangeSize::Big.weight(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeSize {
    /// Fewer than 20 changed lines.
    Small,
    /// 20 to 99 changed lines.
    Normal,
    /// 100 or more changed lines.
    Big,
}

impl ChangeSize {
    /// Lower bound (inclusive) of [`ChangeSize::Normal`].
    pub const NORMAL_THRESHOLD: u64 = 20;
    /// Lower bound (inclusive) of [`ChangeSize::Big`].
    pub const BIG_THRESHOLD: u64 = 100;

    /// Classify a commit by its total number of changed lines.
    pub fn classify(total_changed_lines: u64) -> Self {
        if total_changed_lines < Self::NORMAL_THRESHOLD {
            ChangeSize::Small
        } else if total_changed_lines < Self::BIG_THRESHOLD {
            ChangeSize::Normal
        } else {
            ChangeSize::Big
        }
    }

    /// Relative marker weight used when drawing the commit.
    pub fn weight(self) -> u32 {
        match self {
            ChangeSize::Small => 1,
            ChangeSize::Normal => 2,
            ChangeSize::Big => 4,
        }
    }
}

impl fmt::Display for ChangeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeSize::Small => write!(f, "small"),
            ChangeSize::Normal => write!(f, "normal"),
            ChangeSize::Big => write!(f, "big"),
        }
    }
}

/// A commit that passed every filter, annotated for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredCommit {
    /// The underlying commit.
    pub commit: RawCommit,
    /// Repository the commit was collected from.
    pub repo_display_name: String,
    /// Branch whose ancestry produced this record.
    pub branch_name: String,
    /// Group label of the repository.
    pub group_label: String,
    /// Wall-clock time of day, `HH:MM`.
    pub time_of_day: String,
    /// Change magnitude.
    pub change_size: ChangeSize,
}

impl FilteredCommit {
    /// Annotate `commit` with its repository, branch, time label and size.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{FixedOffset, TimeZone};
    /// use std::path::PathBuf;
    /// use timeline_core::{ChangeSize, FilteredCommit, RawCommit, RepositoryHandle};
    ///
    /// let handle = RepositoryHandle {
    ///     display_name: "A".into(),
    ///     path: PathBuf::from("/roots/G1/A"),
    ///     group_label: "G1".into(),
    /// };
    /// let ts = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 5, 1, 9, 5, 0).unwrap();
    /// let commit = RawCommit {
    ///     hash: "abc".into(),
    ///     committer_email: "me@example.com".into(),
    ///     epoch_seconds: ts.timestamp(),
    ///     timestamp: Some(ts),
    ///     message: "init".into(),
    ///     total_changed_lines: 42,
    /// };
    /// let record = FilteredCommit::new(commit, &handle, "main");
    /// assert_eq!(record.time_of_day, "09:05");
    /// assert_eq!(record.change_size, ChangeSize::Normal);
    /// ```
    pub fn new(commit: RawCommit, repo: &RepositoryHandle, branch: &str) -> Self {
        let time_of_day = commit
            .timestamp
            .map(|ts| ts.format("%H:%M").to_string())
            .unwrap_or_default();
        let change_size = ChangeSize::classify(commit.total_changed_lines);
        Self {
            commit,
            repo_display_name: repo.display_name.clone(),
            branch_name: branch.to_string(),
            group_label: repo.group_label.clone(),
            time_of_day,
            change_size,
        }
    }
}

/// How a stored commit instant is turned into wall-clock time.
///
/// Parsed from `"local"`, `"utc"`, or a fixed offset such as `"+02:00"`.
///
/// # Examples
///
/// ```
/// use timeline_core::TimezonePolicy;
///
/// let policy: TimezonePolicy = "+02:00".parse().unwrap();
/// let ts = policy.resolve(0).unwrap();
/// assert_eq!(ts.format("%H:%M").to_string(), "02:00");
/// assert_eq!(policy.to_string(), "+02:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimezonePolicy {
    /// The collecting machine's local timezone.
    #[default]
    Local,
    /// Coordinated Universal Time.
    Utc,
    /// A fixed offset from UTC.
    Fixed(FixedOffset),
}

impl TimezonePolicy {
    /// Resolve an epoch instant to wall-clock time under this policy.
    pub fn resolve(&self, epoch_seconds: i64) -> Option<DateTime<FixedOffset>> {
        match self {
            TimezonePolicy::Local => Local
                .timestamp_opt(epoch_seconds, 0)
                .single()
                .map(|dt| dt.fixed_offset()),
            TimezonePolicy::Utc => Utc
                .timestamp_opt(epoch_seconds, 0)
                .single()
                .map(|dt| dt.fixed_offset()),
            TimezonePolicy::Fixed(offset) => offset.timestamp_opt(epoch_seconds, 0).single(),
        }
    }
}

impl fmt::Display for TimezonePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimezonePolicy::Local => write!(f, "local"),
            TimezonePolicy::Utc => write!(f, "utc"),
            TimezonePolicy::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

impl FromStr for TimezonePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => return Ok(TimezonePolicy::Local),
            "utc" => return Ok(TimezonePolicy::Utc),
            _ => {}
        }

        let invalid = || format!("unknown timezone `{s}` (expected local, utc, or +HH:MM)");
        let (sign, rest) = match s.as_bytes().first() {
            Some(b'+') => (1, &s[1..]),
            Some(b'-') => (-1, &s[1..]),
            _ => return Err(invalid()),
        };
        let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
        if hours.len() != 2 || minutes.len() != 2 {
            return Err(invalid());
        }
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(TimezonePolicy::Fixed)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimezonePolicy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimezonePolicy> for String {
    fn from(policy: TimezonePolicy) -> Self {
        policy.to_string()
    }
}
