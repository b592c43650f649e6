use std::path::PathBuf;

/// Errors that can occur anywhere in the timeline pipeline.
///
/// Library crates return this type directly; the binary converts it to a
/// `miette` report at the boundary.
///
/// # Examples
///
/// ```
/// use timeline_core::TimelineError;
///
/// let err = TimelineError::Config("`committers` must not be empty".into());
/// assert!(err.to_string().contains("committers"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// TOML deserialization failure.
    #[error("configuration error: {0}")]
    Toml(#[from] toml::de::Error),

    /// An author pattern is not a valid regular expression.
    #[error("configuration error: invalid committer pattern `{pattern}`: {source}")]
    Pattern {
        /// The pattern as written in the configuration.
        pattern: String,
        /// Underlying compile error.
        source: regex::Error,
    },

    /// Git operation failure.
    #[error("git error: {0}")]
    Git(String),

    /// No commit survived filtering.
    #[error(
        "no commits matched the configured filters (last {days} days, committers {committers:?}); \
         widen `days` or `committers` in the configuration"
    )]
    EmptyResult {
        /// Lookback window in days.
        days: u32,
        /// Author patterns that were applied.
        committers: Vec<String>,
    },

    /// A dataset record has no resolvable timestamp.
    #[error("commit {hash} in repository {repo} has no resolvable timestamp")]
    MissingField {
        /// Repository display name.
        repo: String,
        /// Commit hash.
        hash: String,
    },

    /// The output artifact could not be opened in a browser.
    #[error("could not open {} with browser `{browser}`: {reason}", .path.display())]
    Browser {
        /// Artifact path.
        path: PathBuf,
        /// Configured browser identifier.
        browser: String,
        /// Failure description.
        reason: String,
    },
}
