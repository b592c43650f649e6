use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::types::TimezonePolicy;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".git-timeline.toml";

/// Upper bound for `days` and `span_days`; about a century.
pub const MAX_DAYS: u32 = 36_500;

/// Configuration loaded from `.git-timeline.toml`.
///
/// Every pipeline stage receives this value explicitly; nothing reads it
/// from global state.
///
/// # Examples
///
/// ```
/// use timeline_core::TimelineConfig;
///
/// let config = TimelineConfig::from_toml(r#"
/// base_dirs = ["~/Documents/GitHub"]
/// committers = [".*@example.com"]
/// "#).unwrap();
/// assert_eq!(config.branches, vec!["master", "main"]);
/// assert_eq!(config.days, 30);
/// assert_eq!(config.span_days(), 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimelineConfig {
    /// Root directories searched for repositories. `~` expands to the home directory.
    #[serde(default)]
    pub base_dirs: Vec<String>,
    /// Branch names collected in every repository that has them.
    #[serde(default = "default_branches")]
    pub branches: Vec<String>,
    /// Regular expressions matched against the full committer email.
    #[serde(default)]
    pub committers: Vec<String>,
    /// Lookback window in days (default: 30).
    #[serde(default = "default_days")]
    pub days: u32,
    /// Browser used to open the output: `"default"`, `"none"`, or a program name.
    #[serde(default = "default_browser")]
    pub browser: String,
    /// Width of the chart's date axis in days (default: `days`).
    #[serde(default)]
    pub span_days: Option<u32>,
    /// First hour of day (inclusive) a commit may fall in (default: 5).
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,
    /// Last hour of day (inclusive) a commit may fall in (default: 22).
    #[serde(default = "default_end_hour")]
    pub end_hour: u32,
    /// Wall clock used for hour-of-day filtering and display (default: local).
    #[serde(default)]
    pub timezone: TimezonePolicy,
    /// Path of the generated HTML file (default: `commit_timeline.html`).
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_branches() -> Vec<String> {
    vec!["master".into(), "main".into()]
}

fn default_days() -> u32 {
    30
}

fn default_browser() -> String {
    "default".into()
}

fn default_start_hour() -> u32 {
    5
}

fn default_end_hour() -> u32 {
    22
}

fn default_output() -> PathBuf {
    PathBuf::from("commit_timeline.html")
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            base_dirs: Vec::new(),
            branches: default_branches(),
            committers: Vec::new(),
            days: default_days(),
            browser: default_browser(),
            span_days: None,
            start_hour: default_start_hour(),
            end_hour: default_end_hour(),
            timezone: TimezonePolicy::default(),
            output: default_output(),
        }
    }
}

impl TimelineConfig {
    /// Load and validate configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::Config`] if the file cannot be read,
    /// [`TimelineError::Toml`] if the content is not valid TOML, or any
    /// error from [`TimelineConfig::validate`].
    pub fn from_file(path: &Path) -> Result<Self, TimelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TimelineError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::Toml`] if parsing fails, or any error from
    /// [`TimelineConfig::validate`].
    pub fn from_toml(content: &str) -> Result<Self, TimelineError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve which configuration file to load.
    ///
    /// An explicit path wins; otherwise `.git-timeline.toml` in `cwd`, then
    /// `git-timeline/config.toml` under the user's configuration directory.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::Config`] if no candidate exists.
    pub fn locate(explicit: Option<&Path>, cwd: &Path) -> Result<PathBuf, TimelineError> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        let mut candidates = vec![cwd.join(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("git-timeline").join("config.toml"));
        }

        candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .ok_or_else(|| {
                let searched: Vec<String> =
                    candidates.iter().map(|p| p.display().to_string()).collect();
                TimelineError::Config(format!(
                    "no configuration file found (searched {}); run `git-timeline init` to create one",
                    searched.join(", ")
                ))
            })
    }

    /// Check every field constraint, including that author patterns compile.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::Config`] for missing or out-of-range fields and
    /// [`TimelineError::Pattern`] for an invalid committer regex.
    pub fn validate(&self) -> Result<(), TimelineError> {
        if self.base_dirs.is_empty() {
            return Err(TimelineError::Config("`base_dirs` must not be empty".into()));
        }
        if self.branches.is_empty() {
            return Err(TimelineError::Config("`branches` must not be empty".into()));
        }
        if self.committers.is_empty() {
            return Err(TimelineError::Config("`committers` must not be empty".into()));
        }
        if !(1..=MAX_DAYS).contains(&self.days) {
            return Err(TimelineError::Config(format!(
                "`days` must be between 1 and {MAX_DAYS}, got {}",
                self.days
            )));
        }
        if let Some(span) = self.span_days {
            if !(1..=MAX_DAYS).contains(&span) {
                return Err(TimelineError::Config(format!(
                    "`span_days` must be between 1 and {MAX_DAYS}, got {span}"
                )));
            }
        }
        if self.start_hour > 23 || self.end_hour > 23 {
            return Err(TimelineError::Config(
                "`start_hour` and `end_hour` must be between 0 and 23".into(),
            ));
        }
        if self.start_hour > self.end_hour {
            return Err(TimelineError::Config(format!(
                "`start_hour` ({}) is after `end_hour` ({})",
                self.start_hour, self.end_hour
            )));
        }
        if self.browser.trim().is_empty() {
            return Err(TimelineError::Config("`browser` must not be blank".into()));
        }
        self.author_patterns()?;
        Ok(())
    }

    /// Compile the committer patterns, anchored to match the whole email.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::Pattern`] naming the first pattern that fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use timeline_core::TimelineConfig;
    ///
    /// let config = TimelineConfig {
    ///     committers: vec!["me@.*".into()],
    ///     ..TimelineConfig::default()
    /// };
    /// let patterns = config.author_patterns().unwrap();
    /// assert!(patterns[0].is_match("me@example.com"));
    /// assert!(!patterns[0].is_match("not-me@example.com"));
    /// ```
    pub fn author_patterns(&self) -> Result<Vec<Regex>, TimelineError> {
        self.committers
            .iter()
            .map(|pattern| {
                Regex::new(&format!("^(?:{pattern})$")).map_err(|source| TimelineError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect()
    }

    /// Width of the chart's date axis in days.
    pub fn span_days(&self) -> u32 {
        self.span_days.unwrap_or(self.days)
    }

    /// `base_dirs` with a leading `~` replaced by the home directory.
    pub fn expanded_base_dirs(&self) -> Vec<PathBuf> {
        self.base_dirs.iter().map(|dir| expand_home(dir)).collect()
    }
}

/// Expand a leading `~` (alone or followed by a separator) to the home directory.
///
/// Paths without the shorthand, or when no home directory is known, are
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use timeline_core::expand_home;
///
/// assert_eq!(expand_home("/srv/git"), PathBuf::from("/srv/git"));
/// assert_eq!(expand_home("~other/x"), PathBuf::from("~other/x"));
/// ```
pub fn expand_home(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
            .or_else(|| path.strip_prefix("~\\"))
    };

    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Commented template written by `git-timeline init`.
pub const DEFAULT_CONFIG: &str = r#"# git-timeline configuration

# Directories searched recursively for git repositories.
# Each repository is grouped under the name of the directory it was found in.
base_dirs = ["~/Documents/GitLab", "~/Documents/GitHub"]

# Branches collected in every repository that has them.
branches = ["master", "main"]

# Regular expressions matched against the whole committer email.
committers = [".*@example.com"]

# Only commits from the last N days are shown.
days = 30

# "default" uses the system opener, "none" only writes the file,
# anything else is run as a program with the file path as argument.
browser = "default"

# span_days = 30
# start_hour = 5
# end_hour = 22
# timezone = "local"   # or "utc", "+02:00"
# output = "commit_timeline.html"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
base_dirs = ["/srv/git"]
committers = ["me@example\\.com"]
"#;

    #[test]
    fn default_config_has_expected_values() {
        let config = TimelineConfig::default();
        assert_eq!(config.branches, vec!["master", "main"]);
        assert_eq!(config.days, 30);
        assert_eq!(config.browser, "default");
        assert_eq!(config.start_hour, 5);
        assert_eq!(config.end_hour, 22);
        assert_eq!(config.timezone, TimezonePolicy::Local);
        assert_eq!(config.output, PathBuf::from("commit_timeline.html"));
        assert!(config.base_dirs.is_empty());
    }

    #[test]
    fn parse_minimal_toml() {
        let config = TimelineConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.base_dirs, vec!["/srv/git"]);
        assert_eq!(config.span_days(), 30);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
base_dirs = ["~/Documents/GitLab", "/srv/git"]
branches = ["develop"]
committers = [".*@example.com", "me@work\\.org"]
days = 14
browser = "firefox"
span_days = 21
start_hour = 7
end_hour = 19
timezone = "+01:00"
output = "out/timeline.html"
"#;
        let config = TimelineConfig::from_toml(toml).unwrap();
        assert_eq!(config.branches, vec!["develop"]);
        assert_eq!(config.days, 14);
        assert_eq!(config.span_days(), 21);
        assert_eq!(config.browser, "firefox");
        assert_eq!(config.start_hour, 7);
        assert_eq!(config.end_hour, 19);
        assert_eq!(config.timezone.to_string(), "+01:00");
        assert_eq!(config.output, PathBuf::from("out/timeline.html"));
    }

    #[test]
    fn missing_committers_is_rejected() {
        let err = TimelineConfig::from_toml(r#"base_dirs = ["/srv/git"]"#).unwrap_err();
        assert!(err.to_string().contains("committers"));
    }

    #[test]
    fn missing_base_dirs_is_rejected() {
        let err = TimelineConfig::from_toml(r#"committers = [".*"]"#).unwrap_err();
        assert!(err.to_string().contains("base_dirs"));
    }

    #[test]
    fn wrong_field_type_is_rejected() {
        let toml = r#"
base_dirs = ["/srv/git"]
committers = [".*"]
days = "seven"
"#;
        assert!(matches!(
            TimelineConfig::from_toml(toml),
            Err(TimelineError::Toml(_))
        ));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let toml = format!("{MINIMAL}\ncommiters = [\"typo\"]\n");
        assert!(TimelineConfig::from_toml(&toml).is_err());
    }

    #[test]
    fn invalid_pattern_names_the_pattern() {
        let toml = r#"
base_dirs = ["/srv/git"]
committers = ["(unclosed"]
"#;
        match TimelineConfig::from_toml(toml) {
            Err(TimelineError::Pattern { pattern, .. }) => assert_eq!(pattern, "(unclosed"),
            other => panic!("expected pattern error, got {other:?}"),
        }
    }

    #[test]
    fn inverted_hour_window_is_rejected() {
        let toml = format!("{MINIMAL}\nstart_hour = 20\nend_hour = 6\n");
        let err = TimelineConfig::from_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("start_hour"));
    }

    #[test]
    fn out_of_range_hour_is_rejected() {
        let toml = format!("{MINIMAL}\nend_hour = 24\n");
        assert!(TimelineConfig::from_toml(&toml).is_err());
    }

    #[test]
    fn zero_days_is_rejected() {
        let toml = format!("{MINIMAL}\ndays = 0\n");
        assert!(TimelineConfig::from_toml(&toml).is_err());
    }

    #[test]
    fn days_above_a_century_is_rejected() {
        let toml = format!("{MINIMAL}\ndays = 4000000000\n");
        match TimelineConfig::from_toml(&toml) {
            Err(TimelineError::Config(msg)) => assert!(msg.contains("`days`")),
            other => panic!("expected config error, got {other:?}"),
        }

        let toml = format!("{MINIMAL}\ndays = {MAX_DAYS}\n");
        assert_eq!(TimelineConfig::from_toml(&toml).unwrap().days, MAX_DAYS);
    }

    #[test]
    fn span_days_is_bounded() {
        let toml = format!("{MINIMAL}\nspan_days = 0\n");
        assert!(TimelineConfig::from_toml(&toml).is_err());

        let toml = format!("{MINIMAL}\nspan_days = 4000000000\n");
        match TimelineConfig::from_toml(&toml) {
            Err(TimelineError::Config(msg)) => assert!(msg.contains("`span_days`")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn bad_timezone_is_rejected() {
        let toml = format!("{MINIMAL}\ntimezone = \"Mars/Olympus\"\n");
        assert!(TimelineConfig::from_toml(&toml).is_err());
    }

    #[test]
    fn patterns_match_whole_email() {
        let config = TimelineConfig {
            committers: vec!["alice".into(), ".*@example.com".into()],
            ..TimelineConfig::default()
        };
        let patterns = config.author_patterns().unwrap();
        assert!(patterns[0].is_match("alice"));
        assert!(!patterns[0].is_match("alice@example.com"));
        assert!(patterns[1].is_match("alice@example.com"));
        assert!(!patterns[1].is_match("alice@example.com.evil"));
    }

    #[test]
    fn alternation_is_anchored_as_a_group() {
        let config = TimelineConfig {
            committers: vec!["a@x.com|b@y.com".into()],
            ..TimelineConfig::default()
        };
        let patterns = config.author_patterns().unwrap();
        assert!(patterns[0].is_match("b@y.com"));
        assert!(!patterns[0].is_match("a@x.com.au"));
    }

    #[test]
    fn expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/srv/git"), PathBuf::from("/srv/git"));
        assert_eq!(expand_home("relative/dir"), PathBuf::from("relative/dir"));
    }

    #[test]
    fn expand_home_replaces_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~"), home);
            assert_eq!(expand_home("~/code"), home.join("code"));
        }
    }

    #[test]
    fn locate_prefers_explicit_path() {
        let dir = std::env::temp_dir();
        let explicit = dir.join("custom.toml");
        let found = TimelineConfig::locate(Some(&explicit), &dir).unwrap();
        assert_eq!(found, explicit);
    }

    #[test]
    fn default_template_is_valid() {
        let config = TimelineConfig::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.base_dirs.len(), 2);
        assert_eq!(config.days, 30);
    }
}
