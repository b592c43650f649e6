//! Core types, configuration, and error handling for git-timeline.
//!
//! This crate provides the shared foundation used by the other crates:
//! - [`TimelineError`] — unified error type using `thiserror`
//! - [`TimelineConfig`] — configuration loaded from `.git-timeline.toml`
//! - Shared records: [`RepositoryHandle`], [`RawCommit`], [`FilteredCommit`],
//!   [`ChangeSize`], [`TimezonePolicy`]

mod config;
mod error;
mod types;

pub use config::{expand_home, TimelineConfig, DEFAULT_CONFIG, LOCAL_CONFIG_FILE, MAX_DAYS};
pub use error::TimelineError;
pub use types::{ChangeSize, FilteredCommit, RawCommit, RepositoryHandle, TimezonePolicy};

/// A convenience `Result` type for timeline operations.
pub type Result<T> = std::result::Result<T, TimelineError>;
