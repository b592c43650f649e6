//! Commit history collection for the timeline.
//!
//! Finds repositories under the configured roots, walks each configured
//! branch with git2, keeps the commits that pass the recency, hour-of-day
//! and committer filters, and assembles them into a [`CommitDataset`].

pub mod dataset;
pub mod discovery;
pub mod filter;
pub mod mining;
pub mod pipeline;

pub use dataset::{CommitDataset, DisplayWindow};
pub use pipeline::build_dataset;
