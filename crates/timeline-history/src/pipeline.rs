//! Discovery → collection → filtering → classification → dataset.

use chrono::{DateTime, Utc};
use timeline_core::{FilteredCommit, RepositoryHandle, TimelineConfig, TimelineError};

use crate::dataset::CommitDataset;
use crate::discovery::find_repositories;
use crate::filter::CommitFilter;
use crate::mining::collect_commits;

/// Run the whole collection pipeline for `config`, measuring recency from `now`.
///
/// # Errors
///
/// Returns [`TimelineError::Pattern`] for an invalid committer pattern,
/// [`TimelineError::Config`] for a lookback window outside the date range,
/// [`TimelineError::EmptyResult`] when nothing survives filtering, or
/// [`TimelineError::MissingField`] if a record lacks a timestamp.
pub fn build_dataset(
    config: &TimelineConfig,
    now: DateTime<Utc>,
) -> Result<CommitDataset, TimelineError> {
    build_dataset_with_progress(config, now, |_| {})
}

/// Like [`build_dataset`], calling `on_repository` once per discovered
/// repository before its history is read.
///
/// # Errors
///
/// See [`build_dataset`].
pub fn build_dataset_with_progress<F>(
    config: &TimelineConfig,
    now: DateTime<Utc>,
    mut on_repository: F,
) -> Result<CommitDataset, TimelineError>
where
    F: FnMut(&RepositoryHandle),
{
    let filter = CommitFilter::from_config(config, now)?;

    let mut repos = discover(config);
    repos.sort();
    tracing::info!(repositories = repos.len(), "discovered repositories");

    let mut records = Vec::new();
    for repo in &repos {
        on_repository(repo);
        records.extend(filtered_commits(repo, config, &filter));
    }
    tracing::info!(commits = records.len(), "commits matched filters");

    CommitDataset::assemble(records, config.days, &config.committers)
}

/// Repositories below every configured root.
pub fn discover(config: &TimelineConfig) -> Vec<RepositoryHandle> {
    find_repositories(&config.expanded_base_dirs())
}

/// Filtered and classified commits of one repository across all branches.
///
/// A repository that cannot be read is logged and contributes nothing.
pub fn filtered_commits(
    repo: &RepositoryHandle,
    config: &TimelineConfig,
    filter: &CommitFilter,
) -> Vec<FilteredCommit> {
    let histories = match collect_commits(repo, &config.branches, &config.timezone) {
        Ok(histories) => histories,
        Err(e) => {
            tracing::warn!(repo = %repo.path.display(), error = %e, "skipping repository");
            return Vec::new();
        }
    };

    histories
        .into_iter()
        .flat_map(|history| {
            let branch = history.branch;
            history
                .commits
                .into_iter()
                .filter(|commit| filter.accepts(commit))
                .map(move |commit| FilteredCommit::new(commit, repo, &branch))
                .collect::<Vec<_>>()
        })
        .collect()
}
