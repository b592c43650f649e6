//! Commit extraction via git2.
//!
//! Walks the full ancestry of each configured branch and records, per
//! commit, its committer, instant, message summary and changed-line count.

use git2::{BranchType, Commit, DiffOptions, Repository, Sort};
use timeline_core::{RawCommit, RepositoryHandle, TimelineError, TimezonePolicy};

/// Commits reachable from one branch tip, newest first.
#[derive(Debug, Clone)]
pub struct BranchHistory {
    /// Branch the ancestry was walked from.
    pub branch: String,
    /// Ancestry in revwalk order (newest first).
    pub commits: Vec<RawCommit>,
}

/// Collect the history of every branch in `branches` that exists in `repo`.
///
/// Branches are visited in the given order and each is walked
/// independently, so a commit reachable from two branches appears in both
/// histories. Branches the repository does not have are skipped, and so is
/// a branch whose walk fails part way; the other branches are still returned.
///
/// # Errors
///
/// Returns [`TimelineError::Git`] if the repository cannot be opened.
pub fn collect_commits(
    repo: &RepositoryHandle,
    branches: &[String],
    timezone: &TimezonePolicy,
) -> Result<Vec<BranchHistory>, TimelineError> {
    let git = Repository::open(&repo.path).map_err(|e| {
        TimelineError::Git(format!("failed to open {}: {e}", repo.path.display()))
    })?;

    let mut histories = Vec::new();
    for branch in branches {
        let Some(tip) = branch_tip(&git, branch) else {
            tracing::debug!(repo = %repo.display_name, %branch, "branch not present, skipping");
            continue;
        };

        let commits = match walk_ancestry(&git, tip, timezone) {
            Ok(commits) => commits,
            Err(e) => {
                tracing::warn!(repo = %repo.display_name, %branch, error = %e, "skipping branch");
                continue;
            }
        };
        tracing::debug!(
            repo = %repo.display_name,
            %branch,
            commits = commits.len(),
            "walked branch"
        );
        histories.push(BranchHistory {
            branch: branch.clone(),
            commits,
        });
    }

    Ok(histories)
}

/// Tip of the local branch `name`, if the repository has one.
fn branch_tip(git: &Repository, name: &str) -> Option<git2::Oid> {
    git.find_branch(name, BranchType::Local)
        .ok()
        .and_then(|branch| branch.get().target())
}

fn walk_ancestry(
    git: &Repository,
    tip: git2::Oid,
    timezone: &TimezonePolicy,
) -> Result<Vec<RawCommit>, TimelineError> {
    let mut revwalk = git
        .revwalk()
        .map_err(|e| TimelineError::Git(format!("failed to create revwalk: {e}")))?;

    revwalk
        .set_sorting(Sort::TIME)
        .map_err(|e| TimelineError::Git(format!("failed to set revwalk order: {e}")))?;
    revwalk
        .push(tip)
        .map_err(|e| TimelineError::Git(format!("failed to push {tip}: {e}")))?;

    let mut commits = Vec::new();
    for oid_result in revwalk {
        let oid = oid_result.map_err(|e| TimelineError::Git(format!("revwalk error: {e}")))?;

        let commit = git
            .find_commit(oid)
            .map_err(|e| TimelineError::Git(format!("failed to find commit {oid}: {e}")))?;

        let epoch_seconds = commit.time().seconds();
        let committer = commit.committer();

        commits.push(RawCommit {
            hash: oid.to_string(),
            committer_email: String::from_utf8_lossy(committer.email_bytes()).into_owned(),
            epoch_seconds,
            timestamp: timezone.resolve(epoch_seconds),
            message: commit.summary().unwrap_or("").to_string(),
            total_changed_lines: changed_lines(git, &commit)?,
        });
    }

    Ok(commits)
}

/// Insertions plus deletions against the first parent (or the empty tree).
fn changed_lines(git: &Repository, commit: &Commit) -> Result<u64, TimelineError> {
    let commit_tree = commit
        .tree()
        .map_err(|e| TimelineError::Git(format!("failed to get commit tree: {e}")))?;

    let parent_tree = if commit.parent_count() > 0 {
        let parent = commit
            .parent(0)
            .map_err(|e| TimelineError::Git(format!("failed to get parent: {e}")))?;
        Some(
            parent
                .tree()
                .map_err(|e| TimelineError::Git(format!("failed to get parent tree: {e}")))?,
        )
    } else {
        None
    };

    let mut diff_opts = DiffOptions::new();
    let diff = git
        .diff_tree_to_tree(
            parent_tree.as_ref(),
            Some(&commit_tree),
            Some(&mut diff_opts),
        )
        .map_err(|e| TimelineError::Git(format!("failed to compute diff: {e}")))?;

    let stats = diff
        .stats()
        .map_err(|e| TimelineError::Git(format!("failed to compute diff stats: {e}")))?;

    Ok((stats.insertions() + stats.deletions()) as u64)
}
