//! Repository discovery under configured root directories.

use std::path::Path;

use timeline_core::RepositoryHandle;
use walkdir::{DirEntry, WalkDir};

/// Name of git's metadata directory.
const GIT_DIR: &str = ".git";

/// Find every git repository below each of `roots`.
///
/// A directory holding a `.git` directory is reported as a repository and
/// the walk continues through its working tree, but never into `.git`
/// itself. A `.git` file (submodule checkouts, linked worktrees) does not
/// make a repository.
/// Roots that are missing, not directories, or unreadable contribute
/// nothing. The result has no particular order.
///
/// # Examples
///
/// ```
/// use timeline_history::discovery::find_repositories;
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::create_dir_all(dir.path().join("G1/A/.git")).unwrap();
///
/// let repos = find_repositories(&[dir.path().join("G1")]);
/// assert_eq!(repos.len(), 1);
/// assert_eq!(repos[0].display_name, "A");
/// assert_eq!(repos[0].group_label, "G1");
/// ```
pub fn find_repositories<P: AsRef<Path>>(roots: &[P]) -> Vec<RepositoryHandle> {
    roots
        .iter()
        .flat_map(|root| find_in_root(root.as_ref()))
        .collect()
}

fn find_in_root(root: &Path) -> Vec<RepositoryHandle> {
    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "skipping root: not a readable directory");
        return Vec::new();
    }

    let group_label = base_name(root);
    let mut repos = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_git_dir(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        if entry.path().join(GIT_DIR).is_dir() {
            let path = entry.path().to_path_buf();
            tracing::debug!(repo = %path.display(), group = %group_label, "found repository");
            repos.push(RepositoryHandle {
                display_name: base_name(&path),
                path,
                group_label: group_label.clone(),
            });
        }
    }

    repos
}

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == GIT_DIR
}

/// Last path component, falling back to the whole path for roots like `/`.
fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    fn names(repos: &[RepositoryHandle]) -> Vec<String> {
        let mut names: Vec<String> = repos.iter().map(|r| r.display_name.clone()).collect();
        names.sort();
        names
    }

    #[test]
    fn roots_without_repositories_yield_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        fs::write(dir.path().join("a/readme.txt"), "hi").unwrap();

        assert!(find_repositories(&[dir.path()]).is_empty());
    }

    #[test]
    fn missing_and_file_roots_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        fs::write(&file, "x").unwrap();
        fs::create_dir_all(dir.path().join("real/R/.git")).unwrap();

        let roots = vec![
            PathBuf::from("/definitely/not/here"),
            file,
            dir.path().join("real"),
        ];
        let repos = find_repositories(&roots);
        assert_eq!(names(&repos), vec!["R"]);
    }

    #[test]
    fn never_descends_into_git_metadata() {
        let dir = tempfile::tempdir().unwrap();
        // A directory inside .git that itself looks like a repository root.
        fs::create_dir_all(dir.path().join("root/A/.git/modules/fake/.git")).unwrap();

        let repos = find_repositories(&[dir.path().join("root")]);
        assert_eq!(names(&repos), vec!["A"]);
    }

    #[test]
    fn nested_working_tree_repositories_are_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("root/outer/.git")).unwrap();
        fs::create_dir_all(dir.path().join("root/outer/vendor/inner/.git")).unwrap();

        let repos = find_repositories(&[dir.path().join("root")]);
        assert_eq!(names(&repos), vec!["inner", "outer"]);
    }

    #[test]
    fn git_file_does_not_mark_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("root/worktree")).unwrap();
        fs::write(
            dir.path().join("root/worktree/.git"),
            "gitdir: /elsewhere/.git/worktrees/w",
        )
        .unwrap();

        assert!(find_repositories(&[dir.path().join("root")]).is_empty());
    }

    #[test]
    fn submodule_checkout_is_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("G/parent/.git/modules/sub")).unwrap();
        fs::create_dir_all(dir.path().join("G/parent/libs/sub")).unwrap();
        fs::write(
            dir.path().join("G/parent/libs/sub/.git"),
            "gitdir: ../../.git/modules/sub",
        )
        .unwrap();

        let repos = find_repositories(&[dir.path().join("G")]);
        assert_eq!(names(&repos), vec!["parent"]);
    }

    #[test]
    fn group_label_comes_from_the_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("G1/deep/er/A/.git")).unwrap();
        fs::create_dir_all(dir.path().join("G2/B/.git")).unwrap();

        let repos = find_repositories(&[dir.path().join("G1"), dir.path().join("G2")]);
        let a = repos.iter().find(|r| r.display_name == "A").unwrap();
        let b = repos.iter().find(|r| r.display_name == "B").unwrap();
        assert_eq!(a.group_label, "G1");
        assert_eq!(b.group_label, "G2");
        assert_eq!(a.path, dir.path().join("G1/deep/er/A"));
    }

    #[test]
    fn root_that_is_itself_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("solo/.git")).unwrap();

        let repos = find_repositories(&[dir.path().join("solo")]);
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].display_name, "solo");
        assert_eq!(repos[0].group_label, "solo");
    }
}
