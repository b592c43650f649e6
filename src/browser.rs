use std::path::Path;
use std::process::Command;

use timeline_core::TimelineError;

/// Browser value meaning "only write the file".
pub const NO_BROWSER: &str = "none";

/// Browser value meaning "use the platform's default opener".
pub const DEFAULT_BROWSER: &str = "default";

/// Build the command that opens `path` with `browser`, or `None` for `"none"`.
pub fn command_for(path: &Path, browser: &str) -> Option<Command> {
    match browser {
        NO_BROWSER => None,
        DEFAULT_BROWSER => Some(default_opener(path)),
        program => {
            let mut cmd = Command::new(program);
            cmd.arg(path);
            Some(cmd)
        }
    }
}

#[cfg(target_os = "macos")]
fn default_opener(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(target_os = "windows")]
fn default_opener(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn default_opener(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}

/// Launch `browser` on `path` without waiting for it to exit.
///
/// # Errors
///
/// Returns [`TimelineError::Browser`] if the program cannot be started.
pub fn open(path: &Path, browser: &str) -> Result<(), TimelineError> {
    let Some(mut cmd) = command_for(path, browser) else {
        tracing::debug!("browser disabled, not opening output");
        return Ok(());
    };

    tracing::debug!(?cmd, "opening timeline");
    cmd.spawn().map(|_| ()).map_err(|e| TimelineError::Browser {
        path: path.to_path_buf(),
        browser: browser.to_string(),
        reason: e.to_string(),
    })
}
