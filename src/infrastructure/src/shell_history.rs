//! Recovers the command typed just before the current invocation from the
//! invoking shell's history file.

use anyhow::Context;
use domain::models::{HistoryEntry, HistoryFormat, ShellKind};
use shared::error::SessionError;
use shared::types::Result;
use std::path::{Path, PathBuf};
use std::process::Command;

/// History file of `shell` under the current user's home directory.
pub fn history_file(shell: ShellKind) -> Option<PathBuf> {
    dirs::home_dir().and_then(|home| history_file_in(shell, &home))
}

fn history_file_in(shell: ShellKind, home: &Path) -> Option<PathBuf> {
    shell.history_file_name().map(|name| home.join(name))
}

#[cfg(unix)]
fn parent_process_name() -> Option<String> {
    let ppid = std::os::unix::process::parent_id();
    std::fs::read_to_string(format!("/proc/{}/comm", ppid))
        .ok()
        .or_else(|| {
            Command::new("ps")
                .args(["-o", "comm=", "-p", &ppid.to_string()])
                .output()
                .ok()
                .filter(|o| o.status.success())
                .and_then(|o| String::from_utf8(o.stdout).ok())
        })
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(not(unix))]
fn parent_process_name() -> Option<String> {
    None
}

/// Identifies the shell that launched this process.
pub fn detect_shell() -> ShellKind {
    match dirs::home_dir() {
        Some(home) => resolve_shell(parent_process_name().as_deref(), &home),
        None => {
            tracing::debug!("Home directory unavailable");
            ShellKind::Unknown
        }
    }
}

/// Maps the parent process name to a shell with a history file under `home`.
///
/// Returns `Unknown` when the parent name is missing, is not a supported
/// shell, or the shell has no history file on disk.
pub fn resolve_shell(parent: Option<&str>, home: &Path) -> ShellKind {
    let Some(name) = parent else {
        tracing::debug!("Parent process name unavailable");
        return ShellKind::Unknown;
    };
    let shell = ShellKind::from_process_name(name);
    match history_file_in(shell, home) {
        Some(path) if path.exists() => {
            tracing::debug!("Detected shell {} with history {}", shell, path.display());
            shell
        }
        _ => {
            tracing::debug!("No usable history for parent process '{}'", name);
            ShellKind::Unknown
        }
    }
}

/// Bash writes `#<epoch>` lines before entries when HISTTIMEFORMAT is set.
fn is_bash_timestamp(line: &str) -> bool {
    line.strip_prefix('#')
        .map(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

/// Picks the second-to-last entry of a history file body. The last entry is
/// the invocation reading the history and is never returned.
pub fn previous_entry(content: &str, format: HistoryFormat) -> Option<HistoryEntry> {
    let lines = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| format != HistoryFormat::Plain || !is_bash_timestamp(line));
    let mut previous = None;
    let mut last = None;
    for line in lines {
        previous = last.replace(line);
    }
    previous.map(|raw| HistoryEntry::parse(raw, format))
}

/// Reader bound to one shell for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct ShellHistoryReader {
    shell: ShellKind,
    history_file: Option<PathBuf>,
}

impl ShellHistoryReader {
    /// Detects the invoking shell once and binds its history file.
    pub fn new() -> Self {
        Self::for_shell(detect_shell())
    }

    pub fn for_shell(shell: ShellKind) -> Self {
        Self {
            shell,
            history_file: history_file(shell),
        }
    }

    /// Reads `path` with the line format of `shell`.
    pub fn with_history_file(shell: ShellKind, path: impl Into<PathBuf>) -> Self {
        Self {
            shell,
            history_file: Some(path.into()),
        }
    }

    pub fn shell(&self) -> ShellKind {
        self.shell
    }

    /// Command entered right before the current invocation.
    pub fn last_command(&self) -> Result<HistoryEntry> {
        if self.shell == ShellKind::Unknown {
            return Err(
                SessionError::HistoryUnavailable("the invoking shell is not supported".to_string())
                    .into(),
            );
        }
        let path = self.history_file.as_ref().ok_or_else(|| {
            SessionError::HistoryUnavailable(format!("no history file known for {}", self.shell))
        })?;
        let bytes = std::fs::read(path)
            .map_err(|e| {
                SessionError::HistoryUnavailable(format!("cannot read {}: {}", path.display(), e))
            })
            .with_context(|| format!("Reading {} history", self.shell))?;
        let content = String::from_utf8_lossy(&bytes);

        let entry = previous_entry(&content, self.shell.history_format()).ok_or_else(|| {
            SessionError::HistoryUnavailable(format!(
                "{} holds fewer than two commands",
                path.display()
            ))
        })?;
        tracing::debug!("Last command from {}: {}", path.display(), entry.command);
        Ok(entry)
    }
}

impl Default for ShellHistoryReader {
    fn default() -> Self {
        Self::new()
    }
}
