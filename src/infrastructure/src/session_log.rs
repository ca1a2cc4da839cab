use crate::system_context::SystemContext;
use anyhow::Context;
use shared::types::Result;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// Fixed preamble of a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptHeader {
    pub platform: String,
    pub current_dir: String,
    pub user: String,
    pub command: String,
}

impl TranscriptHeader {
    pub fn gather(command: &str) -> Self {
        let context = SystemContext::gather();
        Self {
            platform: context.platform,
            current_dir: context.current_dir,
            user: context.user,
            command: command.to_string(),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "Platform: {}\nCurrent Directory: {}\nCurrent User: {}\nCommand: {}\nMessage:\n",
            self.platform, self.current_dir, self.user, self.command
        )
    }
}

/// Write handle on the single live transcript.
///
/// Creating a log truncates the previous transcript. The header is flushed
/// before the handle is returned and every appended chunk is flushed
/// immediately, so dropping the log on any path leaves a readable file.
pub struct SessionLog {
    path: PathBuf,
    file: File,
    bytes_written: u64,
}

impl SessionLog {
    pub async fn create(path: &Path, header: &TranscriptHeader) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create log folder {}", parent.display()))?;
        }
        let file = File::create(path)
            .await
            .with_context(|| format!("Failed to open session log {}", path.display()))?;
        let mut log = Self {
            path: path.to_path_buf(),
            file,
            bytes_written: 0,
        };
        log.append(header.render().as_bytes()).await?;
        Ok(log)
    }

    pub async fn append(&mut self, chunk: &[u8]) -> Result<()> {
        self.file
            .write_all(chunk)
            .await
            .with_context(|| format!("Failed to write session log {}", self.path.display()))?;
        self.file.flush().await?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Syncs and closes the file.
    pub async fn finish(mut self) -> Result<()> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        Ok(())
    }

    /// Reads a transcript, replacing invalid UTF-8.
    pub async fn read(path: &Path) -> Result<String> {
        let bytes = fs::read(path)
            .await
            .with_context(|| format!("Failed to read session log {}", path.display()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
