use domain::services::CommandRunner;
use infrastructure::session_log::SessionLog;
use infrastructure::shell_history::ShellHistoryReader;
use shared::error::SessionError;
use shared::types::Result;
use shared::PROGRAM_NAME;
use std::path::Path;

/// Produces the first transcript of a `fix` session.
pub struct FixSeeder<'a> {
    reader: &'a ShellHistoryReader,
    runner: &'a dyn CommandRunner,
    log_path: &'a Path,
}

impl<'a> FixSeeder<'a> {
    pub fn new(
        reader: &'a ShellHistoryReader,
        runner: &'a dyn CommandRunner,
        log_path: &'a Path,
    ) -> Self {
        Self {
            reader,
            runner,
            log_path,
        }
    }

    /// Transcript of the command the user ran before `fix`.
    ///
    /// A command that already ran under `agcl run` left its transcript in the
    /// session log, so it is read back instead of being executed twice. Any
    /// other command is re-executed. With `allow_fallback`, an unreadable
    /// history falls back to whatever the session log currently holds.
    pub async fn seed(&self, allow_fallback: bool) -> Result<String> {
        let entry = match self.reader.last_command() {
            Ok(entry) => entry,
            Err(err) => {
                let unavailable = matches!(
                    SessionError::find(&err),
                    Some(SessionError::HistoryUnavailable(_))
                );
                if unavailable && allow_fallback && self.log_path.exists() {
                    tracing::warn!(
                        "{:#}; reusing the last transcript in {}",
                        err,
                        self.log_path.display()
                    );
                    return SessionLog::read(self.log_path).await;
                }
                return Err(err);
            }
        };

        if entry.is_supervised_by(PROGRAM_NAME) {
            tracing::debug!("'{}' already ran under supervision", entry.command);
            return SessionLog::read(self.log_path).await;
        }

        tracing::info!("Re-executing '{}' to capture its output", entry.command);
        let outcome = self.runner.execute(&entry.command).await?;
        Ok(outcome.transcript)
    }
}
