use crate::session_log::{SessionLog, TranscriptHeader};
use domain::models::ExecutionOutcome;
use domain::services::CommandRunner;
use shared::error::SessionError;
use shared::types::Result;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tokio::sync::Mutex;

const CHUNK_SIZE: usize = 8 * 1024;

/// Runs commands through `sh -c` while teeing both output streams to the
/// terminal and to the session log.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    log_path: PathBuf,
    interpreter: String,
}

impl CommandExecutor {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            interpreter: "sh".to_string(),
        }
    }

    /// Uses another POSIX shell as the interpreter.
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Executes `command` with the process's own stdout/stderr as terminal sinks.
    pub async fn execute(&self, command: &str) -> Result<ExecutionOutcome> {
        self.execute_with_sinks(command, tokio::io::stdout(), tokio::io::stderr())
            .await
    }

    /// Executes `command`, copying its stdout into `out` and its stderr into
    /// `err`, and both into the session log.
    ///
    /// Returns once both streams hit EOF and the child has exited. Bytes of
    /// one stream keep their order in the log; the two streams interleave in
    /// whatever order their chunks were read.
    pub async fn execute_with_sinks<O, E>(
        &self,
        command: &str,
        out: O,
        err: E,
    ) -> Result<ExecutionOutcome>
    where
        O: AsyncWrite + Unpin + Send,
        E: AsyncWrite + Unpin + Send,
    {
        let header = TranscriptHeader::gather(command);
        let log = SessionLog::create(&self.log_path, &header).await?;
        tracing::debug!("Command: {}", command);

        let mut child = Command::new(&self.interpreter)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                SessionError::ExecutionFailed(format!(
                    "failed to launch '{}' with {}: {}",
                    command, self.interpreter, e
                ))
            })?;

        let child_stdout = child.stdout.take().ok_or_else(|| {
            SessionError::ExecutionFailed("child stdout was not captured".to_string())
        })?;
        let child_stderr = child.stderr.take().ok_or_else(|| {
            SessionError::ExecutionFailed("child stderr was not captured".to_string())
        })?;

        let log = Mutex::new(log);
        let (stdout_result, stderr_result) = tokio::join!(
            drain(child_stdout, out, &log, "stdout"),
            drain(child_stderr, err, &log, "stderr"),
        );

        let status = child.wait().await.map_err(|e| {
            SessionError::ExecutionFailed(format!("failed to wait for '{}': {}", command, e))
        })?;

        let log = log.into_inner();
        let captured = log.bytes_written();
        log.finish().await?;
        stdout_result?;
        stderr_result?;

        let exit_code = status.code();
        if exit_code != Some(0) {
            tracing::info!("Command '{}' exited with {:?}", command, exit_code);
        }
        tracing::debug!("Captured {} bytes into {}", captured, self.log_path.display());

        let transcript = SessionLog::read(&self.log_path).await?;
        Ok(ExecutionOutcome {
            exit_code,
            transcript,
        })
    }
}

#[async_trait::async_trait]
impl CommandRunner for CommandExecutor {
    async fn execute(&self, command: &str) -> Result<ExecutionOutcome> {
        CommandExecutor::execute(self, command).await
    }
}

/// Copies `source` chunk by chunk into `terminal` and then into `log`.
///
/// Keeps reading until EOF even after a write failure so the child never
/// blocks on a full pipe. A terminal failure only stops the terminal copy; the
/// first log failure is returned once the stream is exhausted.
async fn drain<R, W>(
    mut source: R,
    mut terminal: W,
    log: &Mutex<SessionLog>,
    stream: &str,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut terminal_open = true;
    let mut log_error: Option<anyhow::Error> = None;

    loop {
        let n = match source.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!("Reading child {} failed: {}", stream, e);
                break;
            }
        };
        let chunk = &buf[..n];

        if terminal_open {
            let written = async {
                terminal.write_all(chunk).await?;
                terminal.flush().await
            }
            .await;
            if let Err(e) = written {
                tracing::warn!("Terminal {} closed: {}", stream, e);
                terminal_open = false;
            }
        }

        if log_error.is_none() {
            if let Err(e) = log.lock().await.append(chunk).await {
                log_error = Some(e);
            }
        }
    }

    match log_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
