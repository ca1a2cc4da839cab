use crate::models::ExecutionOutcome;
use shared::types::Result;

/// Runs a command under supervision and captures its transcript.
///
/// A nonzero exit code is reported through [`ExecutionOutcome::exit_code`],
/// only a command that cannot be launched at all is an error.
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    async fn execute(&self, command: &str) -> Result<ExecutionOutcome>;
}
