use infrastructure::command_executor::CommandExecutor;
use tempfile::TempDir;

#[tokio::test]
async fn echo_log_ends_with_marker_and_output() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("user_program.log");
    CommandExecutor::new(&log_path)
        .execute_with_sinks("echo 123", tokio::io::sink(), tokio::io::sink())
        .await
        .unwrap();

    let bytes = std::fs::read(&log_path).unwrap();
    assert!(bytes.ends_with(b"Message:\n123\n"));
}

#[tokio::test]
async fn megabytes_on_both_streams_arrive_intact() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("user_program.log");
    let stdout_size = 4 * 1024 * 1024;
    let stderr_size = 1024 * 1024;
    let command = format!(
        "head -c {} /dev/zero | tr '\\0' 'o' & head -c {} /dev/zero | tr '\\0' 'e' >&2; wait",
        stdout_size, stderr_size
    );

    let mut out = Vec::new();
    let outcome = CommandExecutor::new(&log_path)
        .execute_with_sinks(&command, &mut out, tokio::io::sink())
        .await
        .unwrap();

    assert_eq!(outcome.exit_code, Some(0));
    assert_eq!(out.len(), stdout_size);
    let message = outcome.transcript.split("Message:\n").nth(1).unwrap();
    assert_eq!(message.matches('o').count(), stdout_size);
    assert_eq!(message.matches('e').count(), stderr_size);
}
