use crate::doubles::{suggestion, CannedOracle, QuietRunner, Script};
use application::negotiation::{NegotiationLoop, NegotiationOutcome};
use domain::models::{ChatMessage, ConversationContext};
use domain::prompts::TOOL_NAME;
use infrastructure::command_executor::CommandExecutor;
use infrastructure::openai_client::OpenAiClient;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gpt-3.5-turbo";

fn excluded(request: &[ChatMessage]) -> Vec<String> {
    request
        .get(2)
        .map(|message| {
            message
                .content
                .lines()
                .filter_map(|line| line.strip_prefix("* "))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn empty_candidates_finish_without_running_anything() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("user_program.log");
    let oracle = CannedOracle::new(vec![suggestion("Your command is already right.", &[])]);
    let executor = QuietRunner(CommandExecutor::new(&log_path));
    let script = Script::default();

    let outcome = NegotiationLoop::new(&oracle, &executor, &script, MODEL)
        .run(ConversationContext::ask("how do I list files?"))
        .await
        .unwrap();

    assert_eq!(outcome, NegotiationOutcome::NothingToDo { queries: 1 });
    assert!(!log_path.exists());
}

#[tokio::test]
async fn third_query_excludes_both_rejected_rounds() {
    let dir = TempDir::new().unwrap();
    let oracle = CannedOracle::new(vec![
        suggestion("first", &["dir", "ls -R"]),
        suggestion("second", &["tree"]),
        suggestion("third", &["echo found"]),
    ]);
    let executor = QuietRunner(CommandExecutor::new(dir.path().join("user_program.log")));
    let script = Script::default()
        .reject()
        .reject()
        .pick("echo found")
        .solved(true);

    NegotiationLoop::new(&oracle, &executor, &script, MODEL)
        .run(ConversationContext::ask("list files recursively"))
        .await
        .unwrap();

    let requests = oracle.requests();
    assert_eq!(requests.len(), 3);
    assert!(excluded(&requests[0]).is_empty());
    assert_eq!(excluded(&requests[1]), vec!["dir", "ls -R"]);
    assert_eq!(excluded(&requests[2]), vec!["dir", "ls -R", "tree"]);
}

fn tool_call(arguments: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": TOOL_NAME, "arguments": arguments.to_string()}
                }]
            }
        }]
    }))
}

#[tokio::test]
async fn failed_attempt_transcript_reaches_the_next_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(tool_call(json!({
            "description": "Print the marker",
            "recommendations": ["echo attempt-one; exit 4"]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(tool_call(json!({
            "description": "Looks fine now",
            "recommendations": []
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = OpenAiClient::new(server.uri(), "sk-test").unwrap();
    let executor = QuietRunner(CommandExecutor::new(dir.path().join("user_program.log")));
    let script = Script::default()
        .pick("echo attempt-one; exit 4")
        .solved(false);

    let outcome = NegotiationLoop::new(&client, &executor, &script, MODEL)
        .run(ConversationContext::fix("Command: make\nMessage:\nmissing target\n"))
        .await
        .unwrap();
    assert_eq!(outcome, NegotiationOutcome::NothingToDo { queries: 2 });

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let body: Value = requests[1].body_json().unwrap();
    assert_eq!(body["model"], MODEL);
    let user = body["messages"][1]["content"].as_str().unwrap();
    assert!(user.starts_with("Command: make\nMessage:\nmissing target\n\n---\n"));
    assert!(user.ends_with("Command: echo attempt-one; exit 4\nMessage:\nattempt-one\n"));
}
