use domain::models::{ChatMessage, CommandChoice, ExecutionOutcome, Suggestion};
use domain::services::{CommandRunner, SuggestionOracle, UserInteraction};
use infrastructure::command_executor::CommandExecutor;
use shared::types::Result;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Oracle that replays canned suggestions and keeps every request.
pub struct CannedOracle {
    answers: Mutex<VecDeque<Suggestion>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl CannedOracle {
    pub fn new(answers: Vec<Suggestion>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SuggestionOracle for CannedOracle {
    async fn suggest(&self, messages: &[ChatMessage], _model: &str) -> Result<Suggestion> {
        self.requests.lock().unwrap().push(messages.to_vec());
        Ok(self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .expect("oracle queried more often than scripted"))
    }
}

/// Real executor whose terminal copies are discarded.
pub struct QuietRunner(pub CommandExecutor);

#[async_trait::async_trait]
impl CommandRunner for QuietRunner {
    async fn execute(&self, command: &str) -> Result<ExecutionOutcome> {
        self.0
            .execute_with_sinks(command, tokio::io::sink(), tokio::io::sink())
            .await
    }
}

/// Replays menu choices and "solved?" answers.
#[derive(Default)]
pub struct Script {
    choices: Mutex<VecDeque<CommandChoice>>,
    solved: Mutex<VecDeque<bool>>,
}

impl Script {
    pub fn pick(self, command: &str) -> Self {
        self.choices
            .lock()
            .unwrap()
            .push_back(CommandChoice::Command(command.to_string()));
        self
    }

    pub fn reject(self) -> Self {
        self.choices.lock().unwrap().push_back(CommandChoice::NoneWork);
        self
    }

    pub fn solved(self, answer: bool) -> Self {
        self.solved.lock().unwrap().push_back(answer);
        self
    }
}

impl UserInteraction for Script {
    fn show_description(&self, _description: &str) {}

    fn show_nothing_to_do(&self) {}

    fn choose_command(&self, _candidates: &[String]) -> Result<CommandChoice> {
        Ok(self
            .choices
            .lock()
            .unwrap()
            .pop_front()
            .expect("menu shown more often than scripted"))
    }

    fn confirm_solved(&self) -> Result<bool> {
        Ok(self
            .solved
            .lock()
            .unwrap()
            .pop_front()
            .expect("asked more often than scripted"))
    }
}

pub fn suggestion(description: &str, commands: &[&str]) -> Suggestion {
    Suggestion {
        description: description.to_string(),
        commands: commands.iter().map(|c| c.to_string()).collect(),
    }
}
