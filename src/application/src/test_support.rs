use domain::models::{ChatMessage, CommandChoice, ExecutionOutcome, Suggestion};
use domain::services::{CommandRunner, SuggestionOracle, UserInteraction};
use shared::error::SessionError;
use shared::types::Result;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Answers with a fixed sequence of suggestions and records every request.
pub struct ScriptedOracle {
    answers: Mutex<VecDeque<std::result::Result<Suggestion, SessionError>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
    models: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new(answers: Vec<std::result::Result<Suggestion, SessionError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            requests: Mutex::new(Vec::new()),
            models: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn models(&self) -> Vec<String> {
        self.models.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SuggestionOracle for ScriptedOracle {
    async fn suggest(&self, messages: &[ChatMessage], model: &str) -> Result<Suggestion> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.models.lock().unwrap().push(model.to_string());
        match self.answers.lock().unwrap().pop_front() {
            Some(Ok(suggestion)) => Ok(suggestion),
            Some(Err(err)) => Err(err.into()),
            None => panic!("oracle queried more often than scripted"),
        }
    }
}

/// Records executed commands and returns the same transcript for each.
#[derive(Default)]
pub struct RecordingRunner {
    transcript: String,
    commands: Mutex<Vec<String>>,
}

impl RecordingRunner {
    pub fn with_transcript(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CommandRunner for RecordingRunner {
    async fn execute(&self, command: &str) -> Result<ExecutionOutcome> {
        self.commands.lock().unwrap().push(command.to_string());
        Ok(ExecutionOutcome {
            exit_code: Some(1),
            transcript: self.transcript.clone(),
        })
    }
}

/// Plays back menu choices and "solved?" answers in order.
#[derive(Default)]
pub struct ScriptedInteraction {
    choices: Mutex<VecDeque<CommandChoice>>,
    confirmations: Mutex<VecDeque<bool>>,
    descriptions: Mutex<Vec<String>>,
    nothing_to_do: Mutex<bool>,
}

impl ScriptedInteraction {
    pub fn choose(self, choice: CommandChoice) -> Self {
        self.choices.lock().unwrap().push_back(choice);
        self
    }

    pub fn confirm(self, solved: bool) -> Self {
        self.confirmations.lock().unwrap().push_back(solved);
        self
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.descriptions.lock().unwrap().clone()
    }

    pub fn saw_nothing_to_do(&self) -> bool {
        *self.nothing_to_do.lock().unwrap()
    }
}

impl UserInteraction for ScriptedInteraction {
    fn show_description(&self, description: &str) {
        self.descriptions
            .lock()
            .unwrap()
            .push(description.to_string());
    }

    fn show_nothing_to_do(&self) {
        *self.nothing_to_do.lock().unwrap() = true;
    }

    fn choose_command(&self, candidates: &[String]) -> Result<CommandChoice> {
        let choice = self
            .choices
            .lock()
            .unwrap()
            .pop_front()
            .expect("menu shown more often than scripted");
        if let CommandChoice::Command(command) = &choice {
            assert!(candidates.contains(command), "{command} was not offered");
        }
        Ok(choice)
    }

    fn confirm_solved(&self) -> Result<bool> {
        Ok(self
            .confirmations
            .lock()
            .unwrap()
            .pop_front()
            .expect("asked more often than scripted"))
    }
}
