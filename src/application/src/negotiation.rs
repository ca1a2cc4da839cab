//! Propose / choose / execute cycle between the user and the suggestion service.

use domain::models::{CommandChoice, ConversationContext, ExecutionOutcome, Suggestion};
use domain::prompts::build_messages;
use domain::services::{CommandRunner, SuggestionOracle, UserInteraction};
use shared::types::Result;

/// How a negotiation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationOutcome {
    /// The user confirmed an executed command solved the problem.
    Solved { queries: usize },
    /// The service answered with no candidate commands.
    NothingToDo { queries: usize },
}

#[derive(Debug)]
enum State {
    QueryOracle,
    Present(Suggestion),
    Execute(String),
    AskContinue(ExecutionOutcome),
    Done,
}

/// Drives one `ask` or `fix` session.
///
/// The rejected-command set lives in the [`ConversationContext`] handed to
/// [`NegotiationLoop::run`]: it grows for the whole session, across commands
/// that did not solve the problem, and is dropped when `run` returns.
pub struct NegotiationLoop<'a> {
    oracle: &'a dyn SuggestionOracle,
    runner: &'a dyn CommandRunner,
    interaction: &'a dyn UserInteraction,
    model: String,
}

impl<'a> NegotiationLoop<'a> {
    pub fn new(
        oracle: &'a dyn SuggestionOracle,
        runner: &'a dyn CommandRunner,
        interaction: &'a dyn UserInteraction,
        model: impl Into<String>,
    ) -> Self {
        Self {
            oracle,
            runner,
            interaction,
            model: model.into(),
        }
    }

    pub async fn run(&self, mut context: ConversationContext) -> Result<NegotiationOutcome> {
        let mut state = State::QueryOracle;
        let mut queries = 0usize;

        loop {
            state = match state {
                State::QueryOracle => {
                    let messages = build_messages(&context);
                    queries += 1;
                    tracing::debug!(
                        "Query {} ({:?} mode, {} rejected)",
                        queries,
                        context.mode,
                        context.rejected().len()
                    );
                    let suggestion = self.oracle.suggest(&messages, &self.model).await?;
                    State::Present(suggestion)
                }
                State::Present(suggestion) => {
                    self.interaction.show_description(&suggestion.description);
                    if suggestion.commands.is_empty() {
                        self.interaction.show_nothing_to_do();
                        return Ok(NegotiationOutcome::NothingToDo { queries });
                    }
                    match self.interaction.choose_command(&suggestion.commands)? {
                        CommandChoice::Command(command) => State::Execute(command),
                        CommandChoice::NoneWork => {
                            context.reject_all(&suggestion.commands);
                            tracing::info!("Rejected: {}", suggestion.commands.join(", "));
                            State::QueryOracle
                        }
                    }
                }
                State::Execute(command) => State::AskContinue(self.runner.execute(&command).await?),
                State::AskContinue(outcome) => {
                    if self.interaction.confirm_solved()? {
                        State::Done
                    } else {
                        context.append_transcript(&outcome.transcript);
                        State::QueryOracle
                    }
                }
                State::Done => return Ok(NegotiationOutcome::Solved { queries }),
            };
        }
    }
}
