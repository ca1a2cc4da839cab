use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use domain::models::CommandChoice;
use domain::services::interaction::NONE_OF_THESE_WORK;
use domain::services::UserInteraction;
use shared::confirmation::ask_confirmation;
use shared::error::SessionError;
use shared::types::Result;

const CHOOSE_PROMPT: &str = "Choose the command: (CTRL+C to exit)";
const SOLVED_PROMPT: &str = "Is the problem solved?";

/// Menu entries shown for `candidates`, the rejection entry last.
pub fn menu_items(candidates: &[String]) -> Vec<&str> {
    candidates
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(NONE_OF_THESE_WORK))
        .collect()
}

/// Maps a menu index back to the user's choice.
pub fn choice_for_index(candidates: &[String], index: usize) -> Result<CommandChoice> {
    match candidates.get(index) {
        Some(command) => Ok(CommandChoice::Command(command.clone())),
        None if index == candidates.len() => Ok(CommandChoice::NoneWork),
        None => Err(SessionError::Interaction(format!("invalid menu index {}", index)).into()),
    }
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalInteraction;

impl UserInteraction for TerminalInteraction {
    fn show_description(&self, description: &str) {
        if !description.is_empty() {
            println!("{}", description.bold());
        }
    }

    fn show_nothing_to_do(&self) {
        println!("{}", "No recommended command needed.".green());
    }

    fn choose_command(&self, candidates: &[String]) -> Result<CommandChoice> {
        let items = menu_items(candidates);
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(CHOOSE_PROMPT)
            .items(&items)
            .default(0)
            .interact_opt()
            .map_err(SessionError::from)?;

        match selection {
            Some(index) => {
                let choice = choice_for_index(candidates, index)?;
                if let CommandChoice::Command(command) = &choice {
                    println!("{}", format!("Command: {}", command).green());
                }
                Ok(choice)
            }
            None => Err(SessionError::Interaction("selection cancelled".to_string()).into()),
        }
    }

    fn confirm_solved(&self) -> Result<bool> {
        ask_confirmation(SOLVED_PROMPT, true)
    }
}
