use application::fix_seeder::FixSeeder;
use application::negotiation::{NegotiationLoop, NegotiationOutcome};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Password;
use domain::models::{ConversationContext, ShellKind};
use infrastructure::command_executor::CommandExecutor;
use infrastructure::config::ConfigStore;
use infrastructure::openai_client::OpenAiClient;
use infrastructure::shell_history::ShellHistoryReader;
use shared::error::SessionError;
use shared::types::Result;
use std::path::PathBuf;

use crate::interaction::TerminalInteraction;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Parser, Debug, Clone)]
#[command(name = "agcl", version)]
#[command(about = "AGCL: Run commands and fix errors using GPT.")]
pub struct Cli {
    /// Chat model used for suggestions
    #[arg(long, global = true, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Log at debug level for this run
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a command and keep its output for a later `fix`
    Run {
        #[arg(
            trailing_var_arg = true,
            allow_hyphen_values = true,
            required = true,
            value_name = "COMMAND"
        )]
        command: Vec<String>,
    },

    /// Get a command suggestion from GPT
    Ask {
        #[arg(
            trailing_var_arg = true,
            allow_hyphen_values = true,
            required = true,
            value_name = "PROMPT"
        )]
        prompt: Vec<String>,
    },

    /// Fix the last error
    Fix {
        /// Reuse the saved transcript when the shell history is unreadable
        #[arg(long)]
        reuse_log: bool,

        /// Read this history file instead of detecting the invoking shell
        #[arg(long, value_name = "FILE", requires = "shell")]
        history_file: Option<PathBuf>,

        /// Shell whose history format applies (bash, sh, ash, zsh)
        #[arg(long, value_name = "SHELL")]
        shell: Option<ShellKind>,
    },
}

fn prompt_for_key() -> Result<String> {
    let key = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Please input your OpenAI key")
        .interact()
        .map_err(SessionError::from)?;
    Ok(key)
}

pub struct CliApp {
    config: ConfigStore,
}

impl CliApp {
    pub fn new(config: ConfigStore) -> Self {
        Self { config }
    }

    /// Dispatches one invocation and returns the process exit code.
    pub async fn run(&mut self, cli: Cli) -> Result<i32> {
        let log_path = self.config.log_path()?;
        let executor = CommandExecutor::new(&log_path);

        match cli.command {
            Commands::Run { command } => {
                let command = command.join(" ");
                let outcome = executor.execute(&command).await?;
                Ok(outcome.exit_code.unwrap_or(1))
            }
            Commands::Ask { prompt } => {
                let client = self.oracle()?;
                let context = ConversationContext::ask(prompt.join(" "));
                self.negotiate(&client, &executor, &cli.model, context).await
            }
            Commands::Fix {
                reuse_log,
                history_file,
                shell,
            } => {
                let client = self.oracle()?;
                let reader = match (history_file, shell) {
                    (Some(path), Some(shell)) => ShellHistoryReader::with_history_file(shell, path),
                    (_, Some(shell)) => ShellHistoryReader::for_shell(shell),
                    (_, None) => ShellHistoryReader::new(),
                };
                tracing::debug!("Shell: {}", reader.shell());

                let transcript = FixSeeder::new(&reader, &executor, &log_path)
                    .seed(reuse_log)
                    .await?;
                let context = ConversationContext::fix(transcript);
                self.negotiate(&client, &executor, &cli.model, context).await
            }
        }
    }

    fn oracle(&mut self) -> Result<OpenAiClient> {
        let key = self.config.ensure_openai_key(prompt_for_key)?;
        OpenAiClient::new(self.config.openai_base_url(), key)
    }

    async fn negotiate(
        &self,
        client: &OpenAiClient,
        executor: &CommandExecutor,
        model: &str,
        context: ConversationContext,
    ) -> Result<i32> {
        let interaction = TerminalInteraction;
        let outcome = NegotiationLoop::new(client, executor, &interaction, model)
            .run(context)
            .await?;
        match outcome {
            NegotiationOutcome::Solved { queries } => {
                tracing::info!("Solved after {} queries", queries);
                println!("{}", "Glad it worked out.".green());
            }
            NegotiationOutcome::NothingToDo { queries } => {
                tracing::info!("Nothing to do after {} queries", queries);
            }
        }
        Ok(0)
    }
}
