use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shell that launched the current process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    Bash,
    Sh,
    Ash,
    Zsh,
    Unknown,
}

/// How a single history line encodes the command text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFormat {
    /// One command per line, nothing else.
    Plain,
    /// `: <epoch>:<elapsed>;<command>` as written by zsh's EXTENDED_HISTORY.
    ZshExtended,
}

impl ShellKind {
    /// History file name relative to the home directory.
    pub fn history_file_name(self) -> Option<&'static str> {
        match self {
            ShellKind::Bash => Some(".bash_history"),
            ShellKind::Sh => Some(".sh_history"),
            ShellKind::Ash => Some(".ash_history"),
            ShellKind::Zsh => Some(".zsh_history"),
            ShellKind::Unknown => None,
        }
    }

    pub fn history_format(self) -> HistoryFormat {
        match self {
            ShellKind::Zsh => HistoryFormat::ZshExtended,
            ShellKind::Bash | ShellKind::Sh | ShellKind::Ash | ShellKind::Unknown => {
                HistoryFormat::Plain
            }
        }
    }

    /// Maps a process command name (`bash`, `-zsh`, `/bin/ash`) to a shell.
    pub fn from_process_name(name: &str) -> ShellKind {
        let name = name.trim();
        let name = name.rsplit('/').next().unwrap_or(name);
        let name = name.trim_start_matches('-');
        match name {
            "bash" => ShellKind::Bash,
            "sh" => ShellKind::Sh,
            "ash" => ShellKind::Ash,
            "zsh" => ShellKind::Zsh,
            _ => ShellKind::Unknown,
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellKind::Bash => write!(f, "bash"),
            ShellKind::Sh => write!(f, "sh"),
            ShellKind::Ash => write!(f, "ash"),
            ShellKind::Zsh => write!(f, "zsh"),
            ShellKind::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for ShellKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match ShellKind::from_process_name(s) {
            ShellKind::Unknown => Err(format!(
                "unsupported shell '{}', expected one of: bash, sh, ash, zsh",
                s
            )),
            kind => Ok(kind),
        }
    }
}

/// One raw line of a history file together with the command it encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub raw: String,
    pub command: String,
}

impl HistoryEntry {
    /// Extracts the command text of one history line.
    ///
    /// Zsh lines are cut after the first `;`, so a zsh history written without
    /// EXTENDED_HISTORY loses the head of a chained command line: `cd /tmp; make`
    /// comes back as `make`.
    pub fn parse(raw: &str, format: HistoryFormat) -> Self {
        let command = match format {
            HistoryFormat::Plain => raw,
            HistoryFormat::ZshExtended => match raw.split_once(';') {
                Some((_metadata, command)) => command,
                None => raw,
            },
        };
        Self {
            raw: raw.to_string(),
            command: command.trim().to_string(),
        }
    }

    /// True when the command was launched through `program`, meaning its
    /// output is already in the session log.
    pub fn is_supervised_by(&self, program: &str) -> bool {
        self.command
            .split_whitespace()
            .next()
            .map(|first| first.rsplit('/').next().unwrap_or(first) == program)
            .unwrap_or(false)
    }
}

/// Which system prompt a conversation is seeded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionMode {
    Ask,
    Fix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Oracle answer. An empty `commands` list means nothing needs to be done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub description: String,
    pub commands: Vec<String>,
}

/// Result of one supervised command run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// `None` when the child was killed by a signal.
    pub exit_code: Option<i32>,
    /// Full session log contents after the run.
    pub transcript: String,
}

impl ExecutionOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// What the user picked from a suggestion menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandChoice {
    Command(String),
    NoneWork,
}

/// Separator placed between transcripts accumulated in one conversation.
pub const TRANSCRIPT_SEPARATOR: &str = "\n---\n";

/// Mutable state of one negotiation session.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    pub mode: SuggestionMode,
    /// Ask text or fix transcript the session started from.
    pub original: String,
    /// Seed plus every transcript appended after an unsatisfying command.
    pub last_message: String,
    rejected: Vec<String>,
}

impl ConversationContext {
    pub fn new(mode: SuggestionMode, seed: impl Into<String>) -> Self {
        let seed = seed.into();
        Self {
            mode,
            original: seed.clone(),
            last_message: seed,
            rejected: Vec::new(),
        }
    }

    pub fn ask(text: impl Into<String>) -> Self {
        Self::new(SuggestionMode::Ask, text)
    }

    pub fn fix(transcript: impl Into<String>) -> Self {
        Self::new(SuggestionMode::Fix, transcript)
    }

    /// Rejected commands in the order they were first rejected.
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    /// Adds commands to the rejected set. Already rejected commands keep
    /// their original position.
    pub fn reject_all<'a>(&mut self, commands: impl IntoIterator<Item = &'a String>) {
        for command in commands {
            if !self.rejected.contains(command) {
                self.rejected.push(command.clone());
            }
        }
    }

    pub fn append_transcript(&mut self, transcript: &str) {
        self.last_message.push_str(TRANSCRIPT_SEPARATOR);
        self.last_message.push_str(transcript);
    }
}
