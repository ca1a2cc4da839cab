use crate::error::SessionError;
use crate::types::Result;
use colored::Colorize;
use crossterm::event::{read, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use dialoguer::console::Term;

/// Restores cooked mode when dropped, including on `?` returns.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Maps a single keypress to an answer. `None` means keep waiting.
fn answer_for_key(code: KeyCode, modifiers: KeyModifiers, default_yes: bool) -> Option<Answer> {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Answer::Interrupt),
        KeyCode::Char('y') | KeyCode::Char('Y') => Some(Answer::Yes),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(Answer::No),
        KeyCode::Enter => Some(if default_yes { Answer::Yes } else { Answer::No }),
        KeyCode::Esc => Some(Answer::Interrupt),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Answer {
    Yes,
    No,
    Interrupt,
}

/// Standardized confirmation prompt.
/// Returns immediately on single keypress: y/Y, n/N, or Enter for default.
/// Ctrl+C and Esc abort the session with an `Interaction` error.
pub fn ask_confirmation(prompt: &str, default_yes: bool) -> Result<bool> {
    let term = Term::stdout();
    let default_hint = if default_yes { "[Y/n]" } else { "[y/N]" };
    term.write_str(&format!("{prompt} {default_hint} "))?;
    term.flush()?;

    let answer = {
        let _raw = RawModeGuard::enable()?;
        loop {
            if let Event::Key(key) = read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(answer) = answer_for_key(key.code, key.modifiers, default_yes) {
                    break answer;
                }
            }
        }
    };

    match answer {
        Answer::Interrupt => {
            term.write_line(&"interrupted".red().to_string())?;
            Err(SessionError::Interaction("prompt interrupted by user".to_string()).into())
        }
        Answer::Yes => {
            term.write_line(&"y".green().to_string())?;
            Ok(true)
        }
        Answer::No => {
            term.write_line(&"n".red().to_string())?;
            Ok(false)
        }
    }
}
