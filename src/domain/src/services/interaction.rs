use crate::models::CommandChoice;
use shared::types::Result;

/// Label of the synthetic menu entry that rejects every candidate.
pub const NONE_OF_THESE_WORK: &str = "None of the above suggestions work";

/// Interactive prompts shown during a negotiation.
pub trait UserInteraction: Send + Sync {
    fn show_description(&self, description: &str);

    fn show_nothing_to_do(&self);

    /// Lets the user pick one of `candidates` or reject them all.
    fn choose_command(&self, candidates: &[String]) -> Result<CommandChoice>;

    fn confirm_solved(&self) -> Result<bool>;
}
