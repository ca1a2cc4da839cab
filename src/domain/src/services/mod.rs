//! Seams between the negotiation loop and the outside world.

pub mod command_runner;
pub mod interaction;
pub mod oracle;

pub use command_runner::CommandRunner;
pub use interaction::UserInteraction;
pub use oracle::SuggestionOracle;
