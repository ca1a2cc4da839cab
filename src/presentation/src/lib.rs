pub mod cli;
pub mod interaction;
pub mod logging;
