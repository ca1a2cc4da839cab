pub mod confirmation;
pub mod error;
pub mod types;

pub use error::SessionError;

/// Name the binary is installed under. A history entry starting with it was
/// already run under supervision.
pub const PROGRAM_NAME: &str = "agcl";
