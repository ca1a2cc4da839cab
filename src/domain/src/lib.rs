pub mod models;
pub mod prompts;
pub mod services;
