pub mod command_executor;
pub mod config;
pub mod openai_client;
pub mod session_log;
pub mod shell_history;
pub mod system_context;
