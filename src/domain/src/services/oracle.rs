use crate::models::{ChatMessage, Suggestion};
use shared::types::Result;

/// External service proposing commands for a conversation.
#[async_trait::async_trait]
pub trait SuggestionOracle: Send + Sync {
    async fn suggest(&self, messages: &[ChatMessage], model: &str) -> Result<Suggestion>;
}
