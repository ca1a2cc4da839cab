use domain::models::{ChatMessage, Suggestion};
use domain::prompts::{
    TOOL_COMMANDS_DESCRIPTION, TOOL_DESCRIPTION, TOOL_DESCRIPTION_FIELD, TOOL_NAME,
};
use domain::services::SuggestionOracle;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::error::SessionError;
use shared::types::Result;
use std::sync::Arc;
use std::time::Duration;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    tools: Vec<Value>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Deserialize)]
struct FunctionCall {
    arguments: String,
}

#[derive(Deserialize)]
struct Recommendation {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    recommendations: Option<Vec<String>>,
}

fn recommend_tool() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": TOOL_NAME,
            "description": TOOL_DESCRIPTION,
            "parameters": {
                "type": "object",
                "properties": {
                    "recommendations": {
                        "type": "array",
                        "items": {"type": "string", "description": TOOL_COMMANDS_DESCRIPTION}
                    },
                    "description": {
                        "type": "string",
                        "description": TOOL_DESCRIPTION_FIELD
                    }
                }
            }
        }
    })
}

/// Turns the tool-call arguments into a suggestion.
///
/// Arguments that carry neither field are structurally empty, unlike an
/// explicit empty `recommendations` list which means nothing needs doing.
fn parse_arguments(arguments: &str) -> Result<Suggestion> {
    let value: Value = serde_json::from_str(arguments).map_err(|e| {
        tracing::debug!("Unparseable tool arguments: {}", e);
        SessionError::OracleEmptyResult
    })?;
    let is_empty = match &value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if is_empty {
        return Err(SessionError::OracleEmptyResult.into());
    }
    let parsed: Recommendation =
        serde_json::from_value(value).map_err(|_| SessionError::OracleEmptyResult)?;
    if parsed.description.is_none() && parsed.recommendations.is_none() {
        return Err(SessionError::OracleEmptyResult.into());
    }
    Ok(Suggestion {
        description: parsed.description.unwrap_or_default(),
        commands: parsed
            .recommendations
            .unwrap_or_default()
            .into_iter()
            .map(|command| command.trim().to_string())
            .filter(|command| !command.is_empty())
            .collect(),
    })
}

/// Chat-completions client asking the model to call `recommend_command_line`.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_nodelay(true)
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn request(&self, messages: &[ChatMessage], model: &str) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model,
            messages,
            tools: vec![recommend_tool()],
        };
        tracing::debug!("Requesting suggestions from {} with {} messages", url, messages.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SessionError::Oracle(format!("request to {} failed: {}", url, e)))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SessionError::Oracle(format!("reading response failed: {}", e)))?;
        if !status.is_success() {
            return Err(SessionError::Oracle(format!("API error ({}): {}", status, text)).into());
        }
        tracing::debug!("Suggestion response: {}", text);

        serde_json::from_str(&text)
            .map_err(|e| SessionError::Oracle(format!("malformed response: {}", e)).into())
    }
}

#[async_trait::async_trait]
impl SuggestionOracle for OpenAiClient {
    async fn suggest(&self, messages: &[ChatMessage], model: &str) -> Result<Suggestion> {
        let response = self.request(messages, model).await?;
        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| SessionError::Oracle("response has no choices".to_string()))?;

        match message.tool_calls.and_then(|calls| calls.into_iter().next()) {
            Some(call) => parse_arguments(&call.function.arguments),
            None => Ok(Suggestion {
                description: message.content.unwrap_or_default(),
                commands: Vec::new(),
            }),
        }
    }
}
