//! System prompts and request assembly for the suggestion service.

use crate::models::{ChatMessage, ConversationContext, SuggestionMode};

pub const PROMPT_ASK: &str = "You are a knowledgeable assistant that helps users by suggesting \
the most appropriate command-line commands based on their input. When a user describes a task \
they want to accomplish, provide a list of command-line commands that can achieve it. Be \
specific, make sure the commands are relevant and commonly used for the task, and include \
useful options and flags. If the information provided is not enough, suggest a command that \
gathers what is missing before giving a final recommendation.";

pub const PROMPT_FIX: &str = "You are a helpful assistant that suggests command-line commands \
to troubleshoot and fix problems, based on the user's command history and the most recent \
output and error messages. Analyse the situation and provide specific commands that resolve \
the issue. If the user's command is correct and nothing is wrong, explain why and suggest no \
command. If the information provided is not enough, suggest a command that gathers what is \
missing; its output will be sent in the next message.";

/// Name of the function tool the service is asked to call.
pub const TOOL_NAME: &str = "recommend_command_line";

pub const TOOL_DESCRIPTION: &str = "Recommends command-line commands based on user input.";

pub const TOOL_COMMANDS_DESCRIPTION: &str = "A valid command-line command that can be executed \
to resolve the issue. If more information is needed, a command that gathers it. Leave the list \
empty if nothing needs to be done.";

pub const TOOL_DESCRIPTION_FIELD: &str = "A brief explanation of what the commands do and why \
they help, or a confirmation that the command is correct and no further action is needed.";

pub fn system_prompt(mode: SuggestionMode) -> &'static str {
    match mode {
        SuggestionMode::Ask => PROMPT_ASK,
        SuggestionMode::Fix => PROMPT_FIX,
    }
}

/// Lists commands the service must not propose again.
pub fn exclusion_message(rejected: &[String]) -> ChatMessage {
    let mut content =
        String::from("The commands below are not valid or not wanted by the user:");
    for command in rejected {
        content.push_str("\n* ");
        content.push_str(command);
    }
    ChatMessage::user(content)
}

/// Builds the request for the next oracle query.
pub fn build_messages(context: &ConversationContext) -> Vec<ChatMessage> {
    let mut messages = vec![
        ChatMessage::system(system_prompt(context.mode)),
        ChatMessage::user(context.last_message.clone()),
    ];
    if !context.rejected().is_empty() {
        messages.push(exclusion_message(context.rejected()));
    }
    messages
}
