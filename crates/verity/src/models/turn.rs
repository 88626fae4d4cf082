use super::message::Message;
use super::role::Role;
use super::tool::ToolCall;

/// One unit of the history sent to the model.
///
/// Genuine conversation text and the synthetic bookkeeping for a tool round trip are kept
/// as separate variants, so a tool exchange can never be mistaken for assistant text.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    User(String),
    Assistant(String),
    /// The model asked for a tool to be run
    ToolInvocation(ToolCall),
    /// The output of a tool, fed back to the model only
    ToolResult { name: String, result: String },
}

impl Turn {
    pub fn user<S: Into<String>>(text: S) -> Self {
        Turn::User(text.into())
    }

    pub fn tool_result<N: Into<String>, R: Into<String>>(name: N, result: R) -> Self {
        Turn::ToolResult {
            name: name.into(),
            result: result.into(),
        }
    }
}

impl From<&Message> for Turn {
    fn from(message: &Message) -> Self {
        match message.role {
            Role::User => Turn::User(message.content.clone()),
            Role::Assistant => Turn::Assistant(message.content.clone()),
        }
    }
}
