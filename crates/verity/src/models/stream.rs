use super::tool::ToolCall;

/// An incremental unit of model output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamChunk {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl StreamChunk {
    /// A chunk carrying only text
    pub fn text<S: Into<String>>(text: S) -> Self {
        StreamChunk {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A chunk carrying only tool invocations
    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        StreamChunk {
            text: None,
            tool_calls,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// The chunk's text if it carries any non-empty text
    pub fn as_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }
}
