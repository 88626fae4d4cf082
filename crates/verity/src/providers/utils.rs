use serde_json::{json, Value};

use crate::errors::{GenerationError, GenerationResult};
use crate::models::stream::StreamChunk;
use crate::models::tool::{Tool, ToolCall};
use crate::models::turn::Turn;

/// Convert internal turns to Gemini's `contents` specification
///
/// Gemini labels its own turns `model`, and expects tool results under the `function` role.
pub fn turns_to_gemini_spec(turns: &[Turn]) -> Vec<Value> {
    turns
        .iter()
        .map(|turn| match turn {
            Turn::User(text) => json!({
                "role": "user",
                "parts": [{"text": text}]
            }),
            Turn::Assistant(text) => json!({
                "role": "model",
                "parts": [{"text": text}]
            }),
            Turn::ToolInvocation(call) => json!({
                "role": "model",
                "parts": [{
                    "functionCall": {
                        "name": call.name,
                        "args": call.arguments,
                    }
                }]
            }),
            Turn::ToolResult { name, result } => json!({
                "role": "function",
                "parts": [{
                    "functionResponse": {
                        "name": name,
                        "response": {"result": result},
                    }
                }]
            }),
        })
        .collect()
}

/// Convert internal Tool format to Gemini's `tools` specification
pub fn tools_to_gemini_spec(tools: &[Tool]) -> GenerationResult<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut declarations = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(GenerationError::Api(format!(
                "Duplicate tool name: {}",
                tool.name
            )));
        }

        declarations.push(json!({
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }));
    }

    if declarations.is_empty() {
        return Ok(vec![]);
    }
    Ok(vec![json!({ "functionDeclarations": declarations })])
}

/// Convert one streamed `GenerateContentResponse` into a chunk
///
/// Text from every part of the first candidate is concatenated; every named `functionCall`
/// part becomes a tool call. Responses without candidates (usage-only frames) become empty chunks.
pub fn gemini_response_to_chunk(response: &Value) -> GenerationResult<StreamChunk> {
    if let Some(error) = response.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| error.to_string());
        return Err(GenerationError::Api(message));
    }

    let mut chunk = StreamChunk::default();
    let Some(parts) = response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
    else {
        return Ok(chunk);
    };

    let mut text = String::new();
    for part in parts {
        if let Some(part_text) = part.get("text").and_then(Value::as_str) {
            // Thought summaries are not part of the answer
            if part.get("thought").and_then(Value::as_bool) != Some(true) {
                text.push_str(part_text);
            }
        }
        if let Some(call) = part.get("functionCall") {
            let Some(name) = call.get("name").and_then(Value::as_str) else {
                tracing::debug!(%call, "Skipping functionCall without a name");
                continue;
            };
            let arguments = call.get("args").cloned().unwrap_or_else(|| json!({}));
            chunk.tool_calls.push(ToolCall::new(name, arguments));
        }
    }

    if !text.is_empty() {
        chunk.text = Some(text);
    }
    Ok(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turns_to_gemini_spec_roles() {
        let turns = vec![
            Turn::user("What year did event X happen?"),
            Turn::Assistant("Let me think.".to_string()),
        ];
        let spec = turns_to_gemini_spec(&turns);

        assert_eq!(spec[0]["role"], "user");
        assert_eq!(spec[0]["parts"][0]["text"], "What year did event X happen?");
        assert_eq!(spec[1]["role"], "model");
        assert_eq!(spec[1]["parts"][0]["text"], "Let me think.");
    }

    #[test]
    fn test_turns_to_gemini_spec_tool_exchange() {
        let turns = vec![
            Turn::ToolInvocation(ToolCall::new("fact_check", json!({"query": "event X date"}))),
            Turn::tool_result("fact_check", "Sources confirm 1850."),
        ];
        let spec = turns_to_gemini_spec(&turns);

        assert_eq!(
            spec[0],
            json!({
                "role": "model",
                "parts": [{"functionCall": {"name": "fact_check", "args": {"query": "event X date"}}}]
            })
        );
        assert_eq!(
            spec[1],
            json!({
                "role": "function",
                "parts": [{
                    "functionResponse": {
                        "name": "fact_check",
                        "response": {"result": "Sources confirm 1850."}
                    }
                }]
            })
        );
    }

    #[test]
    fn test_tools_to_gemini_spec() -> anyhow::Result<()> {
        let tool = Tool::new(
            "fact_check",
            "Checks facts",
            json!({"type": "object", "properties": {"query": {"type": "string"}}}),
        );
        let spec = tools_to_gemini_spec(&[tool])?;

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["functionDeclarations"][0]["name"], "fact_check");
        assert_eq!(
            spec[0]["functionDeclarations"][0]["parameters"]["properties"]["query"]["type"],
            "string"
        );
        Ok(())
    }

    #[test]
    fn test_tools_to_gemini_spec_empty_and_duplicate() {
        assert!(tools_to_gemini_spec(&[]).unwrap().is_empty());

        let tool = Tool::new("fact_check", "Checks facts", json!({}));
        let result = tools_to_gemini_spec(&[tool.clone(), tool]);
        assert!(result.is_err());
    }

    #[test]
    fn test_response_to_chunk_text() -> anyhow::Result<()> {
        let response = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello, "}, {"text": "world"}]}
            }]
        });
        let chunk = gemini_response_to_chunk(&response)?;
        assert_eq!(chunk, StreamChunk::text("Hello, world"));
        Ok(())
    }

    #[test]
    fn test_response_to_chunk_function_call() -> anyhow::Result<()> {
        let response = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"functionCall": {"name": "fact_check", "args": {"query": "event X date"}}}]
                },
                "finishReason": "STOP"
            }]
        });
        let chunk = gemini_response_to_chunk(&response)?;
        assert!(chunk.text.is_none());
        assert_eq!(
            chunk.tool_calls,
            vec![ToolCall::new("fact_check", json!({"query": "event X date"}))]
        );
        Ok(())
    }

    #[test]
    fn test_response_to_chunk_skips_thoughts_and_usage_frames() -> anyhow::Result<()> {
        let response = json!({
            "candidates": [{
                "content": {"parts": [{"text": "pondering", "thought": true}, {"text": "Answer"}]}
            }]
        });
        assert_eq!(gemini_response_to_chunk(&response)?, StreamChunk::text("Answer"));

        let usage_only = json!({"usageMetadata": {"totalTokenCount": 12}});
        assert_eq!(gemini_response_to_chunk(&usage_only)?, StreamChunk::default());
        Ok(())
    }

    #[test]
    fn test_response_to_chunk_skips_nameless_function_call() -> anyhow::Result<()> {
        let response = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Before. "},
                        {"functionCall": {"args": {"query": "q"}}},
                        {"functionCall": {"name": "fact_check", "args": {"query": "event X date"}}}
                    ]
                }
            }]
        });
        let chunk = gemini_response_to_chunk(&response)?;
        assert_eq!(chunk.text.as_deref(), Some("Before. "));
        assert_eq!(
            chunk.tool_calls,
            vec![ToolCall::new("fact_check", json!({"query": "event X date"}))]
        );

        let only_nameless = json!({
            "candidates": [{"content": {"parts": [{"functionCall": {"args": {"query": "q"}}}]}}]
        });
        let chunk = gemini_response_to_chunk(&only_nameless)?;
        assert!(!chunk.has_tool_calls());
        assert!(chunk.text.is_none());
        Ok(())
    }

    #[test]
    fn test_response_to_chunk_error() {
        let response = json!({"error": {"code": 400, "message": "API key not valid"}});
        assert_eq!(
            gemini_response_to_chunk(&response),
            Err(GenerationError::Api("API key not valid".to_string()))
        );
    }
}
