use futures::TryStreamExt;
use serde_json::json;
use std::sync::Arc;

use crate::errors::{GenerationError, GenerationResult};
use crate::models::tool::Tool;
use crate::models::turn::Turn;
use crate::prompt::PromptSource;
use crate::providers::base::{CompletionRequest, Provider};

pub const FACT_CHECK_TOOL: &str = "fact_check";

const EMPTY_RESULT: &str = "Fact-check completed but no response generated";

/// The declaration of the one tool the model may call mid-conversation
pub fn fact_check_tool() -> Tool {
    Tool::new(
        FACT_CHECK_TOOL,
        "Fact-check claims and statements for accuracy using specialized fact-checking analysis",
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The claim or statement to fact-check"
                }
            },
            "required": ["query"]
        }),
    )
}

/// How a fact-check request ended
#[derive(Debug, Clone, PartialEq)]
pub enum FactCheckOutcome {
    Verified(String),
    /// The model answered with no text at all
    Empty,
    Unavailable(GenerationError),
}

impl FactCheckOutcome {
    /// The text handed back to the model, never blank
    pub fn into_text(self) -> String {
        match self {
            FactCheckOutcome::Verified(text) => text,
            FactCheckOutcome::Empty => EMPTY_RESULT.to_string(),
            FactCheckOutcome::Unavailable(err) => format!("Fact-check unavailable: {}", err),
        }
    }
}

/// Answers a single query with the fact-check instructions and no tools declared
#[derive(Clone)]
pub struct FactChecker {
    provider: Arc<dyn Provider>,
    model: String,
    prompt: Arc<dyn PromptSource>,
}

impl FactChecker {
    pub fn new<S: Into<String>>(
        provider: Arc<dyn Provider>,
        model: S,
        prompt: Arc<dyn PromptSource>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            prompt,
        }
    }

    /// Run the query and report how it went
    pub async fn run(&self, query: &str) -> FactCheckOutcome {
        match self.collect(query).await {
            Ok(text) if text.is_empty() => FactCheckOutcome::Empty,
            Ok(text) => FactCheckOutcome::Verified(text),
            Err(err) => {
                tracing::warn!(query, error = %err, "Fact-check failed");
                FactCheckOutcome::Unavailable(err)
            }
        }
    }

    /// Run the query, converting every failure into placeholder text
    pub async fn fact_check(&self, query: &str) -> String {
        self.run(query).await.into_text()
    }

    async fn collect(&self, query: &str) -> GenerationResult<String> {
        let system = self.prompt.load();
        let turns = [Turn::user(query)];

        let mut stream = self
            .provider
            .stream(CompletionRequest {
                model: &self.model,
                system: &system,
                tools: &[],
                turns: &turns,
            })
            .await?;

        let mut result = String::new();
        while let Some(chunk) = stream.try_next().await? {
            if let Some(text) = chunk.as_text() {
                result.push_str(text);
            }
        }
        Ok(result)
    }
}
