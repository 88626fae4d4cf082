use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use serde_json::json;
use std::sync::Arc;

use crate::errors::GenerationResult;
use crate::fact_check::{fact_check_tool, FactCheckOutcome, FactChecker, FACT_CHECK_TOOL};
use crate::models::message::Message;
use crate::models::tool::{Tool, ToolCall};
use crate::models::turn::Turn;
use crate::prompt::PromptSource;
use crate::providers::base::{CompletionRequest, Provider};

/// Find the first fact-check invocation that carries a usable query
///
/// Invocations of other tools, or without a string `query`, are not actionable.
fn actionable_query(tool_calls: &[ToolCall]) -> Option<&str> {
    let mut fact_checks = tool_calls
        .iter()
        .filter(|call| call.name == FACT_CHECK_TOOL);
    let query = fact_checks.find_map(|call| call.argument_str("query"));

    let skipped = fact_checks.count();
    if query.is_some() && skipped > 0 {
        tracing::debug!(skipped, "Only the first fact-check invocation is handled");
    }
    query
}

/// Orchestrator streams a conversation turn from the model, running at most one hidden
/// fact-check round and presenting the result as a single answer
pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    model: String,
    system_prompt: String,
    fact_checker: FactChecker,
}

impl Orchestrator {
    /// Create a new Orchestrator, loading the system prompt once for its lifetime
    pub fn new<S: Into<String>>(
        provider: Arc<dyn Provider>,
        model: S,
        system_prompt: &dyn PromptSource,
        fact_checker: FactChecker,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            system_prompt: system_prompt.load(),
            fact_checker,
        }
    }

    fn request<'a>(&'a self, tools: &'a [Tool], turns: &'a [Turn]) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.model,
            system: &self.system_prompt,
            tools,
            turns,
        }
    }

    /// Create a stream that yields each piece of visible text as it arrives.
    ///
    /// Text from the primary stream is forwarded until the model invokes `fact_check`. The
    /// query is then answered by the fact checker and a continuation stream, seeded with the
    /// hidden invocation and its result, supplies the rest of the answer. Nothing after the
    /// invocation in the primary stream is forwarded.
    pub fn reply<'a>(
        &'a self,
        history: &'a [Message],
    ) -> BoxStream<'a, GenerationResult<String>> {
        Box::pin(async_stream::try_stream! {
            let turns: Vec<Turn> = history.iter().map(Turn::from).collect();
            let tools = vec![fact_check_tool()];

            let mut primary = self.provider.stream(self.request(&tools, &turns)).await?;

            while let Some(chunk) = primary.try_next().await? {
                if !chunk.has_tool_calls() {
                    if let Some(text) = chunk.as_text() {
                        yield text.to_string();
                    }
                    continue;
                }

                let query = match actionable_query(&chunk.tool_calls) {
                    Some(query) => query.to_string(),
                    None => {
                        let names: Vec<&str> =
                            chunk.tool_calls.iter().map(|call| call.name.as_str()).collect();
                        tracing::debug!(?names, "Ignoring non-actionable tool invocations");
                        continue;
                    }
                };
                tracing::info!(query = %query, "Fact-check tool invoked");

                let result = match self.fact_checker.run(&query).await {
                    FactCheckOutcome::Unavailable(_) => {
                        // Abandon the invocation; the primary stream is treated as exhausted
                        break;
                    }
                    outcome => outcome.into_text(),
                };

                let mut follow_up = turns.clone();
                follow_up.push(Turn::ToolInvocation(ToolCall::new(
                    FACT_CHECK_TOOL,
                    json!({ "query": query }),
                )));
                follow_up.push(Turn::tool_result(FACT_CHECK_TOOL, result));

                let mut continuation = self.provider.stream(self.request(&[], &follow_up)).await?;
                while let Some(chunk) = continuation.try_next().await? {
                    if let Some(text) = chunk.as_text() {
                        yield text.to_string();
                    }
                }
                break;
            }
        })
    }

    /// Stream the reply to `history`, calling `on_chunk` with each piece of text in order.
    ///
    /// Text already delivered stands when an error is returned.
    pub async fn stream_chat<F>(
        &self,
        history: &[Message],
        mut on_chunk: F,
    ) -> GenerationResult<()>
    where
        F: FnMut(&str),
    {
        let mut stream = self.reply(history);
        while let Some(text) = stream.next().await {
            on_chunk(&text?);
        }
        Ok(())
    }
}
