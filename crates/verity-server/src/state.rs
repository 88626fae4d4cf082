use std::sync::Arc;
use verity::{
    prompt::PromptSource,
    providers::base::Provider,
    FactChecker, Orchestrator,
};

/// Shared application state
///
/// Everything here is read-only; each request builds its own orchestrator.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn Provider>,
    pub model: String,
    pub system_prompt: Arc<dyn PromptSource>,
    pub fact_checker: FactChecker,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: String,
        system_prompt: Arc<dyn PromptSource>,
        fact_check_prompt: Arc<dyn PromptSource>,
    ) -> Self {
        let fact_checker = FactChecker::new(provider.clone(), model.clone(), fact_check_prompt);
        Self {
            provider,
            model,
            system_prompt,
            fact_checker,
        }
    }

    /// Build an orchestrator for one chat turn, reading the system prompt afresh
    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(
            self.provider.clone(),
            self.model.clone(),
            self.system_prompt.as_ref(),
            self.fact_checker.clone(),
        )
    }
}
