//! Loading strategies for the instruction texts given to the model.
//!
//! The primary system prompt is re-read whenever an orchestrator is built, so edits to the
//! file apply to the next conversation turn. The fact-check prompt is read once and kept for
//! the lifetime of the process.

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant with access to fact-checking capabilities.";

pub const DEFAULT_FACT_CHECK_PROMPT: &str =
    "You are a fact-checking assistant. Verify claims and provide accurate information with sources.";

/// A source of instruction text
pub trait PromptSource: Send + Sync {
    fn load(&self) -> String;
}

/// Reads its file on every load, falling back to a fixed text when the file is unreadable
#[derive(Debug, Clone)]
pub struct ReloadingPrompt {
    path: PathBuf,
    fallback: String,
}

impl ReloadingPrompt {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(path: P, fallback: S) -> Self {
        Self {
            path: path.into(),
            fallback: fallback.into(),
        }
    }
}

impl PromptSource for ReloadingPrompt {
    fn load(&self) -> String {
        match fs::read_to_string(&self.path) {
            Ok(content) => content.trim().to_string(),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Failed to read prompt file, using fallback"
                );
                self.fallback.clone()
            }
        }
    }
}

/// Reads its file on first load and returns the same text afterwards
#[derive(Debug)]
pub struct CachedPrompt {
    source: ReloadingPrompt,
    cached: OnceLock<String>,
}

impl CachedPrompt {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(path: P, fallback: S) -> Self {
        Self {
            source: ReloadingPrompt::new(path, fallback),
            cached: OnceLock::new(),
        }
    }
}

impl PromptSource for CachedPrompt {
    fn load(&self) -> String {
        self.cached.get_or_init(|| self.source.load()).clone()
    }
}

/// Fixed in-memory text
#[derive(Debug, Clone)]
pub struct StaticPrompt(pub String);

impl StaticPrompt {
    pub fn new<S: Into<String>>(text: S) -> Self {
        StaticPrompt(text.into())
    }
}

impl PromptSource for StaticPrompt {
    fn load(&self) -> String {
        self.0.clone()
    }
}
