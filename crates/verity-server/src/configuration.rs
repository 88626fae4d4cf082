use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use verity::providers::configs::{GeminiProviderConfig, GEMINI_HOST, GEMINI_MODEL};

#[derive(Debug, Default, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_gemini_host")]
    pub host: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
}

impl ProviderSettings {
    pub fn provider_config(&self) -> GeminiProviderConfig {
        GeminiProviderConfig {
            host: self.host.clone(),
            api_key: self.api_key.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PromptSettings {
    #[serde(default = "default_system_path")]
    pub system_path: PathBuf,
    #[serde(default = "default_fact_check_path")]
    pub fact_check_path: PathBuf,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            system_path: default_system_path(),
            fact_check_path: default_fact_check_path(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub prompts: PromptSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Provider defaults, seeded from the conventional Gemini variables when present
            .set_default("provider.host", default_gemini_host())?
            .set_default(
                "provider.api_key",
                std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            )?
            .set_default(
                "provider.model",
                std::env::var("GEMINI_MODEL").unwrap_or_else(|_| default_model()),
            )?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("VERITY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Self = config.try_deserialize()?;

        if settings.provider.api_key.trim().is_empty() {
            tracing::debug!("No Gemini API key configured");
            return Err(ConfigError::MissingEnvVar {
                env_var: to_env_var("provider.api_key"),
            });
        }

        Ok(settings)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_gemini_host() -> String {
    GEMINI_HOST.to_string()
}

fn default_model() -> String {
    GEMINI_MODEL.to_string()
}

fn default_system_path() -> PathBuf {
    PathBuf::from("config").join("system-prompt.txt")
}

fn default_fact_check_path() -> PathBuf {
    PathBuf::from("config").join("fact-check-system-prompt.txt")
}
