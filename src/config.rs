//! Environment-backed configuration for pipeline hosts.
//!
//! The engine itself never talks to providers, but the hosts wiring real
//! [`ChatModel`](crate::pipelines::ChatModel) and
//! [`SearchTool`](crate::pipelines::SearchTool) implementations need API
//! credentials. [`ProviderCredentials::from_env`] resolves them once, up
//! front, so a missing key fails the run before any graph work starts.

use miette::Diagnostic;
use thiserror::Error;

/// API credentials required by the research pipeline's default providers.
#[derive(Clone, Debug)]
pub struct ProviderCredentials {
    /// Key for the chat-completion provider (`OPENAI_API_KEY`).
    pub openai_api_key: String,
    /// Key for the web-search provider (`TAVILY_API_KEY`).
    pub tavily_api_key: String,
}

impl ProviderCredentials {
    /// Resolve credentials from the process environment, loading `.env`
    /// first if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnv`] naming the first variable that is
    /// unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Ok(Self {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            tavily_api_key: require_env("TAVILY_API_KEY")?,
        })
    }
}

fn require_env(var: &'static str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv { var }),
    }
}

/// Errors raised while resolving host configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("missing required environment variable: {var}")]
    #[diagnostic(
        code(factloom::config::missing_env),
        help("Set the variable in the environment or in a .env file.")
    )]
    MissingEnv { var: &'static str },
}
