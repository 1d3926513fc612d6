//! Application Configuration Module
//!
//! This module centralizes the configuration for the relay. It loads the
//! per-task Azure credentials from environment variables once at startup
//! and provides a single, shareable struct that can be passed throughout
//! the application.

use std::env;

use secrecy::SecretString;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
}

/// One Azure endpoint together with the key that authorizes it.
///
/// The key is a [`SecretString`], so it is redacted from `Debug` output
/// and only exposed at the point a request header is built.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub url: String,
    pub api_key: SecretString,
}

impl Endpoint {
    fn from_env(key_var: &str, url_var: &str) -> Result<Self, ConfigError> {
        let api_key =
            env::var(key_var).map_err(|_| ConfigError::MissingVar(key_var.to_string()))?;
        let url = env::var(url_var).map_err(|_| ConfigError::MissingVar(url_var.to_string()))?;
        Ok(Self {
            url,
            api_key: SecretString::from(api_key),
        })
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub chat: Endpoint,
    pub speech: Endpoint,
    pub embedding: Endpoint,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// This function will look for a `.env` file in the current directory
    /// and load the following variables:
    ///
    /// *   `CHAT_API_KEY` / `CHAT_ENDPOINT`: Key and URL for the chat completion deployment.
    /// *   `SPEECH_API_KEY` / `SPEECH_ENDPOINT`: Key and URL for the speech-to-text deployment.
    /// *   `EMBEDDING_API_KEY` / `EMBEDDING_ENDPOINT`: Key and URL for the embedding deployment.
    /// *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    ///
    /// Every key/endpoint pair is required. A missing variable is a fatal
    /// startup error; no request is ever attempted with a partial
    /// credential set.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file. This is useful for local development and is ignored if not present.
        dotenvy::dotenv().ok();

        let chat = Endpoint::from_env("CHAT_API_KEY", "CHAT_ENDPOINT")?;
        let speech = Endpoint::from_env("SPEECH_API_KEY", "SPEECH_ENDPOINT")?;
        let embedding = Endpoint::from_env("EMBEDDING_API_KEY", "EMBEDDING_ENDPOINT")?;

        let log_level_str = env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(log_level_str))?;

        Ok(Self {
            chat,
            speech,
            embedding,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 6] = [
        "CHAT_API_KEY",
        "CHAT_ENDPOINT",
        "SPEECH_API_KEY",
        "SPEECH_ENDPOINT",
        "EMBEDDING_API_KEY",
        "EMBEDDING_ENDPOINT",
    ];

    // A single test covers both scenarios sequentially because the process
    // environment is shared across test threads.
    #[test]
    fn from_env_requires_every_secret() {
        for var in VARS {
            env::remove_var(var);
        }
        env::set_var("RUST_LOG", "debug");

        // Populate all but the last variable; each partial set must fail.
        for (i, var) in VARS.iter().enumerate() {
            let result = Config::from_env();
            match result {
                Err(ConfigError::MissingVar(name)) => assert_eq!(&name, var),
                other => panic!("expected MissingVar({var}), got {other:?}"),
            }
            env::set_var(var, format!("value-{i}"));
        }

        let config = Config::from_env().expect("all six secrets are set");
        assert_eq!(config.chat.url, "value-1");
        assert_eq!(config.speech.url, "value-3");
        assert_eq!(config.embedding.url, "value-5");
        assert_eq!(config.log_level, Level::DEBUG);

        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn debug_output_redacts_api_keys() {
        let endpoint = Endpoint {
            url: "https://example.invalid/chat".to_string(),
            api_key: SecretString::from("super-secret".to_string()),
        };
        let rendered = format!("{endpoint:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
