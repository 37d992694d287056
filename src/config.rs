//! Gateway configuration.
//!
//! Values come from built-in defaults, overridden by `GATEWAY_`-prefixed
//! environment variables. The API key is read from `GOOGLE_GEMINI_API_KEY`
//! (or `GOOGLE_API_KEY`, or `GATEWAY_API_KEY`).

use std::net::SocketAddr;
use std::path::PathBuf;

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::{DEFAULT_API_VERSION, DEFAULT_BASE_URL};
use crate::models::GenerationConfig;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value could not be parsed.
    #[error("invalid configuration: {0}")]
    Figment(#[from] figment::Error),
    /// No API key was provided.
    #[error("API key not found. Set GOOGLE_GEMINI_API_KEY in the environment or in .env")]
    MissingApiKey,
    /// The listen address is not a valid socket address.
    #[error("invalid listen address {0}")]
    InvalidAddress(String),
}

/// Runtime settings for the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Key used to authenticate against the Gemini API.
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// Interface to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Model every request is sent to.
    pub model: String,
    /// Gemini API host.
    pub base_url: String,
    /// Gemini API version path segment.
    pub api_version: String,
    /// Directory that holds uploaded files while a request is in flight.
    pub upload_dir: PathBuf,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Optional sampling temperature.
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Optional cap on generated tokens.
    #[serde(default)]
    pub max_output_tokens: Option<i32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            model: "gemini-2.0-flash".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 20 * 1024 * 1024,
            log_level: "info".to_string(),
            temperature: None,
            max_output_tokens: None,
        }
    }
}

impl Config {
    /// The provider chain, lowest precedence first.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::raw().only(&["GOOGLE_API_KEY"]).map(|_| "api_key".into()))
            .merge(
                Env::raw()
                    .only(&["GOOGLE_GEMINI_API_KEY"])
                    .map(|_| "api_key".into()),
            )
            .merge(Env::prefixed("GATEWAY_"))
    }

    /// Loads configuration from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// Extracts and validates configuration from an arbitrary provider chain.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Config = figment.extract()?;
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(config)
    }

    /// Address the HTTP server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|_| ConfigError::InvalidAddress(addr))
    }

    /// Generation parameters derived from the optional sampling settings.
    pub fn generation_config(&self) -> Option<GenerationConfig> {
        GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
        .into_option()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_match_the_reference_deployment() {
        Jail::expect_with(|jail| {
            jail.set_env("GOOGLE_GEMINI_API_KEY", "secret");
            let config = Config::load().expect("config");
            assert_eq!(config.api_key, "secret");
            assert_eq!(config.port, 3000);
            assert_eq!(config.model, "gemini-2.0-flash");
            assert_eq!(config.upload_dir, PathBuf::from("uploads"));
            assert_eq!(config.generation_config(), None);
            Ok(())
        });
    }

    #[test]
    fn prefixed_variables_override_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("GOOGLE_GEMINI_API_KEY", "secret");
            jail.set_env("GATEWAY_PORT", "8080");
            jail.set_env("GATEWAY_MODEL", "gemini-1.5-pro");
            jail.set_env("GATEWAY_TEMPERATURE", "0.2");
            let config = Config::load().expect("config");
            assert_eq!(config.port, 8080);
            assert_eq!(config.model, "gemini-1.5-pro");
            assert_eq!(
                config.generation_config(),
                Some(GenerationConfig {
                    temperature: Some(0.2),
                    max_output_tokens: None,
                })
            );
            assert_eq!(config.socket_addr().unwrap().port(), 8080);
            Ok(())
        });
    }

    #[test]
    fn gemini_key_wins_over_generic_key() {
        Jail::expect_with(|jail| {
            jail.set_env("GOOGLE_API_KEY", "generic");
            jail.set_env("GOOGLE_GEMINI_API_KEY", "gemini");
            assert_eq!(Config::load().expect("config").api_key, "gemini");
            Ok(())
        });
    }

    #[test]
    fn blank_key_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("GOOGLE_API_KEY", "");
            jail.set_env("GOOGLE_GEMINI_API_KEY", " ");
            jail.set_env("GATEWAY_API_KEY", "");
            assert!(matches!(Config::load(), Err(ConfigError::MissingApiKey)));
            Ok(())
        });
    }
}
