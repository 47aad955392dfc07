//! Inference configuration shared by every role in a crew.
//!
//! The configuration is built once at process start and passed explicitly
//! into [`crate::crew::TripCrew::new`]. Nothing here writes back to the
//! process environment.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable holding the inference API key.
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
/// Environment variable overriding the model name.
pub const MODEL_VAR: &str = "TRIPCREW_MODEL";
/// Environment variable overriding the sampling temperature.
pub const TEMPERATURE_VAR: &str = "TRIPCREW_TEMPERATURE";
/// Environment variable overriding the API base URL.
pub const BASE_URL_VAR: &str = "TRIPCREW_BASE_URL";
/// Environment variable overriding the per-request timeout.
pub const TIMEOUT_VAR: &str = "TRIPCREW_TIMEOUT_SECS";

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro-latest";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Model binding attached to each role.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Model identifier, e.g. `gemini-1.5-pro-latest`.
    pub model: String,
    pub temperature: f32,
    /// API credential. Redacted from `Debug` output and never serialized.
    #[serde(skip_serializing, default)]
    pub api_key: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl InferenceConfig {
    /// Create a config for `model` with default temperature, endpoint and timeout.
    pub fn new(model: &str, api_key: &str) -> Self {
        InferenceConfig {
            model: model.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Build the config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    ///
    /// Fails fast with [`ConfigError::MissingCredential`] when the API key is
    /// absent, before any task can be submitted.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR).ok_or_else(|| ConfigError::MissingCredential {
            var: API_KEY_VAR.to_string(),
        })?;

        let model = lookup(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let temperature = match lookup(TEMPERATURE_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<f32>()
                .map_err(|_| ConfigError::InvalidValue {
                    var: TEMPERATURE_VAR.to_string(),
                    value: raw.clone(),
                })?,
            None => DEFAULT_TEMPERATURE,
        };

        let request_timeout_secs = match lookup(TIMEOUT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    var: TIMEOUT_VAR.to_string(),
                    value: raw.clone(),
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let base_url = lookup(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let config = InferenceConfig {
            model,
            temperature,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants every role relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::BlankCredential {
                var: API_KEY_VAR.to_string(),
            });
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::TemperatureOutOfRange(self.temperature));
        }
        Ok(())
    }
}
