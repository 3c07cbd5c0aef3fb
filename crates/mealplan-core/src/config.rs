//! Planner configuration.
//!
//! Loaded once at process start and passed by reference into the pipeline
//! builder. Nothing reads the environment after that point.

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::LlmError;

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const GEMINI_BASE_URL_ENV: &str = "GEMINI_BASE_URL";
pub const MODEL_ENV: &str = "MEALPLAN_MODEL";
pub const TEMPERATURE_ENV: &str = "MEALPLAN_TEMPERATURE";
pub const STRICT_ENV: &str = "MEALPLAN_STRICT";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{provider} API key not found; set {env_var} or add it to the config file")]
    MissingCredential {
        provider: ProviderKind,
        env_var: &'static str,
    },

    #[error("temperature must be between 0.0 and 2.0, got {0}")]
    InvalidTemperature(f32),

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("unknown provider {0:?} (expected openai or gemini)")]
    UnknownProvider(String),

    #[error("failed to initialize provider: {0}")]
    Provider(#[from] LlmError),
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// The model backends the planner knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(alias = "google")]
    Gemini,
}

impl ProviderKind {
    /// Environment variable holding this provider's API key.
    pub fn key_env(self) -> &'static str {
        match self {
            Self::OpenAi => OPENAI_API_KEY_ENV,
            Self::Gemini => GOOGLE_API_KEY_ENV,
        }
    }

    /// Environment variable overriding this provider's base URL.
    pub fn base_url_env(self) -> &'static str {
        match self {
            Self::OpenAi => OPENAI_BASE_URL_ENV,
            Self::Gemini => GEMINI_BASE_URL_ENV,
        }
    }

    /// Whether `model` belongs to the other provider's model family.
    fn is_foreign_model(self, model: &str) -> bool {
        let model = model.trim().to_ascii_lowercase();
        match self {
            Self::OpenAi => model.starts_with("gemini"),
            Self::Gemini => model.starts_with("gpt"),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        };
        f.write_str(s)
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(ConfigError::UnknownProvider(other.to_owned())),
        }
    }
}

/// Connection settings for one provider.
#[derive(Clone, PartialEq)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Per-provider model override; falls back to [`PlannerConfig::model`].
    pub model: Option<String>,
}

impl ProviderSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_key: None,
            base_url: base_url.into(),
            model: None,
        }
    }
}

// Keep API keys out of debug output and logs.
impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Which provider serves each pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageProviders {
    pub metrics: ProviderKind,
    pub preferences: ProviderKind,
    pub synthesis: ProviderKind,
}

impl Default for StageProviders {
    fn default() -> Self {
        Self {
            metrics: ProviderKind::OpenAi,
            preferences: ProviderKind::Gemini,
            synthesis: ProviderKind::Gemini,
        }
    }
}

impl StageProviders {
    /// Distinct providers referenced by the mapping, in stage order.
    pub fn distinct(&self) -> Vec<ProviderKind> {
        let mut out = Vec::with_capacity(2);
        for kind in [self.metrics, self.preferences, self.synthesis] {
            if !out.contains(&kind) {
                out.push(kind);
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// PlannerConfig
// ---------------------------------------------------------------------------

/// Fully resolved planner configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Model name sent to every provider without its own override.
    pub model: String,
    /// Sampling temperature shared by all stages.
    pub temperature: f32,
    pub openai: ProviderSettings,
    pub gemini: ProviderSettings,
    pub stages: StageProviders,
    /// Reject synthesized plans that fail the audit instead of warning.
    pub strict: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            model: Self::DEFAULT_MODEL.to_owned(),
            temperature: Self::DEFAULT_TEMPERATURE,
            openai: ProviderSettings::new(Self::DEFAULT_OPENAI_BASE_URL),
            gemini: ProviderSettings::new(Self::DEFAULT_GEMINI_BASE_URL),
            stages: StageProviders::default(),
            strict: false,
        }
    }
}

impl PlannerConfig {
    pub const DEFAULT_MODEL: &str = "gemini-flash-latest";
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
    pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// Build a config from the process environment on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup on top of the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_lookup(lookup)?;
        Ok(config)
    }

    /// Override fields with any variables present in `lookup`.
    ///
    /// Empty values are treated as unset and leave the field untouched.
    pub fn apply_lookup<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(OPENAI_API_KEY_ENV) {
            self.openai.api_key = Some(key);
        }
        if let Some(key) = get(GOOGLE_API_KEY_ENV) {
            self.gemini.api_key = Some(key);
        }
        if let Some(url) = get(OPENAI_BASE_URL_ENV) {
            self.openai.base_url = url;
        }
        if let Some(url) = get(GEMINI_BASE_URL_ENV) {
            self.gemini.base_url = url;
        }
        if let Some(model) = get(MODEL_ENV) {
            self.model = model;
        }
        if let Some(raw) = get(TEMPERATURE_ENV) {
            self.temperature = parse_temperature(&raw)?;
        }
        if let Some(raw) = get(STRICT_ENV) {
            self.strict = parse_flag(STRICT_ENV, &raw)?;
        }
        Ok(())
    }

    /// Settings for a given provider.
    pub fn settings(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Gemini => &self.gemini,
        }
    }

    /// Model name to request from a given provider.
    pub fn model_for(&self, kind: ProviderKind) -> &str {
        self.settings(kind).model.as_deref().unwrap_or(&self.model)
    }

    /// Warnings for stages that would send a model name to a hosted API that
    /// does not serve it. Custom base URLs are trusted to route any model.
    pub fn model_warnings(&self) -> Vec<String> {
        self.stages
            .distinct()
            .into_iter()
            .filter_map(|kind| {
                let default_url = match kind {
                    ProviderKind::OpenAi => Self::DEFAULT_OPENAI_BASE_URL,
                    ProviderKind::Gemini => Self::DEFAULT_GEMINI_BASE_URL,
                };
                let model = self.model_for(kind);
                let hosted = self.settings(kind).base_url.trim_end_matches('/') == default_url;
                (hosted && kind.is_foreign_model(model)).then(|| {
                    format!(
                        "{kind} stages would request model {model:?} from {default_url}; \
                         set [{kind}].model in the config file or point {} at a server that has it",
                        kind.base_url_env()
                    )
                })
            })
            .collect()
    }

    /// Check that every provider referenced by a stage has a credential and
    /// that numeric settings are in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }
        for kind in self.stages.distinct() {
            if self.settings(kind).api_key.is_none() {
                return Err(ConfigError::MissingCredential {
                    provider: kind,
                    env_var: kind.key_env(),
                });
            }
        }
        Ok(())
    }
}

/// Parse and range-check a temperature string.
pub fn parse_temperature(raw: &str) -> Result<f32, ConfigError> {
    let value: f32 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: TEMPERATURE_ENV,
        value: raw.to_owned(),
    })?;
    if !(0.0..=2.0).contains(&value) {
        return Err(ConfigError::InvalidTemperature(value));
    }
    Ok(value)
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_owned(),
        }),
    }
}
