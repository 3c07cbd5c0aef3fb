//! Shared types for text-generation providers.

use thiserror::Error;

/// A rendered two-part prompt: system instructions plus the user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// Combined length in bytes, used for request logging.
    pub fn len(&self) -> usize {
        self.system.len() + self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.user.is_empty()
    }
}

/// Failures while calling a text-generation endpoint.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} rejected the credentials: {message}")]
    Unauthorized { provider: String, message: String },

    #[error("{provider} rate limit reached: {message}")]
    RateLimited { provider: String, message: String },

    #[error("{provider} returned HTTP {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("could not decode {provider} response: {source}")]
    Decode {
        provider: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{provider} returned no text content")]
    EmptyResponse { provider: String },
}

impl LlmError {
    /// Classify a non-success HTTP status into an error variant.
    pub(crate) fn from_status(provider: &str, status: u16, message: String) -> Self {
        let provider = provider.to_owned();
        match status {
            401 | 403 => Self::Unauthorized { provider, message },
            429 => Self::RateLimited { provider, message },
            _ => Self::Api {
                provider,
                status,
                message,
            },
        }
    }
}

/// Truncate a response body for inclusion in an error message.
pub(crate) fn snippet(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    let mut out: String = body.chars().take(MAX_CHARS).collect();
    if body.chars().count() > MAX_CHARS {
        out.push_str("...");
    }
    out
}
