//! The `TextGenerator` trait -- the single capability every stage needs.
//!
//! Each backend (OpenAI-compatible, Gemini, test doubles) implements this
//! trait. It is object-safe so stages can hold `Arc<dyn TextGenerator>` and
//! the provider can be chosen at runtime.

use async_trait::async_trait;

use super::types::{LlmError, Prompt};

/// Turns a rendered prompt into raw model text.
///
/// Implementations make exactly one request per call. They do not retry and
/// do not cache; any structure in the returned text is the caller's concern.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short provider name used for logging and registry lookup (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send the prompt and return the model's text response.
    async fn generate(&self, prompt: &Prompt) -> Result<String, LlmError>;
}

// Compile-time assertion: TextGenerator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn TextGenerator) {}
};
