//! Text-generation provider interface.
//!
//! Every pipeline stage talks to a model through the [`TextGenerator`]
//! trait. Concrete backends ([`OpenAiGenerator`], [`GeminiGenerator`]) are
//! collected in a [`GeneratorRegistry`] and handed to stages by name.
//!
//! # Architecture
//!
//! ```text
//! MealPlanner::from_config
//!     |
//!     v
//! GeneratorRegistry --get("openai")--> Arc<dyn TextGenerator>
//!     |                                        |
//!     |   generate(Prompt { system, user }) ---+
//!     |        |
//!     |        v
//!     |   raw model text --> stages::contract::parse_response
//! ```

pub mod gemini;
pub mod openai;
pub mod registry;
pub mod trait_def;
pub mod types;

pub use gemini::GeminiGenerator;
pub use openai::OpenAiGenerator;
pub use registry::GeneratorRegistry;
pub use trait_def::TextGenerator;
pub use types::{LlmError, Prompt};
