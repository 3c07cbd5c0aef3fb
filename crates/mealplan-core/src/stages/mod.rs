//! The three pipeline stages.
//!
//! Each stage renders one prompt, makes one model call through its injected
//! [`TextGenerator`](crate::llm::TextGenerator), and parses one structured
//! result. Stages hold no state between calls.

pub mod contract;
pub mod metrics;
pub mod preferences;
pub mod synthesis;

use thiserror::Error;

use crate::audit::AuditFinding;
use crate::llm::LlmError;

pub use contract::{ContractError, ShapeCheck, extract_json, parse_response};
pub use metrics::MetricsAnalyzer;
pub use preferences::PreferenceResolver;
pub use synthesis::PlanSynthesizer;

/// Any failure that stops a stage from producing its result.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("plan rejected by audit: {}", summarize(.0))]
    Rejected(Vec<AuditFinding>),

    #[error("stage started without a {0} result")]
    MissingInput(&'static str),
}

fn summarize(findings: &[AuditFinding]) -> String {
    match findings {
        [] => "no findings".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}
