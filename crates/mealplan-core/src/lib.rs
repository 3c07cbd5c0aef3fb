//! Core library for the `mealplan` weekly meal planner.
//!
//! A plan is produced by three sequential model calls: nutrition targets
//! from body metrics, food constraints from dietary preferences, and a
//! seven-day plan from both. [`pipeline::MealPlanner`] drives the stages;
//! [`present`] turns the result into console text, JSON, and Markdown.

pub mod audit;
pub mod config;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod present;
pub mod stages;

pub use config::{ConfigError, PlannerConfig, ProviderKind};
pub use pipeline::{MealPlanner, PipelineStage, PipelineState};
