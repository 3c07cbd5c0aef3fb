//! Pipeline orchestrator: runs the three stages in order and stops at the
//! first failure.
//!
//! # Architecture
//!
//! ```text
//! MealPlanner::run(profile)
//!     |
//!     v
//! AnalyzingNutrition --MetricsAnalyzer--> nutrition
//!     |
//!     v
//! AnalyzingPreferences --PreferenceResolver--> constraints
//!     |
//!     v
//! Synthesizing --PlanSynthesizer--> final_plan --audit_plan--> findings
//!     |
//!     v
//! Done                       (any stage error -> Failed, loop ends)
//! ```
//!
//! Errors never escape [`MealPlanner::run`]; they are recorded on the
//! returned [`PipelineState`].

pub mod state;

use std::sync::Arc;

use chrono::Utc;
use tracing::{Instrument, error, info, info_span, warn};

pub use state::{PipelineStage, PipelineState, StageTiming};

use crate::audit::audit_plan;
use crate::config::{ConfigError, PlannerConfig, ProviderKind};
use crate::llm::{GeminiGenerator, GeneratorRegistry, OpenAiGenerator, TextGenerator};
use crate::models::UserProfile;
use crate::stages::{MetricsAnalyzer, PlanSynthesizer, PreferenceResolver, StageError};

/// The three configured stages plus run options.
pub struct MealPlanner {
    analyzer: MetricsAnalyzer,
    resolver: PreferenceResolver,
    synthesizer: PlanSynthesizer,
    strict: bool,
}

impl std::fmt::Debug for MealPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MealPlanner")
            .field("metrics", &self.analyzer.provider())
            .field("preferences", &self.resolver.provider())
            .field("synthesis", &self.synthesizer.provider())
            .field("strict", &self.strict)
            .finish()
    }
}

impl MealPlanner {
    /// Build a planner from one generator per stage.
    pub fn new(
        metrics: Arc<dyn TextGenerator>,
        preferences: Arc<dyn TextGenerator>,
        synthesis: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            analyzer: MetricsAnalyzer::new(metrics),
            resolver: PreferenceResolver::new(preferences),
            synthesizer: PlanSynthesizer::new(synthesis),
            strict: false,
        }
    }

    /// Reject plans with audit findings instead of accepting them with warnings.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Build a planner with HTTP providers wired according to `config.stages`.
    ///
    /// Only providers that some stage uses are constructed, so only their
    /// credentials are required.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        for warning in config.model_warnings() {
            warn!("{warning}");
        }

        let mut registry = GeneratorRegistry::new();
        for kind in config.stages.distinct() {
            let settings = config.settings(kind);
            let api_key = settings
                .api_key
                .clone()
                .ok_or(ConfigError::MissingCredential {
                    provider: kind,
                    env_var: kind.key_env(),
                })?;
            let model = config.model_for(kind);
            match kind {
                ProviderKind::OpenAi => registry.register(OpenAiGenerator::new(
                    settings.base_url.as_str(),
                    api_key,
                    model,
                    config.temperature,
                )?),
                ProviderKind::Gemini => registry.register(GeminiGenerator::new(
                    settings.base_url.as_str(),
                    api_key,
                    model,
                    config.temperature,
                )?),
            };
        }

        let pick = |kind: ProviderKind| {
            registry
                .get(&kind.to_string())
                .ok_or_else(|| ConfigError::UnknownProvider(kind.to_string()))
        };

        Ok(Self::new(
            pick(config.stages.metrics)?,
            pick(config.stages.preferences)?,
            pick(config.stages.synthesis)?,
        )
        .with_strict(config.strict))
    }

    /// Run every stage for `profile` and return the filled-in state.
    pub async fn run(&self, profile: UserProfile) -> PipelineState {
        let mut state = PipelineState::new(profile);
        let span = info_span!("pipeline", run_id = %state.run_id);

        async move {
            info!(strict = self.strict, "pipeline started");

            while !state.stage.is_terminal() {
                let stage = state.stage;
                info!(stage = %stage, "stage started");

                let started_at = Utc::now();
                let outcome = self.execute(stage, &mut state).await;
                let timing = StageTiming {
                    stage,
                    started_at,
                    finished_at: Utc::now(),
                };
                let elapsed_ms = timing.elapsed().num_milliseconds();
                state.timings.push(timing);

                match outcome {
                    Ok(()) => {
                        info!(stage = %stage, elapsed_ms, "stage completed");
                        state.transition(stage.next());
                    }
                    Err(err) => {
                        error!(stage = %stage, elapsed_ms, error = %err, "stage failed");
                        state.fail(err);
                    }
                }
            }

            info!(outcome = %state.stage, "pipeline finished");
            state
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        stage: PipelineStage,
        state: &mut PipelineState,
    ) -> Result<(), StageError> {
        match stage {
            PipelineStage::AnalyzingNutrition => {
                let targets = self.analyzer.analyze(&state.profile).await?;
                state.nutrition = Some(targets);
            }
            PipelineStage::AnalyzingPreferences => {
                let constraints = self
                    .resolver
                    .resolve(state.profile.preferences(), state.profile.goal())
                    .await?;
                state.constraints = Some(constraints);
            }
            PipelineStage::Synthesizing => {
                let (Some(targets), Some(constraints)) = (&state.nutrition, &state.constraints)
                else {
                    let missing = if state.nutrition.is_none() {
                        "nutrition"
                    } else {
                        "constraints"
                    };
                    return Err(StageError::MissingInput(missing));
                };

                let plan = self
                    .synthesizer
                    .synthesize(&state.profile, targets, constraints)
                    .await?;

                let findings = audit_plan(&plan, targets, constraints);
                for finding in &findings {
                    warn!(finding = %finding, "plan audit finding");
                }
                state.findings = findings;

                if self.strict && !state.findings.is_empty() {
                    return Err(StageError::Rejected(state.findings.clone()));
                }
                state.final_plan = Some(plan);
            }
            PipelineStage::Done | PipelineStage::Failed => {}
        }
        Ok(())
    }
}
