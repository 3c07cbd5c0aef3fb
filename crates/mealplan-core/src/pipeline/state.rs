//! Pipeline stage graph and the per-run result record.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::audit::AuditFinding;
use crate::models::{FoodConstraints, NutritionTargets, UserProfile, WeeklyPlan};

/// Where a pipeline run currently is.
///
/// The graph is linear with one absorbing failure state:
///
/// ```text
/// analyzing_nutrition   -> analyzing_preferences
/// analyzing_preferences -> synthesizing
/// synthesizing          -> done
/// analyzing_nutrition   -> failed
/// analyzing_preferences -> failed
/// synthesizing          -> failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    AnalyzingNutrition,
    AnalyzingPreferences,
    Synthesizing,
    Done,
    Failed,
}

impl PipelineStage {
    /// Check whether `from -> to` is an edge in the stage graph.
    pub fn is_valid_transition(from: PipelineStage, to: PipelineStage) -> bool {
        matches!(
            (from, to),
            (Self::AnalyzingNutrition, Self::AnalyzingPreferences)
                | (Self::AnalyzingPreferences, Self::Synthesizing)
                | (Self::Synthesizing, Self::Done)
                | (Self::AnalyzingNutrition, Self::Failed)
                | (Self::AnalyzingPreferences, Self::Failed)
                | (Self::Synthesizing, Self::Failed)
        )
    }

    /// The stage that follows a successful run of this one.
    ///
    /// Terminal stages return themselves.
    pub fn next(self) -> PipelineStage {
        match self {
            Self::AnalyzingNutrition => Self::AnalyzingPreferences,
            Self::AnalyzingPreferences => Self::Synthesizing,
            Self::Synthesizing => Self::Done,
            Self::Done => Self::Done,
            Self::Failed => Self::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Human-readable name used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::AnalyzingNutrition => "nutrition analysis",
            Self::AnalyzingPreferences => "preference analysis",
            Self::Synthesizing => "plan synthesis",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AnalyzingNutrition => "analyzing_nutrition",
            Self::AnalyzingPreferences => "analyzing_preferences",
            Self::Synthesizing => "synthesizing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Wall-clock span of one executed stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageTiming {
    pub stage: PipelineStage,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl StageTiming {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Everything a pipeline run produced, including partial results on failure.
///
/// Callers check [`PipelineState::error`] first. When it is set, results of
/// stages that completed before the failure are still present.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub run_id: Uuid,
    pub profile: UserProfile,
    pub stage: PipelineStage,
    pub nutrition: Option<NutritionTargets>,
    pub constraints: Option<FoodConstraints>,
    pub final_plan: Option<WeeklyPlan>,
    /// `"<stage> failed: <reason>"` for the first stage that failed.
    pub error: Option<String>,
    pub failed_stage: Option<PipelineStage>,
    pub timings: Vec<StageTiming>,
    pub findings: Vec<AuditFinding>,
}

impl PipelineState {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            profile,
            stage: PipelineStage::AnalyzingNutrition,
            nutrition: None,
            constraints: None,
            final_plan: None,
            error: None,
            failed_stage: None,
            timings: Vec::new(),
            findings: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.stage == PipelineStage::Done && self.error.is_none()
    }

    /// Move to `to`. Invalid edges are ignored and reported as `false`.
    pub(crate) fn transition(&mut self, to: PipelineStage) -> bool {
        if !PipelineStage::is_valid_transition(self.stage, to) {
            return false;
        }
        self.stage = to;
        true
    }

    /// Record a failure of the current stage and enter [`PipelineStage::Failed`].
    pub(crate) fn fail(&mut self, reason: impl fmt::Display) {
        let stage = self.stage;
        if self.transition(PipelineStage::Failed) {
            self.error = Some(format!("{} failed: {reason}", stage.label()));
            self.failed_stage = Some(stage);
        }
    }
}
