//! End-to-end pipeline runs against scripted generators.

use mealplan_core::audit::AuditFinding;
use mealplan_core::models::{DEFAULT_PREFERENCES, Goal, Sex, UserProfile};
use mealplan_core::{MealPlanner, PipelineStage};
use mealplan_test_utils::{
    ScriptedGenerator, constraints_reply, empty_constraints_reply, nutrition_reply, plan_reply,
    sample_profile,
};

const ANIMAL_PRODUCTS: [&str; 6] = ["meat", "chicken", "beef", "fish", "egg", "cheese"];

struct Harness {
    metrics: ScriptedGenerator,
    preferences: ScriptedGenerator,
    synthesis: ScriptedGenerator,
}

impl Harness {
    fn new(
        metrics: ScriptedGenerator,
        preferences: ScriptedGenerator,
        synthesis: ScriptedGenerator,
    ) -> Self {
        Self {
            metrics,
            preferences,
            synthesis,
        }
    }

    fn happy(plan_days: usize) -> Self {
        Self::new(
            ScriptedGenerator::new("openai").reply(nutrition_reply()),
            ScriptedGenerator::new("gemini").reply(constraints_reply()),
            ScriptedGenerator::new("gemini").reply(plan_reply(plan_days)),
        )
    }

    fn planner(&self) -> MealPlanner {
        MealPlanner::new(
            self.metrics.handle(),
            self.preferences.handle(),
            self.synthesis.handle(),
        )
    }
}

#[tokio::test]
async fn vegan_profile_produces_full_week() {
    let harness = Harness::happy(7);
    let state = harness.planner().run(sample_profile()).await;

    assert!(state.error.is_none(), "unexpected error: {:?}", state.error);
    assert!(state.is_success());
    assert_eq!(state.stage, PipelineStage::Done);
    assert!(state.findings.is_empty(), "{:?}", state.findings);

    let constraints = state.constraints.as_ref().unwrap();
    for food in &constraints.allowed_foods {
        let lowered = food.to_lowercase();
        for animal in ANIMAL_PRODUCTS {
            assert!(!lowered.contains(animal), "{food} is not vegan");
        }
    }

    let plan = state.final_plan.as_ref().unwrap();
    assert_eq!(plan.week_plan.len(), 7);
    for day in &plan.week_plan {
        let summed = day.summed_totals();
        assert!((summed.calories - day.total_calories).abs() <= 1.0);
    }

    assert_eq!(state.timings.len(), 3);
    assert_eq!(
        state.timings.iter().map(|t| t.stage).collect::<Vec<_>>(),
        vec![
            PipelineStage::AnalyzingNutrition,
            PipelineStage::AnalyzingPreferences,
            PipelineStage::Synthesizing,
        ]
    );
    assert!(state.timings.iter().all(|t| t.finished_at >= t.started_at));
}

#[tokio::test]
async fn each_stage_is_called_once_with_upstream_results() {
    let harness = Harness::happy(7);
    harness.planner().run(sample_profile()).await;

    assert_eq!(harness.metrics.calls(), 1);
    assert_eq!(harness.preferences.calls(), 1);
    assert_eq!(harness.synthesis.calls(), 1);

    let metrics_prompt = &harness.metrics.prompts()[0];
    assert!(metrics_prompt.user.contains("Weight: 85 kg"));

    let preferences_prompt = &harness.preferences.prompts()[0];
    assert!(preferences_prompt.user.contains("Preferences: vegan"));

    let synthesis_prompt = &harness.synthesis.prompts()[0];
    assert!(synthesis_prompt.user.contains("Daily calories: 1666 kcal"));
    assert!(synthesis_prompt.user.contains("Tofu, Tempeh, Lentils"));
    assert!(synthesis_prompt.user.contains("Restricted foods: Meat, Fish"));
}

#[tokio::test]
async fn metrics_parse_failure_stops_the_pipeline() {
    let harness = Harness::new(
        ScriptedGenerator::new("openai").reply("I'm sorry, I can't calculate that."),
        ScriptedGenerator::new("gemini").reply(constraints_reply()),
        ScriptedGenerator::new("gemini").reply(plan_reply(7)),
    );
    let state = harness.planner().run(sample_profile()).await;

    assert_eq!(state.stage, PipelineStage::Failed);
    assert_eq!(state.failed_stage, Some(PipelineStage::AnalyzingNutrition));
    let error = state.error.as_deref().unwrap();
    assert!(error.starts_with("nutrition analysis failed: "), "{error}");
    assert!(error.contains("no JSON object"), "{error}");

    assert!(state.nutrition.is_none());
    assert!(state.constraints.is_none());
    assert!(state.final_plan.is_none());
    assert_eq!(harness.preferences.calls(), 0);
    assert_eq!(harness.synthesis.calls(), 0);
    assert_eq!(state.timings.len(), 1);
}

#[tokio::test]
async fn preference_failure_keeps_nutrition_result() {
    let harness = Harness::new(
        ScriptedGenerator::new("openai").reply(nutrition_reply()),
        ScriptedGenerator::new("gemini").fail(429, "Quota exceeded"),
        ScriptedGenerator::new("gemini").reply(plan_reply(7)),
    );
    let state = harness.planner().run(sample_profile()).await;

    assert_eq!(state.failed_stage, Some(PipelineStage::AnalyzingPreferences));
    let error = state.error.as_deref().unwrap();
    assert!(error.starts_with("preference analysis failed: "), "{error}");
    assert!(error.contains("Quota exceeded"), "{error}");

    assert_eq!(state.nutrition.as_ref().unwrap().daily_calories, 1666.0);
    assert!(state.constraints.is_none());
    assert!(state.final_plan.is_none());
    assert_eq!(harness.synthesis.calls(), 0);
}

#[tokio::test]
async fn empty_allowed_list_is_a_contract_failure() {
    let harness = Harness::new(
        ScriptedGenerator::new("openai").reply(nutrition_reply()),
        ScriptedGenerator::new("gemini").reply(empty_constraints_reply()),
        ScriptedGenerator::new("gemini"),
    );
    let state = harness.planner().run(sample_profile()).await;

    assert_eq!(state.failed_stage, Some(PipelineStage::AnalyzingPreferences));
    assert!(state.error.as_deref().unwrap().contains("allowed_foods"));
    assert_eq!(harness.synthesis.calls(), 0);
}

#[tokio::test]
async fn synthesis_transport_failure_is_recorded() {
    let harness = Harness::new(
        ScriptedGenerator::new("openai").reply(nutrition_reply()),
        ScriptedGenerator::new("gemini").reply(constraints_reply()),
        ScriptedGenerator::new("gemini").fail(500, "internal error"),
    );
    let state = harness.planner().run(sample_profile()).await;

    assert_eq!(state.failed_stage, Some(PipelineStage::Synthesizing));
    assert_eq!(
        state.error.as_deref(),
        Some("plan synthesis failed: gemini returned HTTP 500: internal error")
    );
    assert!(state.nutrition.is_some());
    assert!(state.constraints.is_some());
    assert!(state.final_plan.is_none());
}

#[tokio::test]
async fn short_week_is_accepted_with_findings_by_default() {
    let harness = Harness::happy(5);
    let state = harness.planner().run(sample_profile()).await;

    assert!(state.is_success());
    assert_eq!(state.final_plan.as_ref().unwrap().week_plan.len(), 5);
    assert_eq!(
        state.findings,
        vec![AuditFinding::WrongDayCount {
            expected: 7,
            actual: 5
        }]
    );
}

#[tokio::test]
async fn strict_mode_rejects_short_week() {
    let harness = Harness::happy(5);
    let planner = harness.planner().with_strict(true);
    assert!(planner.is_strict());

    let state = planner.run(sample_profile()).await;

    assert_eq!(state.stage, PipelineStage::Failed);
    assert_eq!(state.failed_stage, Some(PipelineStage::Synthesizing));
    let error = state.error.as_deref().unwrap();
    assert!(error.contains("rejected by audit"), "{error}");
    assert!(error.contains("plan covers 5 days, expected 7"), "{error}");
    assert!(state.final_plan.is_none());
    assert_eq!(state.findings.len(), 1);
}

#[tokio::test]
async fn strict_mode_accepts_compliant_plan() {
    let harness = Harness::happy(7);
    let state = harness
        .planner()
        .with_strict(true)
        .run(sample_profile())
        .await;
    assert!(state.is_success(), "{:?}", state.error);
}

#[tokio::test]
async fn blank_preferences_still_yield_constraints() {
    let harness = Harness::happy(7);
    let profile = UserProfile::new(Goal::Maintain, Sex::Female, 62.0, 168.0, 28, "").unwrap();
    let state = harness.planner().run(profile).await;

    assert!(state.is_success());
    assert!(!state.constraints.as_ref().unwrap().allowed_foods.is_empty());
    let prompt = &harness.preferences.prompts()[0];
    assert!(prompt.user.contains(DEFAULT_PREFERENCES));
}

#[tokio::test]
async fn run_ids_are_unique() {
    let a = Harness::happy(7).planner().run(sample_profile()).await;
    let b = Harness::happy(7).planner().run(sample_profile()).await;
    assert_ne!(a.run_id, b.run_id);
}
