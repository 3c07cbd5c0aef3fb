//! Shared test utilities for mealplan integration tests.
//!
//! Provides a [`ScriptedGenerator`] that replays canned model replies and
//! records every prompt it receives, plus fixture builders for profiles and
//! stage outputs.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use mealplan_core::llm::{LlmError, Prompt, TextGenerator};
use mealplan_core::models::{
    DailyPlan, FoodConstraints, Goal, Meal, NutritionTargets, Sex, UserProfile, WeeklyPlan,
};

// ---------------------------------------------------------------------------
// ScriptedGenerator
// ---------------------------------------------------------------------------

enum Reply {
    Text(String),
    Status(u16, String),
}

#[derive(Default)]
struct Script {
    replies: VecDeque<Reply>,
    prompts: Vec<Prompt>,
}

/// A [`TextGenerator`] that returns queued replies in order.
///
/// Once the queue is empty every call fails with
/// [`LlmError::EmptyResponse`]. Cloning shares the same script, so a test
/// can keep one handle for assertions and give another to the pipeline.
#[derive(Clone)]
pub struct ScriptedGenerator {
    name: String,
    script: Arc<Mutex<Script>>,
}

impl ScriptedGenerator {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            script: Arc::default(),
        }
    }

    /// Queue a successful text reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.lock().replies.push_back(Reply::Text(text.into()));
        self
    }

    /// Queue an HTTP error reply.
    pub fn fail(self, status: u16, message: &str) -> Self {
        self.lock()
            .replies
            .push_back(Reply::Status(status, message.to_string()));
        self
    }

    /// Number of `generate` calls received so far.
    pub fn calls(&self) -> usize {
        self.lock().prompts.len()
    }

    /// Every prompt received, in call order.
    pub fn prompts(&self) -> Vec<Prompt> {
        self.lock().prompts.clone()
    }

    /// Shareable trait-object handle backed by the same script.
    pub fn handle(&self) -> Arc<dyn TextGenerator> {
        Arc::new(self.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let mut script = self.lock();
        script.prompts.push(prompt.clone());
        match script.replies.pop_front() {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Status(status, message)) => Err(match status {
                401 | 403 => LlmError::Unauthorized {
                    provider: self.name.clone(),
                    message,
                },
                429 => LlmError::RateLimited {
                    provider: self.name.clone(),
                    message,
                },
                _ => LlmError::Api {
                    provider: self.name.clone(),
                    status,
                    message,
                },
            }),
            None => Err(LlmError::EmptyResponse {
                provider: self.name.clone(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Daily calorie target used by every fixture.
pub const TARGET_CALORIES: f64 = 1666.0;

/// Reduce / male / 85 kg / 180 cm / 30 y / vegan.
pub fn sample_profile() -> UserProfile {
    UserProfile::new(Goal::Reduce, Sex::Male, 85.0, 180.0, 30, "vegan")
        .expect("fixture profile is valid")
}

pub fn sample_targets() -> NutritionTargets {
    NutritionTargets {
        bmr: 1805.0,
        daily_calories: TARGET_CALORIES,
        protein_g: 145.8,
        carbs_g: 166.6,
        fats_g: 46.3,
        recommendations: "Build meals around legumes and whole grains.".to_string(),
    }
}

pub fn vegan_constraints() -> FoodConstraints {
    let allowed = [
        "Tofu", "Tempeh", "Lentils", "Chickpeas", "Black beans", "Rice", "Quinoa", "Oats",
        "Buckwheat", "Spinach", "Broccoli", "Carrots", "Bell peppers", "Apples", "Bananas",
        "Blueberries", "Almonds", "Walnuts", "Avocado", "Olive oil", "Chia seeds",
        "Flaxseed", "Soy milk", "Whole wheat bread", "Sweet potatoes", "Kale", "Tomatoes",
        "Cumin", "Turmeric", "Garlic",
    ];
    let restricted = ["Meat", "Fish", "Eggs", "Milk", "Cheese", "Butter", "Honey"];
    FoodConstraints {
        allowed_foods: allowed.iter().map(|s| s.to_string()).collect(),
        restricted_foods: restricted.iter().map(|s| s.to_string()).collect(),
        recommendations: "Combine legumes with grains for complete protein.".to_string(),
    }
}

fn meal(name: &str, time: &str, foods: &[&str]) -> Meal {
    Meal {
        name: name.to_string(),
        time: time.to_string(),
        foods: foods.iter().map(|f| f.to_string()).collect(),
        calories: TARGET_CALORIES / 4.0,
        protein_g: 36.0,
        carbs_g: 42.0,
        fats_g: 11.5,
    }
}

/// A plan of `days` days that passes every audit check when `days == 7`.
pub fn sample_weekly_plan(days: usize) -> WeeklyPlan {
    let week_plan = WEEKDAYS
        .iter()
        .cycle()
        .take(days)
        .map(|day| DailyPlan {
            day: day.to_string(),
            meals: vec![
                meal("Breakfast", "08:00", &["Oats 60g", "Blueberries 100g"]),
                meal("Lunch", "14:00", &["Rice 100g", "Tofu 150g"]),
                meal("Afternoon snack", "17:00", &["Almonds 30g", "Apples 1"]),
                meal("Dinner", "20:00", &["Lentils 120g", "Spinach 80g"]),
            ],
            total_calories: TARGET_CALORIES,
            total_protein_g: 144.0,
            total_carbs_g: 168.0,
            total_fats_g: 46.0,
        })
        .collect();
    WeeklyPlan {
        week_plan,
        summary: "A plant-based week with steady protein.".to_string(),
    }
}

fn to_json(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).expect("fixture serializes")
}

/// Stage-1 reply, wrapped in a fenced block the way chat models answer.
pub fn nutrition_reply() -> String {
    format!(
        "Here is the analysis.\n```json\n{}\n```",
        to_json(&sample_targets())
    )
}

/// Stage-2 reply as a bare JSON object with surrounding prose.
pub fn constraints_reply() -> String {
    format!(
        "Based on a vegan diet: {} Let me know if you need more.",
        to_json(&vegan_constraints())
    )
}

/// Stage-3 reply for a plan of `days` days.
pub fn plan_reply(days: usize) -> String {
    format!("```json\n{}\n```", to_json(&sample_weekly_plan(days)))
}

/// A stage-2 reply with an empty allowed list.
pub fn empty_constraints_reply() -> String {
    json!({
        "allowed_foods": [],
        "restricted_foods": [],
        "recommendations": ""
    })
    .to_string()
}
