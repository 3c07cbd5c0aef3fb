//! Stage 3: targets plus constraints to a weekly plan.
//!
//! The prompt asks for seven days of four to five meals within 50 kcal of
//! the target using allowed foods only. None of that is enforced here;
//! see [`crate::audit`] for the optional post-parse checks.

use std::sync::Arc;

use tracing::{debug, instrument};

use super::StageError;
use super::contract::{WEEKLY_PLAN_FORMAT, format_instructions, parse_response};
use crate::llm::{Prompt, TextGenerator};
use crate::models::{FoodConstraints, NutritionTargets, UserProfile, WeeklyPlan};

/// Suggested meal slots, in order.
pub const MEAL_SLOTS: [(&str, &str); 5] = [
    ("Breakfast", "08:00"),
    ("Snack", "11:00"),
    ("Lunch", "14:00"),
    ("Afternoon snack", "17:00"),
    ("Dinner", "20:00"),
];

const SYSTEM_PROMPT: &str = "\
You are an experienced dietitian who builds individual meal plans.
Create a detailed one-week meal plan based on:
1. The nutrition analysis (calories, macronutrients)
2. The preference analysis (allowed and restricted foods)

Plan requirements:
- 7 days, Monday through Sunday
- 4 to 5 meals per day
- Every meal lists concrete foods with approximate quantities, e.g. \"Rice 100g\"
- Give calories and macronutrients for every meal
- Each day's calories must be within 50 kcal of the daily target
- Keep the macronutrient balance
- Use allowed foods only
- Vary the menu and do not repeat the same dish on consecutive days
- Give a time for every meal
- Each day's totals must equal the sum of its meals
";

/// Builds the [`WeeklyPlan`] from the two earlier stage results.
pub struct PlanSynthesizer {
    generator: Arc<dyn TextGenerator>,
}

impl PlanSynthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Name of the provider this stage calls.
    pub fn provider(&self) -> &str {
        self.generator.name()
    }

    /// Render the prompt from the profile and both upstream results.
    pub fn build_prompt(
        profile: &UserProfile,
        targets: &NutritionTargets,
        constraints: &FoodConstraints,
    ) -> Prompt {
        let mut system =
            String::with_capacity(SYSTEM_PROMPT.len() + WEEKLY_PLAN_FORMAT.len() + 512);
        system.push_str(SYSTEM_PROMPT);
        system.push_str("\nMeal times:\n");
        for (name, time) in MEAL_SLOTS {
            system.push_str(&format!("- {name}: {time}\n"));
        }
        system.push('\n');
        system.push_str(&format_instructions(WEEKLY_PLAN_FORMAT));

        let mut user = String::with_capacity(1024);
        user.push_str("Create a one-week meal plan from the following data.\n\n");

        user.push_str("=== USER ===\n");
        user.push_str(&format!("Goal: {}\n", profile.goal().label()));
        user.push_str(&format!("Sex: {}\n", profile.sex()));
        user.push_str(&format!("Weight: {} kg\n", profile.weight()));
        user.push_str(&format!("Height: {} cm\n", profile.height()));
        user.push_str(&format!("Age: {} years\n", profile.age()));
        user.push_str(&format!("Preferences: {}\n\n", profile.preferences()));

        user.push_str("=== NUTRITION ===\n");
        user.push_str(&format!("Daily calories: {} kcal\n", targets.daily_calories));
        user.push_str(&format!("Protein: {} g\n", targets.protein_g));
        user.push_str(&format!("Fats: {} g\n", targets.fats_g));
        user.push_str(&format!("Carbohydrates: {} g\n", targets.carbs_g));
        user.push_str(&format!("Recommendations: {}\n\n", targets.recommendations));

        user.push_str("=== PREFERENCES ===\n");
        user.push_str(&format!(
            "Allowed foods: {}\n",
            constraints.allowed_foods.join(", ")
        ));
        user.push_str(&format!(
            "Restricted foods: {}\n",
            constraints.restricted_foods.join(", ")
        ));
        user.push_str(&format!(
            "Recommendations: {}\n\n",
            constraints.recommendations
        ));

        user.push_str("Build the detailed weekly plan respecting every parameter above.");

        Prompt::new(system, user)
    }

    #[instrument(skip_all, fields(provider = %self.generator.name()))]
    pub async fn synthesize(
        &self,
        profile: &UserProfile,
        targets: &NutritionTargets,
        constraints: &FoodConstraints,
    ) -> Result<WeeklyPlan, StageError> {
        let prompt = Self::build_prompt(profile, targets, constraints);
        let text = self.generator.generate(&prompt).await?;
        let plan: WeeklyPlan = parse_response(&text)?;
        debug!(days = plan.week_plan.len(), "weekly plan parsed");
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Goal, Sex};

    #[test]
    fn prompt_includes_every_upstream_field() {
        let profile =
            UserProfile::new(Goal::Maintain, Sex::Female, 60.0, 165.0, 41, "gluten-free").unwrap();
        let targets = NutritionTargets {
            bmr: 1300.0,
            daily_calories: 1820.0,
            protein_g: 136.5,
            carbs_g: 204.75,
            fats_g: 50.5,
            recommendations: "Spread protein evenly.".to_string(),
        };
        let constraints = FoodConstraints {
            allowed_foods: vec!["Rice".to_string(), "Quinoa".to_string()],
            restricted_foods: vec!["Wheat".to_string(), "Barley".to_string()],
            recommendations: "Check labels.".to_string(),
        };

        let prompt = PlanSynthesizer::build_prompt(&profile, &targets, &constraints);

        assert!(prompt.system.contains("- Breakfast: 08:00"));
        assert!(prompt.system.contains("- Dinner: 20:00"));
        assert!(prompt.system.contains("\"week_plan\""));
        assert!(prompt.user.contains("Preferences: gluten-free"));
        assert!(prompt.user.contains("Daily calories: 1820 kcal"));
        assert!(prompt.user.contains("Carbohydrates: 204.75 g"));
        assert!(prompt.user.contains("Allowed foods: Rice, Quinoa"));
        assert!(prompt.user.contains("Restricted foods: Wheat, Barley"));
        assert!(prompt.user.contains("Recommendations: Check labels."));
    }
}
