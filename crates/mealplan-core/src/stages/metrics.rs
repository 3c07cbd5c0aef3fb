//! Stage 1: body metrics to calorie and macronutrient targets.
//!
//! The formulas live in the system prompt as context for the model. Nothing
//! is recomputed locally; the returned numbers are only shape-checked.

use std::sync::Arc;

use tracing::{debug, instrument};

use super::StageError;
use super::contract::{NUTRITION_FORMAT, format_instructions, parse_response};
use crate::llm::{Prompt, TextGenerator};
use crate::models::{NutritionTargets, UserProfile};

const SYSTEM_PROMPT: &str = "\
You are an expert dietitian with deep knowledge of nutrition science.
Analyze the user's body metrics and determine:
1. Basal metabolic rate (BMR) using the Mifflin-St Jeor equation
2. Daily calorie target for the user's goal
3. Optimal macronutrient split (protein, fats, carbohydrates)
4. Practical nutrition recommendations

BMR:
- Men: BMR = 10 x weight(kg) + 6.25 x height(cm) - 5 x age + 5
- Women: BMR = 10 x weight(kg) + 6.25 x height(cm) - 5 x age - 161

Daily calories:
- Lose weight: BMR x 1.2 - 500 kcal
- Gain weight: BMR x 1.5 + 300 kcal
- Maintain weight: BMR x 1.4

Macronutrient split (share of daily calories):
- Lose weight: protein 35%, fats 25%, carbohydrates 40%
- Gain weight: protein 30%, fats 20%, carbohydrates 50%
- Maintain weight: protein 30%, fats 25%, carbohydrates 45%

Convert shares to grams with 4 kcal per gram of protein or carbohydrate and
9 kcal per gram of fat, so that protein_g*4 + carbs_g*4 + fats_g*9 is
approximately daily_calories.
";

/// Computes nutrition targets from a [`UserProfile`].
pub struct MetricsAnalyzer {
    generator: Arc<dyn TextGenerator>,
}

impl MetricsAnalyzer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Name of the provider this stage calls.
    pub fn provider(&self) -> &str {
        self.generator.name()
    }

    /// Render the prompt for a profile.
    pub fn build_prompt(profile: &UserProfile) -> Prompt {
        let mut system = String::with_capacity(SYSTEM_PROMPT.len() + NUTRITION_FORMAT.len() + 256);
        system.push_str(SYSTEM_PROMPT);
        system.push('\n');
        system.push_str(&format_instructions(NUTRITION_FORMAT));

        let user = format!(
            "Analyze the following user data:\n\n\
             Goal: {goal}\n\
             Sex: {sex}\n\
             Weight: {weight} kg\n\
             Height: {height} cm\n\
             Age: {age} years\n\n\
             Calculate BMR, the daily calorie target and macronutrients, and give recommendations.",
            goal = profile.goal().label(),
            sex = profile.sex(),
            weight = profile.weight(),
            height = profile.height(),
            age = profile.age(),
        );

        Prompt::new(system, user)
    }

    #[instrument(skip_all, fields(provider = %self.generator.name()))]
    pub async fn analyze(&self, profile: &UserProfile) -> Result<NutritionTargets, StageError> {
        let prompt = Self::build_prompt(profile);
        let text = self.generator.generate(&prompt).await?;
        let targets: NutritionTargets = parse_response(&text)?;
        debug!(
            bmr = targets.bmr,
            daily_calories = targets.daily_calories,
            "nutrition targets parsed"
        );
        Ok(targets)
    }
}
