//! Stage 2: dietary preferences to allowed and restricted foods.

use std::sync::Arc;

use tracing::{debug, instrument};

use super::StageError;
use super::contract::{CONSTRAINTS_FORMAT, format_instructions, parse_response};
use crate::llm::{Prompt, TextGenerator};
use crate::models::{FoodConstraints, Goal};

const SYSTEM_PROMPT: &str = "\
You are an expert in food preferences and dietary restrictions.
Analyze the user's preferences and produce:
1. A list of allowed foods (at least 30 to 40 items)
2. A list of restricted foods
3. Recommendations for choosing foods

Apply the rules of common diets:
- Vegan: exclude all animal products
- Vegetarian: exclude meat and fish
- Gluten-free: exclude wheat, rye and barley
- Lactose-free: exclude dairy products
- Paleo: whole natural foods, nothing processed

If the user states no preferences, apply no restrictions and offer a varied
everyday selection.

Cover every category in the allowed list:
- Protein sources
- Carbohydrate sources (grains, cereals)
- Vegetables and greens
- Fruits
- Fat sources
- Spices and seasonings
";

/// Turns free-text preferences into [`FoodConstraints`].
pub struct PreferenceResolver {
    generator: Arc<dyn TextGenerator>,
}

impl PreferenceResolver {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Name of the provider this stage calls.
    pub fn provider(&self) -> &str {
        self.generator.name()
    }

    /// Render the prompt for a preference string and goal.
    pub fn build_prompt(preferences: &str, goal: Goal) -> Prompt {
        let mut system =
            String::with_capacity(SYSTEM_PROMPT.len() + CONSTRAINTS_FORMAT.len() + 256);
        system.push_str(SYSTEM_PROMPT);
        system.push('\n');
        system.push_str(&format_instructions(CONSTRAINTS_FORMAT));

        let user = format!(
            "Analyze the following dietary preferences:\n\n\
             Preferences: {preferences}\n\
             Goal: {goal}\n\n\
             Produce detailed lists of allowed and restricted foods and give recommendations.",
            goal = goal.label(),
        );

        Prompt::new(system, user)
    }

    #[instrument(skip_all, fields(provider = %self.generator.name()))]
    pub async fn resolve(
        &self,
        preferences: &str,
        goal: Goal,
    ) -> Result<FoodConstraints, StageError> {
        let prompt = Self::build_prompt(preferences, goal);
        let text = self.generator.generate(&prompt).await?;
        let constraints: FoodConstraints = parse_response(&text)?;
        debug!(
            allowed = constraints.allowed_foods.len(),
            restricted = constraints.restricted_foods.len(),
            "food constraints parsed"
        );
        Ok(constraints)
    }
}
