//! Structured-output contracts between the model and the pipeline.
//!
//! Each stage appends a format instruction to its system prompt and parses
//! the model's reply with [`parse_response`]. Parsing is best-effort about
//! where the JSON sits in the reply (fenced block or bare object) but strict
//! about its shape: the value must deserialize into the target type and pass
//! that type's [`ShapeCheck`].

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{FoodConstraints, NutritionTargets, WeeklyPlan};

/// Errors from turning raw model text into a typed stage result.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("response contains no JSON object")]
    NoJson,

    #[error("response JSON does not match the expected schema: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("response violates the expected shape: {0}")]
    ShapeViolation(String),
}

/// Structural checks applied after deserialization.
pub trait ShapeCheck {
    /// Return a description of the first violation found, if any.
    fn check_shape(&self) -> Result<(), String>;
}

/// Locate the JSON object inside a model reply.
///
/// Prefers the body of a ```` ```json ```` fence; otherwise takes the span
/// from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    const FENCE: &str = "```json";

    if let Some(start) = text.find(FENCE) {
        let body = &text[start + FENCE.len()..];
        if let Some(end) = body.find("```") {
            let inner = body[..end].trim();
            if !inner.is_empty() {
                return Some(inner);
            }
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Extract, deserialize, and shape-check a model reply.
pub fn parse_response<T>(text: &str) -> Result<T, ContractError>
where
    T: DeserializeOwned + ShapeCheck,
{
    let json = extract_json(text).ok_or(ContractError::NoJson)?;
    let value: T = serde_json::from_str(json)?;
    value.check_shape().map_err(ContractError::ShapeViolation)?;
    Ok(value)
}

fn check_non_negative(field: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{field} must be a non-negative number, got {value}"));
    }
    Ok(())
}

impl ShapeCheck for NutritionTargets {
    fn check_shape(&self) -> Result<(), String> {
        check_non_negative("bmr", self.bmr)?;
        check_non_negative("daily_calories", self.daily_calories)?;
        check_non_negative("protein_g", self.protein_g)?;
        check_non_negative("carbs_g", self.carbs_g)?;
        check_non_negative("fats_g", self.fats_g)
    }
}

impl ShapeCheck for FoodConstraints {
    fn check_shape(&self) -> Result<(), String> {
        if self.allowed_foods.iter().all(|f| f.trim().is_empty()) {
            return Err("allowed_foods must not be empty".to_string());
        }
        Ok(())
    }
}

impl ShapeCheck for WeeklyPlan {
    fn check_shape(&self) -> Result<(), String> {
        if self.week_plan.is_empty() {
            return Err("week_plan must contain at least one day".to_string());
        }
        if let Some(day) = self.week_plan.iter().find(|d| d.meals.is_empty()) {
            return Err(format!("{} has no meals", day.day));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Format instructions
// ---------------------------------------------------------------------------

const FORMAT_PREAMBLE: &str = "\
Respond with a single JSON object and nothing else. Do not add commentary \
before or after it. You may wrap it in a ```json fenced block. Use exactly \
the field names shown below; numbers must be plain JSON numbers without units.";

/// Output format for the metrics stage.
pub const NUTRITION_FORMAT: &str = r#"{
  "bmr": 1805.0,                 // basal metabolic rate, kcal
  "daily_calories": 1666.0,      // recommended daily intake, kcal
  "protein_g": 145.8,            // grams per day
  "carbs_g": 166.6,              // grams per day
  "fats_g": 46.3,                // grams per day
  "recommendations": "string"    // practical nutrition advice
}"#;

/// Output format for the preferences stage.
pub const CONSTRAINTS_FORMAT: &str = r#"{
  "allowed_foods": ["string", "..."],     // at least 30 items
  "restricted_foods": ["string", "..."],  // may be empty
  "recommendations": "string"             // advice on choosing foods
}"#;

/// Output format for the synthesis stage.
pub const WEEKLY_PLAN_FORMAT: &str = r#"{
  "week_plan": [
    {
      "day": "Monday",
      "meals": [
        {
          "name": "Breakfast",
          "time": "08:00",
          "foods": ["Oatmeal 60g", "Blueberries 100g"],
          "calories": 420.0,
          "protein_g": 18.0,
          "carbs_g": 62.0,
          "fats_g": 11.0
        }
      ],
      "total_calories": 1650.0,    // sum of meal calories
      "total_protein_g": 140.0,
      "total_carbs_g": 165.0,
      "total_fats_g": 46.0
    }
  ],
  "summary": "string"              // short description of the week
}"#;

/// Render the format instruction block appended to a system prompt.
pub fn format_instructions(schema: &str) -> String {
    let mut out = String::with_capacity(FORMAT_PREAMBLE.len() + schema.len() + 64);
    out.push_str("## Output format\n\n");
    out.push_str(FORMAT_PREAMBLE);
    out.push_str(" Comments after `//` are explanations only; do not emit them.\n\n");
    out.push_str(schema);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUTRITION: &str = r#"{"bmr":1805,"daily_calories":1666,"protein_g":145.8,"carbs_g":166.6,"fats_g":46.3,"recommendations":"ok"}"#;

    #[test]
    fn extracts_fenced_json() {
        let text = "Here you go:\n```json\n{\"a\": 1}\n```\nEnjoy {not json}";
        assert_eq!(extract_json(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn falls_back_to_outer_braces() {
        let text = "Sure! {\"a\": {\"b\": 2}} hope this helps";
        assert_eq!(extract_json(text), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn unterminated_fence_falls_back_to_braces() {
        let text = "```json\n{\"a\": 1}";
        assert_eq!(extract_json(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn no_braces_is_none() {
        assert_eq!(extract_json("I cannot help with that."), None);
        assert_eq!(extract_json("} backwards {"), None);
    }

    #[test]
    fn parses_nutrition_targets() {
        let targets: NutritionTargets = parse_response(NUTRITION).unwrap();
        assert_eq!(targets.bmr, 1805.0);
        assert_eq!(targets.recommendations, "ok");
    }

    #[test]
    fn prose_only_reply_is_no_json() {
        let err = parse_response::<NutritionTargets>("Sorry, no.").unwrap_err();
        assert!(matches!(err, ContractError::NoJson));
    }

    #[test]
    fn missing_field_is_malformed() {
        let err = parse_response::<NutritionTargets>(r#"{"bmr": 1800}"#).unwrap_err();
        assert!(matches!(err, ContractError::Malformed(_)));
    }

    #[test]
    fn negative_number_is_shape_violation() {
        let text = NUTRITION.replace("\"fats_g\":46.3", "\"fats_g\":-1");
        let err = parse_response::<NutritionTargets>(&text).unwrap_err();
        assert!(matches!(err, ContractError::ShapeViolation(ref m) if m.contains("fats_g")));
    }

    #[test]
    fn empty_allowed_foods_is_shape_violation() {
        let text = r#"{"allowed_foods":[],"restricted_foods":["meat"],"recommendations":""}"#;
        let err = parse_response::<FoodConstraints>(text).unwrap_err();
        assert!(matches!(err, ContractError::ShapeViolation(_)));
    }

    #[test]
    fn day_without_meals_is_shape_violation() {
        let text = r#"{"week_plan":[{"day":"Monday","meals":[],"total_calories":0,
            "total_protein_g":0,"total_carbs_g":0,"total_fats_g":0}],"summary":""}"#;
        let err = parse_response::<WeeklyPlan>(text).unwrap_err();
        assert!(matches!(err, ContractError::ShapeViolation(ref m) if m.contains("Monday")));

        let err = parse_response::<WeeklyPlan>(r#"{"week_plan":[],"summary":""}"#).unwrap_err();
        assert!(matches!(err, ContractError::ShapeViolation(_)));
    }

    #[test]
    fn format_instructions_embed_schema() {
        let block = format_instructions(WEEKLY_PLAN_FORMAT);
        assert!(block.starts_with("## Output format"));
        assert!(block.contains("\"week_plan\""));
        assert!(block.contains("```json"));
    }
}
