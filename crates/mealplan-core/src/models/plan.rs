//! Stage outputs and the weekly plan artifact.
//!
//! Field names are the wire contract shared with the model and with
//! `meal_plan.json`; renaming one breaks both.

use serde::{Deserialize, Serialize};

/// Stage-1 output: daily energy and macronutrient targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionTargets {
    /// Basal metabolic rate in kcal.
    pub bmr: f64,
    /// Recommended daily intake in kcal.
    pub daily_calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fats_g: f64,
    /// Free-text nutrition advice.
    pub recommendations: String,
}

/// Stage-2 output: what the user may and may not eat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodConstraints {
    pub allowed_foods: Vec<String>,
    pub restricted_foods: Vec<String>,
    /// Free-text advice on choosing foods.
    pub recommendations: String,
}

/// One eating occasion inside a [`DailyPlan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub name: String,
    /// Approximate time of day, e.g. `08:00`.
    pub time: String,
    /// Food items with quantities, e.g. `Rice 100g`.
    pub foods: Vec<String>,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fats_g: f64,
}

/// Energy and macronutrient amounts for some span of meals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fats_g: f64,
}

/// One day's meals plus the totals the model declared for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPlan {
    /// Day label, e.g. `Monday`.
    pub day: String,
    pub meals: Vec<Meal>,
    pub total_calories: f64,
    pub total_protein_g: f64,
    pub total_carbs_g: f64,
    pub total_fats_g: f64,
}

impl DailyPlan {
    /// Totals as declared by the model.
    pub fn declared_totals(&self) -> MacroTotals {
        MacroTotals {
            calories: self.total_calories,
            protein_g: self.total_protein_g,
            carbs_g: self.total_carbs_g,
            fats_g: self.total_fats_g,
        }
    }

    /// Totals recomputed by summing the day's meals.
    pub fn summed_totals(&self) -> MacroTotals {
        self.meals
            .iter()
            .fold(MacroTotals::default(), |acc, meal| MacroTotals {
                calories: acc.calories + meal.calories,
                protein_g: acc.protein_g + meal.protein_g,
                carbs_g: acc.carbs_g + meal.carbs_g,
                fats_g: acc.fats_g + meal.fats_g,
            })
    }
}

/// The final artifact: an ordered week of daily plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlan {
    pub week_plan: Vec<DailyPlan>,
    pub summary: String,
}

impl WeeklyPlan {
    /// Iterate over every food item in plan order.
    pub fn food_items(&self) -> impl Iterator<Item = &str> {
        self.week_plan
            .iter()
            .flat_map(|day| day.meals.iter())
            .flat_map(|meal| meal.foods.iter())
            .map(String::as_str)
    }

    /// Sum of the declared daily calorie totals.
    pub fn total_calories(&self) -> f64 {
        self.week_plan.iter().map(|d| d.total_calories).sum()
    }
}
