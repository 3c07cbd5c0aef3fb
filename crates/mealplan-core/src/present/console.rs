//! Plain-text console rendering.
//!
//! Every function returns a `String` so callers decide where it goes; the
//! CLI prints to stdout.

use std::fmt::Write;

use super::shopping::build_shopping_list;
use crate::models::{DailyPlan, FoodConstraints, NutritionTargets, WeeklyPlan};

const RULE_WIDTH: usize = 60;

/// Lists longer than this are cut off with an "... and N more" line.
pub const LIST_PREVIEW: usize = 10;

fn heading(out: &mut String, title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{rule}");
}

/// Aggregate figures for a whole week.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekStats {
    pub days: usize,
    pub total_calories: f64,
    /// Zero when the plan has no days.
    pub average_calories: f64,
}

impl WeekStats {
    pub fn from_plan(plan: &WeeklyPlan) -> Self {
        let days = plan.week_plan.len();
        let total_calories = plan.total_calories();
        let average_calories = if days > 0 {
            total_calories / days as f64
        } else {
            0.0
        };
        Self {
            days,
            total_calories,
            average_calories,
        }
    }
}

pub fn render_nutrition(targets: &NutritionTargets) -> String {
    let mut out = String::new();
    heading(&mut out, "NUTRITION ANALYSIS");
    let _ = writeln!(out);
    let _ = writeln!(out, "Basal metabolic rate (BMR): {:.0} kcal", targets.bmr);
    let _ = writeln!(out, "Daily calorie target: {:.0} kcal", targets.daily_calories);
    let _ = writeln!(out);
    let _ = writeln!(out, "Macronutrients:");
    let _ = writeln!(out, "  - Protein: {:.0} g", targets.protein_g);
    let _ = writeln!(out, "  - Fats: {:.0} g", targets.fats_g);
    let _ = writeln!(out, "  - Carbohydrates: {:.0} g", targets.carbs_g);
    let _ = writeln!(out);
    let _ = writeln!(out, "Recommendations:");
    let _ = writeln!(out, "  {}", targets.recommendations);
    out
}

fn food_list(out: &mut String, title: &str, foods: &[String]) {
    let items = if foods.len() == 1 { "item" } else { "items" };
    let _ = writeln!(out, "{title} ({} {items}):", foods.len());
    for (i, food) in foods.iter().take(LIST_PREVIEW).enumerate() {
        let _ = writeln!(out, "  {}. {food}", i + 1);
    }
    if foods.len() > LIST_PREVIEW {
        let _ = writeln!(out, "  ... and {} more", foods.len() - LIST_PREVIEW);
    }
}

pub fn render_constraints(constraints: &FoodConstraints) -> String {
    let mut out = String::new();
    heading(&mut out, "FOOD PREFERENCES");
    let _ = writeln!(out);
    food_list(&mut out, "Allowed foods", &constraints.allowed_foods);
    let _ = writeln!(out);
    food_list(&mut out, "Restricted foods", &constraints.restricted_foods);
    let _ = writeln!(out);
    let _ = writeln!(out, "Recommendations:");
    let _ = writeln!(out, "  {}", constraints.recommendations);
    out
}

pub fn render_daily_plan(day: &DailyPlan) -> String {
    let mut out = String::new();
    heading(&mut out, &day.day.to_uppercase());

    for meal in &day.meals {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} ({})", meal.name, meal.time);
        let _ = writeln!(
            out,
            "   {:.0} kcal | P: {:.0}g | F: {:.0}g | C: {:.0}g",
            meal.calories, meal.protein_g, meal.fats_g, meal.carbs_g
        );
        let _ = writeln!(out, "   Foods:");
        for food in &meal.foods {
            let _ = writeln!(out, "     - {food}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Day total:");
    let _ = writeln!(out, "   {:.0} kcal", day.total_calories);
    let _ = writeln!(
        out,
        "   Protein: {:.0}g | Fats: {:.0}g | Carbohydrates: {:.0}g",
        day.total_protein_g, day.total_fats_g, day.total_carbs_g
    );
    out
}

/// Render every day followed by weekly statistics.
pub fn render_weekly_plan(plan: &WeeklyPlan) -> String {
    let mut out = String::new();
    heading(&mut out, "WEEKLY MEAL PLAN");
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", plan.summary);

    for day in &plan.week_plan {
        let _ = writeln!(out);
        out.push_str(&render_daily_plan(day));
    }

    let stats = WeekStats::from_plan(plan);
    let _ = writeln!(out);
    heading(&mut out, "WEEKLY STATISTICS");
    let _ = writeln!(out);
    let _ = writeln!(out, "Average per day: {:.0} kcal", stats.average_calories);
    let _ = writeln!(out, "Total for the week: {:.0} kcal", stats.total_calories);
    let _ = writeln!(out, "Days in plan: {}", stats.days);
    out
}

pub fn render_shopping_list(plan: &WeeklyPlan) -> String {
    let mut out = String::new();
    heading(&mut out, "SHOPPING LIST");
    let _ = writeln!(out);
    for item in build_shopping_list(plan) {
        let meals = if item.count == 1 { "meal" } else { "meals" };
        let _ = writeln!(out, "- {} (used in {} {meals})", item.product, item.count);
    }
    out
}
