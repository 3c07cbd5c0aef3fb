//! Markdown export format.

use std::fmt::Write;

use crate::models::WeeklyPlan;

/// Render a plan as Markdown.
///
/// Output depends only on the plan, so rendering the same plan twice gives
/// byte-identical text.
pub fn to_markdown(plan: &WeeklyPlan) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str("# Personal Meal Plan\n\n");
    let _ = writeln!(out, "{}\n", plan.summary.trim());

    for day in &plan.week_plan {
        let _ = writeln!(out, "## {}\n", day.day);
        let _ = writeln!(
            out,
            "**Day total:** {:.0} kcal (P: {:.0}g, F: {:.0}g, C: {:.0}g)\n",
            day.total_calories, day.total_protein_g, day.total_fats_g, day.total_carbs_g
        );

        for meal in &day.meals {
            let _ = writeln!(out, "### {} ({})\n", meal.name, meal.time);
            let _ = writeln!(
                out,
                "**Calories:** {:.0} kcal | P: {:.0}g | F: {:.0}g | C: {:.0}g\n",
                meal.calories, meal.protein_g, meal.fats_g, meal.carbs_g
            );
            out.push_str("**Foods:**\n");
            for food in &meal.foods {
                let _ = writeln!(out, "- {food}");
            }
            out.push('\n');
        }
        out.push_str("---\n\n");
    }

    out
}
