//! `mealplan plan` and `mealplan example`: run the pipeline, print the
//! result, and export the finished plan.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use mealplan_core::models::{Goal, Sex, UserProfile};
use mealplan_core::present::{
    export_json, export_plan, render_constraints, render_nutrition, render_shopping_list,
    render_weekly_plan,
};
use mealplan_core::{MealPlanner, PipelineState, PlannerConfig};

/// Where and how to write the finished plan.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub dir: PathBuf,
    pub stem: String,
    /// Also write `<stem>.md` next to the JSON file.
    pub markdown: bool,
}

/// The fixed profile used by `mealplan example`.
pub fn example_profile() -> Result<UserProfile> {
    UserProfile::new(Goal::Reduce, Sex::Male, 85.0, 180.0, 30, "vegan")
        .context("example profile is invalid")
}

/// Build the planner from configuration and run it for `profile`.
pub async fn run_plan(
    config: &PlannerConfig,
    profile: UserProfile,
    options: &OutputOptions,
) -> Result<()> {
    let planner =
        MealPlanner::from_config(config).context("failed to set up model providers")?;
    let state = planner.run(profile).await;
    let mut stdout = io::stdout().lock();
    report(&state, options, &mut stdout)?;
    Ok(())
}

/// Run `planner` and report to `out`. Returns the files written.
pub async fn plan_with(
    planner: &MealPlanner,
    profile: UserProfile,
    options: &OutputOptions,
    out: &mut impl Write,
) -> Result<Vec<PathBuf>> {
    let state = planner.run(profile).await;
    report(&state, options, out)
}

/// Print the pipeline outcome and export the plan on success.
///
/// A failed run is reported but is not an error for the process.
pub fn report(
    state: &PipelineState,
    options: &OutputOptions,
    out: &mut impl Write,
) -> Result<Vec<PathBuf>> {
    if let Some(error) = &state.error {
        writeln!(out, "\nError: {error}")?;
        return Ok(Vec::new());
    }
    let Some(plan) = &state.final_plan else {
        writeln!(out, "\nNo plan was produced.")?;
        return Ok(Vec::new());
    };

    if let Some(nutrition) = &state.nutrition {
        write!(out, "\n{}", render_nutrition(nutrition))?;
    }
    if let Some(constraints) = &state.constraints {
        write!(out, "\n{}", render_constraints(constraints))?;
    }
    write!(out, "\n{}", render_weekly_plan(plan))?;
    write!(out, "\n{}", render_shopping_list(plan))?;

    if !state.findings.is_empty() {
        writeln!(out, "\nPlan check:")?;
        for finding in &state.findings {
            writeln!(out, "  - {finding}")?;
        }
    }

    let written = if options.markdown {
        let paths = export_plan(&options.dir, &options.stem, plan)?;
        vec![paths.json, paths.markdown]
    } else {
        vec![export_json(&options.dir, &options.stem, plan)?]
    };

    writeln!(out)?;
    for path in &written {
        writeln!(out, "Plan saved to {}", path.display())?;
    }
    Ok(written)
}
