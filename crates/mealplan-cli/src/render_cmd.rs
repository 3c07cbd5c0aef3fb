//! `mealplan render`: re-display a previously exported plan.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use mealplan_core::present::{load_plan, render_shopping_list, render_weekly_plan, write_markdown};

pub fn run_render(
    path: &Path,
    markdown: Option<&Path>,
    shopping: bool,
    out: &mut impl Write,
) -> Result<()> {
    let plan = load_plan(path)?;

    write!(out, "{}", render_weekly_plan(&plan))?;
    if shopping {
        write!(out, "\n{}", render_shopping_list(&plan))?;
    }

    if let Some(target) = markdown {
        write_markdown(target, &plan)?;
        writeln!(out, "\nMarkdown written to {}", target.display())?;
    }
    Ok(())
}
