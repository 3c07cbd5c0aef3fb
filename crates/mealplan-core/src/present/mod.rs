//! Rendering and export of pipeline results.

pub mod console;
pub mod export;
pub mod markdown;
pub mod shopping;

pub use console::{
    WeekStats, render_constraints, render_daily_plan, render_nutrition, render_shopping_list,
    render_weekly_plan,
};
pub use export::{
    DEFAULT_STEM, ExportError, ExportPaths, export_json, export_plan, load_plan, write_json,
    write_markdown,
};
pub use markdown::to_markdown;
pub use shopping::{ShoppingItem, build_shopping_list};
