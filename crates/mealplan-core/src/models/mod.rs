//! Data shapes exchanged between pipeline stages.

pub mod plan;
pub mod profile;

pub use plan::{DailyPlan, FoodConstraints, MacroTotals, Meal, NutritionTargets, WeeklyPlan};
pub use profile::{DEFAULT_PREFERENCES, Goal, ProfileError, Sex, UserProfile};
