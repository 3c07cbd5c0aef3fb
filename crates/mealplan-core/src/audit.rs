//! Post-synthesis plan audit.
//!
//! The synthesizer asks the model for seven days of four to five meals that
//! hit the calorie target and avoid restricted foods, but nothing forces the
//! model to comply. [`audit_plan`] checks those properties after parsing and
//! reports every deviation as an [`AuditFinding`]. The pipeline logs findings
//! by default and rejects the plan when running in strict mode.

use std::fmt;
use std::ops::RangeInclusive;

use crate::models::{FoodConstraints, NutritionTargets, WeeklyPlan};

/// Number of days a complete plan covers.
pub const EXPECTED_DAYS: usize = 7;

/// Accepted number of meals per day.
pub const MEALS_PER_DAY: RangeInclusive<usize> = 4..=5;

/// Allowed gap between a declared daily total and the sum of its meals.
pub const TOTALS_TOLERANCE: f64 = 1.0;

/// Allowed gap between a day's calories and the daily target, in kcal.
pub const CALORIE_TOLERANCE: f64 = 50.0;

/// One deviation between a synthesized plan and its requirements.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditFinding {
    WrongDayCount {
        expected: usize,
        actual: usize,
    },
    MealCountOutOfRange {
        day: String,
        count: usize,
    },
    TotalsMismatch {
        day: String,
        field: &'static str,
        declared: f64,
        computed: f64,
    },
    CaloriesOffTarget {
        day: String,
        declared: f64,
        target: f64,
    },
    RestrictedFoodUsed {
        day: String,
        meal: String,
        item: String,
        restricted: String,
    },
}

impl fmt::Display for AuditFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongDayCount { expected, actual } => {
                write!(f, "plan covers {actual} days, expected {expected}")
            }
            Self::MealCountOutOfRange { day, count } => write!(
                f,
                "{day} has {count} meals, expected {}-{}",
                MEALS_PER_DAY.start(),
                MEALS_PER_DAY.end()
            ),
            Self::TotalsMismatch {
                day,
                field,
                declared,
                computed,
            } => write!(
                f,
                "{day} declares {field} {declared:.1} but its meals sum to {computed:.1}"
            ),
            Self::CaloriesOffTarget {
                day,
                declared,
                target,
            } => write!(
                f,
                "{day} has {declared:.0} kcal, target is {target:.0} (+/-{CALORIE_TOLERANCE:.0})"
            ),
            Self::RestrictedFoodUsed {
                day,
                meal,
                item,
                restricted,
            } => write!(f, "{day} {meal}: {item:?} contains restricted food {restricted:?}"),
        }
    }
}

/// Check a parsed plan against the targets and constraints it was built from.
///
/// Returns an empty vector when the plan satisfies every check.
pub fn audit_plan(
    plan: &WeeklyPlan,
    targets: &NutritionTargets,
    constraints: &FoodConstraints,
) -> Vec<AuditFinding> {
    let mut findings = Vec::new();

    if plan.week_plan.len() != EXPECTED_DAYS {
        findings.push(AuditFinding::WrongDayCount {
            expected: EXPECTED_DAYS,
            actual: plan.week_plan.len(),
        });
    }

    let restricted: Vec<(String, &str)> = constraints
        .restricted_foods
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .map(|r| (r.to_lowercase(), r))
        .collect();

    for day in &plan.week_plan {
        if !MEALS_PER_DAY.contains(&day.meals.len()) {
            findings.push(AuditFinding::MealCountOutOfRange {
                day: day.day.clone(),
                count: day.meals.len(),
            });
        }

        let declared = day.declared_totals();
        let computed = day.summed_totals();
        let pairs = [
            ("total_calories", declared.calories, computed.calories),
            ("total_protein_g", declared.protein_g, computed.protein_g),
            ("total_carbs_g", declared.carbs_g, computed.carbs_g),
            ("total_fats_g", declared.fats_g, computed.fats_g),
        ];
        for (field, declared, computed) in pairs {
            if (declared - computed).abs() > TOTALS_TOLERANCE {
                findings.push(AuditFinding::TotalsMismatch {
                    day: day.day.clone(),
                    field,
                    declared,
                    computed,
                });
            }
        }

        if (day.total_calories - targets.daily_calories).abs() > CALORIE_TOLERANCE {
            findings.push(AuditFinding::CaloriesOffTarget {
                day: day.day.clone(),
                declared: day.total_calories,
                target: targets.daily_calories,
            });
        }

        for meal in &day.meals {
            for item in &meal.foods {
                let lowered = item.to_lowercase();
                if let Some((_, original)) = restricted
                    .iter()
                    .find(|(term, _)| contains_word(&lowered, term))
                {
                    findings.push(AuditFinding::RestrictedFoodUsed {
                        day: day.day.clone(),
                        meal: meal.name.clone(),
                        item: item.clone(),
                        restricted: (*original).to_string(),
                    });
                }
            }
        }
    }

    findings
}

/// True when `needle` occurs in `haystack` bounded by non-alphanumeric
/// characters or the string edges.
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        // Advance past the first char of this match.
        from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyPlan, Meal};

    const DAYS: [&str; 7] = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];

    fn meal(name: &str, foods: &[&str]) -> Meal {
        Meal {
            name: name.to_string(),
            time: "08:00".to_string(),
            foods: foods.iter().map(|f| f.to_string()).collect(),
            calories: 500.0,
            protein_g: 40.0,
            carbs_g: 50.0,
            fats_g: 15.0,
        }
    }

    fn day(name: &str, meals: usize) -> DailyPlan {
        let meals: Vec<Meal> = (0..meals).map(|_| meal("Lunch", &["Lentils 150g"])).collect();
        let n = meals.len() as f64;
        DailyPlan {
            day: name.to_string(),
            meals,
            total_calories: 500.0 * n,
            total_protein_g: 40.0 * n,
            total_carbs_g: 50.0 * n,
            total_fats_g: 15.0 * n,
        }
    }

    fn week() -> WeeklyPlan {
        WeeklyPlan {
            week_plan: DAYS.iter().map(|d| day(d, 4)).collect(),
            summary: "A week".to_string(),
        }
    }

    fn targets(daily_calories: f64) -> NutritionTargets {
        NutritionTargets {
            bmr: 1800.0,
            daily_calories,
            protein_g: 160.0,
            carbs_g: 200.0,
            fats_g: 60.0,
            recommendations: String::new(),
        }
    }

    fn constraints(restricted: &[&str]) -> FoodConstraints {
        FoodConstraints {
            allowed_foods: vec!["Lentils".to_string()],
            restricted_foods: restricted.iter().map(|r| r.to_string()).collect(),
            recommendations: String::new(),
        }
    }

    #[test]
    fn compliant_plan_has_no_findings() {
        let findings = audit_plan(&week(), &targets(2000.0), &constraints(&["meat"]));
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[test]
    fn flags_wrong_day_count() {
        let mut plan = week();
        plan.week_plan.truncate(5);
        let findings = audit_plan(&plan, &targets(2000.0), &constraints(&[]));
        assert_eq!(
            findings,
            vec![AuditFinding::WrongDayCount {
                expected: 7,
                actual: 5
            }]
        );
    }

    #[test]
    fn flags_meal_count_out_of_range() {
        let mut plan = week();
        plan.week_plan[2] = day("Wednesday", 3);
        let findings = audit_plan(&plan, &targets(2000.0), &constraints(&[]));
        assert!(findings.contains(&AuditFinding::MealCountOutOfRange {
            day: "Wednesday".to_string(),
            count: 3
        }));
    }

    #[test]
    fn flags_totals_mismatch_beyond_tolerance() {
        let mut plan = week();
        plan.week_plan[0].total_protein_g += 0.5;
        plan.week_plan[1].total_fats_g += 5.0;
        let findings = audit_plan(&plan, &targets(2000.0), &constraints(&[]));
        assert_eq!(findings.len(), 1);
        assert!(matches!(
            &findings[0],
            AuditFinding::TotalsMismatch { day, field: "total_fats_g", .. } if day == "Tuesday"
        ));
    }

    #[test]
    fn flags_calories_off_target() {
        let findings = audit_plan(&week(), &targets(2100.0), &constraints(&[]));
        assert_eq!(findings.len(), 7);
        assert!(
            findings
                .iter()
                .all(|f| matches!(f, AuditFinding::CaloriesOffTarget { .. }))
        );
        assert!(audit_plan(&week(), &targets(2050.0), &constraints(&[])).is_empty());
    }

    #[test]
    fn flags_restricted_food_as_whole_word() {
        let mut plan = week();
        plan.week_plan[3].meals[1].foods = vec![
            "Meatless burger 1".to_string(),
            "Grilled chicken breast 150g".to_string(),
        ];
        let findings = audit_plan(
            &plan,
            &targets(2000.0),
            &constraints(&["meat", "Chicken"]),
        );
        assert_eq!(findings.len(), 1);
        let AuditFinding::RestrictedFoodUsed {
            day,
            item,
            restricted,
            ..
        } = &findings[0]
        else {
            panic!("unexpected finding {:?}", findings[0]);
        };
        assert_eq!(day, "Thursday");
        assert_eq!(item, "Grilled chicken breast 150g");
        assert_eq!(restricted, "Chicken");
    }

    #[test]
    fn word_matching() {
        assert!(contains_word("red meat 100g", "meat"));
        assert!(contains_word("meat", "meat"));
        assert!(contains_word("cow's milk 200ml", "milk"));
        assert!(!contains_word("buttermilk", "milk"));
        assert!(!contains_word("meatballs", "meat"));
        assert!(contains_word("sour cream, cream 10g", "cream"));
        assert!(!contains_word("anything", ""));
    }

    #[test]
    fn finding_messages_are_readable() {
        let finding = AuditFinding::CaloriesOffTarget {
            day: "Monday".to_string(),
            declared: 1500.0,
            target: 1666.0,
        };
        assert_eq!(
            finding.to_string(),
            "Monday has 1500 kcal, target is 1666 (+/-50)"
        );
    }
}
