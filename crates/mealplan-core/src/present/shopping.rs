//! Shopping list aggregation.

use crate::models::WeeklyPlan;

/// One shopping list line: a product name and how many meals use it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingItem {
    pub product: String,
    pub count: usize,
}

/// Group every food item in the plan by its first word and count uses.
///
/// Sorted by count, descending. Products with equal counts keep the order
/// in which they first appear in the plan. Blank items are skipped.
pub fn build_shopping_list(plan: &WeeklyPlan) -> Vec<ShoppingItem> {
    let mut items: Vec<ShoppingItem> = Vec::new();

    for food in plan.food_items() {
        let Some(product) = food.split_whitespace().next() else {
            continue;
        };
        match items.iter_mut().find(|item| item.product == product) {
            Some(item) => item.count += 1,
            None => items.push(ShoppingItem {
                product: product.to_string(),
                count: 1,
            }),
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    items.sort_by(|a, b| b.count.cmp(&a.count));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyPlan, Meal};

    fn plan(meals: &[&[&str]]) -> WeeklyPlan {
        let meals = meals
            .iter()
            .map(|foods| Meal {
                name: "Lunch".to_string(),
                time: "14:00".to_string(),
                foods: foods.iter().map(|f| f.to_string()).collect(),
                calories: 0.0,
                protein_g: 0.0,
                carbs_g: 0.0,
                fats_g: 0.0,
            })
            .collect();
        WeeklyPlan {
            week_plan: vec![DailyPlan {
                day: "Monday".to_string(),
                meals,
                total_calories: 0.0,
                total_protein_g: 0.0,
                total_carbs_g: 0.0,
                total_fats_g: 0.0,
            }],
            summary: String::new(),
        }
    }

    #[test]
    fn groups_by_first_word_and_sorts_by_count() {
        let list = build_shopping_list(&plan(&[
            &["Tofu 150g", "Rice 100g"],
            &["Rice 80g", "Spinach 50g"],
            &["Tofu 100g", "Rice 100g"],
        ]));
        let pairs: Vec<(&str, usize)> = list.iter().map(|i| (i.product.as_str(), i.count)).collect();
        assert_eq!(pairs, vec![("Rice", 3), ("Tofu", 2), ("Spinach", 1)]);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let list = build_shopping_list(&plan(&[&["Oats 50g", "Banana 1", "Almonds 20g"]]));
        let names: Vec<&str> = list.iter().map(|i| i.product.as_str()).collect();
        assert_eq!(names, vec!["Oats", "Banana", "Almonds"]);
    }

    #[test]
    fn blank_items_are_skipped() {
        let list = build_shopping_list(&plan(&[&["", "   ", "Lentils 100g"]]));
        assert_eq!(
            list,
            vec![ShoppingItem {
                product: "Lentils".to_string(),
                count: 1
            }]
        );
    }

    #[test]
    fn first_word_is_case_sensitive() {
        let list = build_shopping_list(&plan(&[&["rice 100g", "Rice 100g"]]));
        assert_eq!(list.len(), 2);
    }
}
