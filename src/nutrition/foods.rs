//! Nutrition facts for free-text food names.
//!
//! Lookup tiers: exact key, ranked substring match, optional external source,
//! then a generic approximate record. Lookup never fails.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::nutritionix::NutritionSource;

pub const APPROXIMATE_NOTE: &str = "Approximate values - for educational purposes only";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodFact {
    pub food_name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl FoodFact {
    /// Generic record for foods nobody knows about.
    pub fn approximate(query: &str) -> Self {
        Self {
            food_name: capitalize(query.trim()),
            calories: 120.0,
            protein_g: 4.0,
            carbs_g: 18.0,
            fat_g: 3.0,
            fiber_g: 2.0,
            note: Some(APPROXIMATE_NOTE.to_string()),
        }
    }

    pub fn is_approximate(&self) -> bool {
        self.note.is_some()
    }
}

/// One row of the static reference table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TableFood {
    pub key: &'static str,
    pub food_name: &'static str,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
}

impl From<&TableFood> for FoodFact {
    fn from(f: &TableFood) -> Self {
        Self {
            food_name: f.food_name.to_string(),
            calories: f.calories,
            protein_g: f.protein_g,
            carbs_g: f.carbs_g,
            fat_g: f.fat_g,
            fiber_g: f.fiber_g,
            note: None,
        }
    }
}

macro_rules! food {
    ($key:literal, $name:literal, $cal:literal, $p:literal, $c:literal, $f:literal, $fib:literal) => {
        TableFood {
            key: $key,
            food_name: $name,
            calories: $cal,
            protein_g: $p,
            carbs_g: $c,
            fat_g: $f,
            fiber_g: $fib,
        }
    };
}

/// Common foods, one typical serving each.
pub static FOOD_TABLE: &[TableFood] = &[
    // fruits
    food!("apple", "Apple (1 medium)", 95.0, 0.5, 25.1, 0.3, 4.4),
    food!("banana", "Banana (1 medium)", 105.0, 1.3, 27.0, 0.4, 3.1),
    food!("orange", "Orange (1 medium)", 62.0, 1.2, 15.4, 0.2, 3.1),
    food!("strawberry", "Strawberries (1 cup)", 49.0, 1.0, 11.7, 0.5, 3.0),
    food!("blueberry", "Blueberries (1 cup)", 84.0, 1.1, 21.5, 0.5, 3.6),
    food!("grape", "Grapes (1 cup)", 104.0, 1.1, 27.3, 0.2, 1.4),
    food!("watermelon", "Watermelon (1 cup, diced)", 46.0, 0.9, 11.5, 0.2, 0.6),
    food!("pineapple", "Pineapple (1 cup, chunks)", 82.0, 0.9, 21.6, 0.2, 2.3),
    food!("mango", "Mango (1 cup, sliced)", 99.0, 1.4, 24.7, 0.6, 2.6),
    food!("avocado", "Avocado (1/2 fruit)", 160.0, 2.0, 8.5, 14.7, 6.7),
    // vegetables
    food!("broccoli", "Broccoli (1 cup, chopped)", 55.0, 3.7, 11.2, 0.6, 5.1),
    food!("spinach", "Spinach (1 cup, raw)", 7.0, 0.9, 1.1, 0.1, 0.7),
    food!("kale", "Kale (1 cup, chopped)", 33.0, 2.9, 6.7, 0.5, 1.3),
    food!("carrot", "Carrot (1 medium)", 25.0, 0.6, 5.8, 0.1, 1.7),
    food!("bell pepper", "Bell Pepper (1 medium)", 30.0, 1.0, 7.0, 0.2, 2.5),
    food!("onion", "Onion (1 medium)", 44.0, 1.2, 10.3, 0.1, 1.9),
    food!("tomato", "Tomato (1 medium)", 22.0, 1.1, 4.8, 0.2, 1.5),
    food!("potato", "Potato (1 medium, baked)", 161.0, 4.3, 36.6, 0.2, 3.8),
    food!("sweet potato", "Sweet Potato (1 medium, baked)", 103.0, 2.3, 23.6, 0.2, 3.8),
    food!("cucumber", "Cucumber (1/2 cup, sliced)", 8.0, 0.3, 1.9, 0.1, 0.3),
    // protein
    food!("chicken breast", "Chicken Breast (3 oz, cooked)", 165.0, 31.0, 0.0, 3.6, 0.0),
    food!("chicken thigh", "Chicken Thigh (3 oz, cooked)", 209.0, 24.7, 0.0, 11.2, 0.0),
    food!("beef", "Beef (3 oz, lean, cooked)", 213.0, 26.0, 0.0, 11.8, 0.0),
    food!("ground beef", "Ground Beef (3 oz, 85% lean, cooked)", 218.0, 24.0, 0.0, 13.0, 0.0),
    food!("pork", "Pork Chop (3 oz, cooked)", 198.0, 26.0, 0.0, 9.9, 0.0),
    food!("salmon", "Salmon (3 oz, cooked)", 175.0, 18.8, 0.0, 10.5, 0.0),
    food!("tuna", "Tuna (3 oz, canned in water)", 73.0, 16.5, 0.0, 0.8, 0.0),
    food!("shrimp", "Shrimp (3 oz, cooked)", 84.0, 18.0, 0.0, 0.9, 0.0),
    food!("tofu", "Tofu (1/2 cup)", 94.0, 10.0, 2.3, 5.9, 0.5),
    food!("tempeh", "Tempeh (3 oz)", 160.0, 15.0, 7.0, 9.0, 4.8),
    food!("lentils", "Lentils (1/2 cup, cooked)", 115.0, 9.0, 20.0, 0.4, 7.8),
    food!("chickpeas", "Chickpeas (1/2 cup, cooked)", 134.0, 7.0, 22.5, 2.1, 6.2),
    food!("black beans", "Black Beans (1/2 cup, cooked)", 114.0, 7.6, 20.4, 0.5, 7.5),
    // dairy and eggs
    food!("egg", "Egg (1 large)", 72.0, 6.3, 0.4, 5.0, 0.0),
    food!("milk", "Milk (1 cup, whole)", 149.0, 7.7, 11.7, 8.0, 0.0),
    food!("skim milk", "Skim Milk (1 cup)", 83.0, 8.3, 12.2, 0.2, 0.0),
    food!("yogurt", "Greek Yogurt (1 cup, plain)", 130.0, 22.0, 9.0, 0.0, 0.0),
    food!("cheese", "Cheddar Cheese (1 oz)", 113.0, 7.0, 0.4, 9.3, 0.0),
    food!("cottage cheese", "Cottage Cheese (1/2 cup)", 110.0, 12.5, 3.5, 4.5, 0.0),
    // grains
    food!("rice", "White Rice (1/2 cup, cooked)", 121.0, 2.5, 26.5, 0.3, 0.3),
    food!("brown rice", "Brown Rice (1/2 cup, cooked)", 109.0, 2.3, 22.9, 0.9, 1.8),
    food!("quinoa", "Quinoa (1/2 cup, cooked)", 111.0, 4.1, 19.7, 1.8, 2.6),
    food!("bread", "White Bread (1 slice)", 75.0, 2.6, 13.8, 1.0, 0.8),
    food!("whole wheat bread", "Whole Wheat Bread (1 slice)", 81.0, 4.0, 15.0, 1.1, 2.0),
    food!("pasta", "Pasta (1 cup, cooked)", 221.0, 8.1, 43.2, 1.3, 2.5),
    food!("whole wheat pasta", "Whole Wheat Pasta (1 cup, cooked)", 174.0, 7.5, 37.2, 0.8, 6.3),
    food!("oats", "Oatmeal (1/2 cup, dry)", 150.0, 5.0, 27.0, 3.0, 4.0),
    // nuts and seeds
    food!("almonds", "Almonds (1 oz, 23 nuts)", 164.0, 6.0, 6.1, 14.0, 3.5),
    food!("walnuts", "Walnuts (1 oz, 14 halves)", 185.0, 4.3, 3.9, 18.5, 1.9),
    food!("peanut butter", "Peanut Butter (2 tbsp)", 188.0, 8.0, 6.9, 16.0, 1.9),
    food!("chia seeds", "Chia Seeds (1 tbsp)", 58.0, 2.0, 5.0, 3.0, 4.0),
    food!("flax seeds", "Flax Seeds (1 tbsp)", 55.0, 1.9, 3.0, 4.3, 2.8),
    // oils and fats
    food!("olive oil", "Olive Oil (1 tbsp)", 119.0, 0.0, 0.0, 13.5, 0.0),
    food!("coconut oil", "Coconut Oil (1 tbsp)", 121.0, 0.0, 0.0, 13.6, 0.0),
    food!("butter", "Butter (1 tbsp)", 102.0, 0.1, 0.0, 11.5, 0.0),
];

/// Table tiers only: exact key, then ranked substring match.
///
/// Substring ranking: keys contained in the query beat keys containing the
/// query. Among the former the longest key wins ("brown rice bowl" picks
/// "brown rice", not "rice"); among the latter the shortest wins. Remaining
/// ties go to the alphabetically first key.
pub fn match_table(query: &str) -> Option<&'static TableFood> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return None;
    }
    if let Some(exact) = FOOD_TABLE.iter().find(|f| f.key == q) {
        return Some(exact);
    }

    let within_query = FOOD_TABLE
        .iter()
        .filter(|f| q.contains(f.key))
        .min_by(|a, b| b.key.len().cmp(&a.key.len()).then(a.key.cmp(b.key)));
    if within_query.is_some() {
        return within_query;
    }

    FOOD_TABLE
        .iter()
        .filter(|f| f.key.contains(q.as_str()))
        .min_by(|a, b| a.key.len().cmp(&b.key.len()).then(a.key.cmp(b.key)))
}

/// Full lookup chain, with an optional external source between the table
/// and the approximate fallback.
#[derive(Clone, Default)]
pub struct FoodLookup {
    external: Option<Arc<dyn NutritionSource>>,
}

impl FoodLookup {
    pub fn new(external: Option<Arc<dyn NutritionSource>>) -> Self {
        Self { external }
    }

    pub async fn lookup(&self, query: &str) -> FoodFact {
        if let Some(found) = match_table(query) {
            debug!(query, matched = found.key, "food table hit");
            return found.into();
        }

        if let (Some(source), false) = (&self.external, query.trim().is_empty()) {
            match source.fetch(query.trim()).await {
                Ok(Some(fact)) => {
                    info!(query, food = %fact.food_name, "external nutrition hit");
                    return fact;
                }
                Ok(None) => debug!(query, "external nutrition source had no match"),
                Err(e) => warn!(error = %e, query, "external nutrition lookup failed"),
            }
        }

        info!(query, "returning approximate nutrition data");
        FoodFact::approximate(query)
    }
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
