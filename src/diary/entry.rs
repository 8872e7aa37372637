//! One user's food diary for one calendar day.
//!
//! Totals are always derived from the line items: every mutation and every
//! load from storage recomputes them from scratch.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::{
    foods::FoodFact,
    recommend::{KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN},
};
use crate::profile::model::UnknownVariant;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl MealType {
    pub const ALL: [MealType; 4] = [Self::Breakfast, Self::Lunch, Self::Dinner, Self::Snacks];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snacks => "snacks",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snack" | "snacks" => Ok(Self::Snacks),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// A food added to a meal. Nutrient values are already scaled by `quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodLineItem {
    pub id: Uuid,
    pub food_name: String,
    pub quantity: f64,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub added_at: OffsetDateTime,
}

impl FoodLineItem {
    fn is_finite(&self) -> bool {
        [self.calories, self.protein_g, self.carbs_g, self.fat_g, self.fiber_g]
            .iter()
            .all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meals {
    pub breakfast: Vec<FoodLineItem>,
    pub lunch: Vec<FoodLineItem>,
    pub dinner: Vec<FoodLineItem>,
    pub snacks: Vec<FoodLineItem>,
}

impl Meals {
    pub fn bucket(&self, meal: MealType) -> &[FoodLineItem] {
        match meal {
            MealType::Breakfast => &self.breakfast,
            MealType::Lunch => &self.lunch,
            MealType::Dinner => &self.dinner,
            MealType::Snacks => &self.snacks,
        }
    }

    fn bucket_mut(&mut self, meal: MealType) -> &mut Vec<FoodLineItem> {
        match meal {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
            MealType::Snacks => &mut self.snacks,
        }
    }

    pub fn items(&self) -> impl Iterator<Item = &FoodLineItem> {
        MealType::ALL.into_iter().flat_map(|m| self.bucket(m).iter())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientTotals {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
}

impl NutrientTotals {
    fn add(&mut self, item: &FoodLineItem) {
        self.calories += item.calories;
        self.protein_g += item.protein_g;
        self.carbs_g += item.carbs_g;
        self.fat_g += item.fat_g;
        self.fiber_g += item.fiber_g;
    }

    fn is_finite(&self) -> bool {
        [self.calories, self.protein_g, self.carbs_g, self.fat_g, self.fiber_g]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Whole-number share of macro calories; sums to 100 unless all are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MacroPercentages {
    pub protein: i32,
    pub carbs: i32,
    pub fat: i32,
}

/// Largest serving multiplier accepted for one line item.
pub const MAX_QUANTITY: f64 = 1000.0;

#[derive(Debug, Error, PartialEq)]
pub enum EntryError {
    #[error("quantity must be a positive number up to {MAX_QUANTITY}, got {0}")]
    InvalidQuantity(f64),
    #[error("water intake must be a non-negative number, got {0}")]
    InvalidWater(f64),
    #[error("nutrient values out of range for {0}")]
    NutrientOverflow(String),
    #[error("Food item not found")]
    ItemNotFound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub meals: Meals,
    pub totals: NutrientTotals,
    pub water_intake_ml: f64,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl DailyEntry {
    pub fn new(user_id: Uuid, date: Date) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            meals: Meals::default(),
            totals: NutrientTotals::default(),
            water_intake_ml: 0.0,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild an entry read from storage; totals are derived, not trusted.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: Uuid,
        user_id: Uuid,
        date: Date,
        meals: Meals,
        water_intake_ml: f64,
        notes: Option<String>,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Self {
        let mut entry = Self {
            id,
            user_id,
            date,
            meals,
            totals: NutrientTotals::default(),
            water_intake_ml,
            notes,
            created_at,
            updated_at,
        };
        entry.recompute_totals();
        entry
    }

    pub fn add_food_to_meal(
        &mut self,
        meal: MealType,
        food: &FoodFact,
        quantity: f64,
    ) -> Result<FoodLineItem, EntryError> {
        if !quantity.is_finite() || quantity <= 0.0 || quantity > MAX_QUANTITY {
            return Err(EntryError::InvalidQuantity(quantity));
        }
        let item = FoodLineItem {
            id: Uuid::new_v4(),
            food_name: food.food_name.clone(),
            quantity,
            calories: food.calories * quantity,
            protein_g: food.protein_g * quantity,
            carbs_g: food.carbs_g * quantity,
            fat_g: food.fat_g * quantity,
            fiber_g: food.fiber_g * quantity,
            added_at: OffsetDateTime::now_utc(),
        };
        if !item.is_finite() {
            return Err(EntryError::NutrientOverflow(item.food_name));
        }

        self.meals.bucket_mut(meal).push(item.clone());
        self.recompute_totals();
        if !self.totals.is_finite() {
            self.meals.bucket_mut(meal).pop();
            self.recompute_totals();
            return Err(EntryError::NutrientOverflow(item.food_name));
        }
        self.updated_at = OffsetDateTime::now_utc();
        Ok(item)
    }

    /// `false` when no item with `item_id` exists in that meal.
    pub fn remove_food_from_meal(&mut self, meal: MealType, item_id: Uuid) -> bool {
        let bucket = self.meals.bucket_mut(meal);
        let Some(pos) = bucket.iter().position(|i| i.id == item_id) else {
            return false;
        };
        bucket.remove(pos);
        self.touch();
        true
    }

    pub fn update_details(
        &mut self,
        water_intake_ml: Option<f64>,
        notes: Option<String>,
    ) -> Result<(), EntryError> {
        if let Some(water) = water_intake_ml {
            if !water.is_finite() || water < 0.0 {
                return Err(EntryError::InvalidWater(water));
            }
            self.water_intake_ml = water;
        }
        if let Some(notes) = notes {
            let trimmed = notes.trim();
            self.notes = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        self.touch();
        Ok(())
    }

    pub fn recompute_totals(&mut self) {
        let mut totals = NutrientTotals::default();
        for item in self.meals.items() {
            totals.add(item);
        }
        self.totals = totals;
    }

    pub fn item_count(&self) -> usize {
        self.meals.items().count()
    }

    pub fn macro_percentages(&self) -> MacroPercentages {
        let kcal = [
            self.totals.protein_g * KCAL_PER_G_PROTEIN,
            self.totals.carbs_g * KCAL_PER_G_CARBS,
            self.totals.fat_g * KCAL_PER_G_FAT,
        ];
        let total: f64 = kcal.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return MacroPercentages::default();
        }

        let mut pct = kcal.map(|k| (k / total * 100.0).round() as i32);
        let residual = 100 - pct.iter().sum::<i32>();
        // first index holding the maximum absorbs the rounding residual
        let largest = (0..pct.len()).fold(0, |best, i| if pct[i] > pct[best] { i } else { best });
        pct[largest] += residual;

        MacroPercentages {
            protein: pct[0],
            carbs: pct[1],
            fat: pct[2],
        }
    }

    fn touch(&mut self) {
        self.recompute_totals();
        self.updated_at = OffsetDateTime::now_utc();
    }
}
