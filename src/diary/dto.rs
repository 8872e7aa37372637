use serde::{Deserialize, Serialize};

use super::entry::{DailyEntry, FoodLineItem, MacroPercentages, NutrientTotals};
use crate::nutrition::foods::FoodFact;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddFoodRequest {
    /// Free-text name resolved through the food lookup.
    pub query: Option<String>,
    /// Explicit nutrition facts; wins over `query`.
    pub food: Option<FoodFact>,
    pub quantity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateEntryRequest {
    #[serde(alias = "water_intake_ml")]
    pub water_intake: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddFoodResponse {
    pub item: FoodLineItem,
    pub entry: DailyEntry,
}

#[derive(Debug, Serialize)]
pub struct MacrosResponse {
    pub date: String,
    pub percentages: MacroPercentages,
    pub totals: NutrientTotals,
}

impl From<&DailyEntry> for MacrosResponse {
    fn from(e: &DailyEntry) -> Self {
        Self {
            date: e.date.to_string(),
            percentages: e.macro_percentages(),
            totals: e.totals,
        }
    }
}
