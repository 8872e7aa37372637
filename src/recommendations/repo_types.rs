use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::recommend::{HealthFocus, RecommendationDraft};
use crate::profile::model::DietType;

/// A generated meal plan. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub diet_type: DietType,
    pub health_focus: HealthFocus,
    pub daily_calories: i32,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fats_g: f64,
    pub breakfast_suggestion: String,
    pub lunch_suggestion: String,
    pub dinner_suggestion: String,
    pub snacks_suggestion: String,
    pub additional_notes: String,
}

impl Recommendation {
    pub fn from_draft(user_id: Uuid, draft: RecommendationDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            created_at: OffsetDateTime::now_utc(),
            diet_type: draft.diet_type,
            health_focus: draft.health_focus,
            daily_calories: draft.daily_calories,
            protein_g: draft.protein_g,
            carbs_g: draft.carbs_g,
            fats_g: draft.fats_g,
            breakfast_suggestion: draft.breakfast_suggestion,
            lunch_suggestion: draft.lunch_suggestion,
            dinner_suggestion: draft.dinner_suggestion,
            snacks_suggestion: draft.snacks_suggestion,
            additional_notes: draft.additional_notes,
        }
    }
}
