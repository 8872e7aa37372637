use serde::Deserialize;

use crate::nutrition::recommend::HealthFocus;
use crate::profile::model::{DietType, UserProfile};

pub const DEFAULT_LIST_LIMIT: i64 = 1;
pub const MAX_LIST_LIMIT: i64 = 50;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateRecommendationRequest {
    pub diet_type: Option<String>,
    pub health_focus: Option<String>,
}

impl CreateRecommendationRequest {
    /// Explicit diet type, else the profile's, else omnivore. Unknown names
    /// count as omnivore.
    pub fn diet_type(&self, profile: &UserProfile) -> DietType {
        match self.diet_type.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_lowercase().parse().unwrap_or_default(),
            _ => profile.diet_type.unwrap_or_default(),
        }
    }

    pub fn health_focus(&self) -> HealthFocus {
        self.health_focus
            .as_deref()
            .and_then(|f| f.trim().to_lowercase().parse().ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}
