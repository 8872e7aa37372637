use crate::errors::{AppError, AppResult};
use crate::profile::model::UserProfile;

const NAME_MAX: usize = 100;
const HEALTH_GOALS_MAX: usize = 200;
const ALLERGIES_MAX: usize = 300;
const AGE_RANGE: std::ops::RangeInclusive<u32> = 1..=120;
const WEIGHT_KG_MAX: f64 = 700.0;
const HEIGHT_CM_MAX: f64 = 300.0;

/// Trims free-text fields (blank becomes missing) and checks bounds.
pub fn normalize_profile(mut profile: UserProfile) -> AppResult<UserProfile> {
    profile.name = bounded_text("name", profile.name, NAME_MAX)?;
    profile.health_goals = bounded_text("health_goals", profile.health_goals, HEALTH_GOALS_MAX)?;
    profile.allergies = bounded_text("allergies", profile.allergies, ALLERGIES_MAX)?;

    if let Some(age) = profile.age {
        if !AGE_RANGE.contains(&age) {
            return Err(AppError::bad_request("age must be between 1 and 120"));
        }
    }
    bounded_metric("weight_kg", profile.weight_kg, WEIGHT_KG_MAX)?;
    bounded_metric("height_cm", profile.height_cm, HEIGHT_CM_MAX)?;
    Ok(profile)
}

fn bounded_text(field: &str, value: Option<String>, max: usize) -> AppResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.chars().count() > max {
        return Err(AppError::bad_request(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

fn bounded_metric(field: &str, value: Option<f64>, max: f64) -> AppResult<()> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 || v > max => Err(AppError::bad_request(format!(
            "{field} must be a positive number up to {max}"
        ))),
        _ => Ok(()),
    }
}
