//! Resting and total daily energy expenditure.
//!
//! BMR uses the Mifflin-St Jeor equation:
//! `10 * weight_kg + 6.25 * height_cm - 5 * age + s`, where `s` is +5 for men
//! and -161 otherwise.

use serde::Serialize;

use crate::profile::model::{Gender, UserProfile};

/// BMR used when the profile lacks weight, height, age or gender.
pub const DEFAULT_BMR: f64 = 1800.0;

/// Multiplier used when the activity level is missing.
pub const DEFAULT_ACTIVITY_MULTIPLIER: f64 = 1.375;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergySummary {
    pub bmr: f64,
    pub tdee: f64,
    pub activity_multiplier: f64,
    /// `false` when BMR fell back to [`DEFAULT_BMR`].
    pub from_profile: bool,
}

pub fn calculate_bmr(profile: &UserProfile) -> f64 {
    let (Some(weight), Some(height), Some(age), Some(gender)) = (
        positive(profile.weight_kg),
        positive(profile.height_cm),
        profile.age.filter(|a| *a > 0),
        profile.gender,
    ) else {
        return DEFAULT_BMR;
    };

    let base = 10.0 * weight + 6.25 * height - 5.0 * f64::from(age);
    match gender {
        Gender::Male => base + 5.0,
        _ => base - 161.0,
    }
}

pub fn activity_multiplier(profile: &UserProfile) -> f64 {
    profile
        .activity_level
        .map_or(DEFAULT_ACTIVITY_MULTIPLIER, |a| a.multiplier())
}

pub fn calculate_tdee(profile: &UserProfile) -> f64 {
    calculate_bmr(profile) * activity_multiplier(profile)
}

pub fn summarize(profile: &UserProfile) -> EnergySummary {
    let bmr = calculate_bmr(profile);
    let activity_multiplier = activity_multiplier(profile);
    EnergySummary {
        bmr,
        tdee: bmr * activity_multiplier,
        activity_multiplier,
        from_profile: has_body_metrics(profile),
    }
}

fn has_body_metrics(profile: &UserProfile) -> bool {
    positive(profile.weight_kg).is_some()
        && positive(profile.height_cm).is_some()
        && profile.age.is_some_and(|a| a > 0)
        && profile.gender.is_some()
}

// Zero or negative metrics count as missing.
fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x > 0.0)
}
