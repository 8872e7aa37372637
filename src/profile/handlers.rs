use axum::{extract::State, routing::get, Json, Router};
use tracing::{info, instrument};

use crate::{
    auth::services::AuthUser,
    errors::{AppError, AppResult},
    nutrition::energy::{summarize, EnergySummary},
    profile::{model::UserProfile, services::normalize_profile},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/profile/energy", get(get_energy))
}

async fn load_profile(state: &AppState, user_id: uuid::Uuid) -> AppResult<UserProfile> {
    let user = state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;
    Ok(user.profile)
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(load_profile(&state, user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UserProfile>,
) -> AppResult<Json<UserProfile>> {
    let profile = normalize_profile(payload)?;
    let user = state
        .store
        .update_profile(user_id, &profile)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;
    info!(user_id = %user_id, "profile updated");
    Ok(Json(user.profile))
}

#[instrument(skip(state))]
pub async fn get_energy(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<EnergySummary>> {
    let profile = load_profile(&state, user_id).await?;
    Ok(Json(summarize(&profile)))
}
