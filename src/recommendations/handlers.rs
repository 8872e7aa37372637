use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    errors::{AppError, AppResult},
    nutrition::recommend::generate,
    recommendations::{
        dto::{CreateRecommendationRequest, ListQuery},
        repo_types::Recommendation,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/recommendations",
            get(list_recommendations).post(create_recommendation),
        )
        .route("/recommendations/:id", get(get_recommendation))
}

/// A blank body means all defaults; anything else must be a valid request.
fn parse_create_request(body: &[u8]) -> AppResult<CreateRecommendationRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateRecommendationRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "malformed recommendation request");
        AppError::bad_request(format!("Invalid request body: {e}"))
    })
}

#[instrument(skip(state, body))]
pub async fn create_recommendation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Bytes,
) -> AppResult<(StatusCode, Json<Recommendation>)> {
    let payload = parse_create_request(&body)?;
    let user = state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;

    let diet = payload.diet_type(&user.profile);
    let focus = payload.health_focus();
    let draft = generate(&user.profile, diet, focus, &mut rand::thread_rng());
    let rec = Recommendation::from_draft(user_id, draft);

    state.store.create_recommendation(&rec).await?;
    info!(
        user_id = %user_id,
        recommendation_id = %rec.id,
        diet = %diet,
        calories = rec.daily_calories,
        "recommendation generated"
    );
    Ok((StatusCode::CREATED, Json(rec)))
}

#[instrument(skip(state))]
pub async fn list_recommendations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let recs = state
        .store
        .list_recommendations(user_id, q.limit())
        .await?;
    Ok(Json(recs))
}

#[instrument(skip(state))]
pub async fn get_recommendation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Recommendation>> {
    match state.store.find_recommendation(id).await? {
        Some(rec) if rec.user_id == user_id => Ok(Json(rec)),
        _ => {
            warn!(user_id = %user_id, %id, "recommendation not found");
            Err(AppError::not_found("Recommendation not found"))
        }
    }
}
