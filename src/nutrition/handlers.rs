use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    auth::services::AuthUser,
    errors::{AppError, AppResult},
    nutrition::foods::{FoodFact, TableFood, FOOD_TABLE},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(list_foods))
        .route("/foods/nutrition", get(food_nutrition))
}

#[derive(Debug, Deserialize)]
pub struct FoodQuery {
    #[serde(default)]
    pub query: String,
}

#[instrument(skip(state, _user))]
pub async fn food_nutrition(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(q): Query<FoodQuery>,
) -> AppResult<Json<FoodFact>> {
    let query = q.query.trim();
    if query.is_empty() {
        return Err(AppError::bad_request("No food query provided"));
    }
    Ok(Json(state.foods.lookup(query).await))
}

pub async fn list_foods(_user: AuthUser) -> Json<&'static [TableFood]> {
    Json(FOOD_TABLE)
}
