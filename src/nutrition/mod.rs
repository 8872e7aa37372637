use crate::state::AppState;
use axum::Router;

pub mod energy;
pub mod foods;
pub mod handlers;
pub mod nutritionix;
pub mod recommend;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
