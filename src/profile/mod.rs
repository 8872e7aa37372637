use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod model;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
