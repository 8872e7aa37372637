use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod entry;
pub mod handlers;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
