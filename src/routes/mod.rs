pub mod dashboard;
pub mod format;
pub mod tip;
pub mod trips;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::services::ServeDir;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;
    Router::new()
        .merge(dashboard::router())
        .merge(trips::router())
        .merge(tip::router())
        .nest_service("/static", ServeDir::new("static"))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
