use axum::{extract::State, response::Redirect, routing::post, Router};
use tracing::debug;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/tip", post(fetch_tip))
}

async fn fetch_tip(State(state): State<AppState>) -> Redirect {
    let Some(flight) = state.tip_flight.try_begin() else {
        debug!("tip request already in flight");
        return Redirect::to("/");
    };

    let log = state.trips.lock().await.log().clone();
    state.tip.write().await.clear();
    let tip = state.tips.tip_for(&log).await;
    *state.tip.write().await = tip;

    drop(flight);
    Redirect::to("/")
}
