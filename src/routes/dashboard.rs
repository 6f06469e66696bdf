use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{extract::State, response::Response, routing::get, Router};

use crate::{
    models::chart::{MpgChart, HEIGHT, WIDTH},
    routes::format::{format_miles, format_mpg},
    state::AppState,
    validation::TripForm,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

/// What the trip form shows after a round trip through the server.
#[derive(Debug, Clone, Default)]
pub struct FormView {
    pub values: TripForm,
    pub error: Option<String>,
    pub analysis_message: Option<String>,
}

impl FormView {
    pub fn with_error(values: TripForm, error: impl Into<String>) -> Self {
        Self {
            values,
            error: Some(error.into()),
            analysis_message: None,
        }
    }
}

#[derive(Clone)]
struct TripRow {
    id: String,
    date: String,
    miles: String,
    gallons: String,
    mpg: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    average_mpg: String,
    best_mpg: String,
    last_mpg: String,
    total_miles: String,
    start_odometer: String,
    end_odometer: String,
    gallons: String,
    has_error: bool,
    error_message: String,
    has_analysis_message: bool,
    analysis_message: String,
    scanning: bool,
    tip: String,
    has_tip: bool,
    fetching_tip: bool,
    chart: Option<MpgChart>,
    chart_width: f64,
    chart_height: f64,
    trips: Vec<TripRow>,
}

async fn dashboard(State(state): State<AppState>) -> Response {
    render(&state, FormView::default()).await
}

pub async fn render(state: &AppState, form: FormView) -> Response {
    let (stats, rows, chart) = {
        let repo = state.trips.lock().await;
        let rows = repo
            .trips()
            .iter()
            .map(|trip| TripRow {
                id: trip.id.clone(),
                date: trip.date.clone(),
                miles: format_miles(trip.miles()),
                gallons: format!("{:.2}", trip.gallons),
                mpg: format!("{:.2}", trip.mpg),
            })
            .collect::<Vec<_>>();
        (repo.stats(), rows, MpgChart::from_trips(repo.trips()))
    };
    let tip = state.tip.read().await.clone();

    AskamaTemplateResponse::into_response(DashboardTemplate {
        average_mpg: format_mpg(stats.average_mpg),
        best_mpg: format_mpg(stats.best_mpg),
        last_mpg: format_mpg(stats.last_mpg),
        total_miles: format_miles(stats.total_miles),
        start_odometer: form.values.start_odometer,
        end_odometer: form.values.end_odometer,
        gallons: form.values.gallons,
        has_error: form.error.is_some(),
        error_message: form.error.unwrap_or_default(),
        has_analysis_message: form.analysis_message.is_some(),
        analysis_message: form.analysis_message.unwrap_or_default(),
        scanning: state.scan_flight.is_busy(),
        has_tip: !tip.is_empty(),
        tip,
        fetching_tip: state.tip_flight.is_busy(),
        chart,
        chart_width: WIDTH,
        chart_height: HEIGHT,
        trips: rows,
    })
}
