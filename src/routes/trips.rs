use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::post,
    Form, Router,
};
use tracing::{debug, warn};

use crate::{
    error::AppError,
    routes::dashboard::{self, FormView},
    state::AppState,
    validation::TripForm,
};

const NOT_AN_IMAGE: &str = "Please upload a valid image file.";
const UNREADABLE_PUMP: &str = "Could not read gallons from the image. Please enter it manually.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips", post(add_trip))
        .route("/trips/scan", post(scan_pump))
        .route("/trips/:id/delete", post(delete_trip))
}

async fn add_trip(
    State(state): State<AppState>,
    Form(form): Form<TripForm>,
) -> Result<Response, AppError> {
    let candidate = match form.parse() {
        Ok(candidate) => candidate,
        Err(err) => {
            let view = FormView::with_error(form, err.to_string());
            return Ok(dashboard::render(&state, view).await);
        }
    };

    let added = state.trips.lock().await.add_trip(candidate).await;
    match added {
        Ok(_) => {
            state.scan_flight.supersede();
            Ok(Redirect::to("/").into_response())
        }
        Err(AppError::Validation(err)) => {
            Ok(dashboard::render(&state, FormView::with_error(form, err.to_string())).await)
        }
        Err(err) => Err(err),
    }
}

async fn delete_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    if !state.trips.lock().await.delete_trip(&id).await? {
        debug!(%id, "delete requested for unknown trip");
    }
    Ok(Redirect::to("/"))
}

struct Photo {
    mime_type: String,
    data: Vec<u8>,
}

async fn read_scan_form(
    multipart: &mut Multipart,
    values: &mut TripForm,
) -> Result<Option<Photo>, AppError> {
    let mut photo = None;
    while let Some(field) = multipart.next_field().await.map_err(|err| {
        warn!("upload could not be read: {err}");
        AppError::FileRead
    })? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "photo" {
            let mime_type = field.content_type().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(|err| {
                warn!("photo could not be read: {err}");
                AppError::FileRead
            })?;
            if !data.is_empty() {
                photo = Some(Photo {
                    mime_type,
                    data: data.to_vec(),
                });
            }
            continue;
        }
        let text = field.text().await.map_err(|err| {
            warn!(field = %name, "form field could not be read: {err}");
            AppError::FileRead
        })?;
        match name.as_str() {
            "startOdometer" => values.start_odometer = text,
            "endOdometer" => values.end_odometer = text,
            "gallons" => values.gallons = text,
            _ => {}
        }
    }
    Ok(photo)
}

async fn scan_pump(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut form = FormView::default();
    let photo = match read_scan_form(&mut multipart, &mut form.values).await {
        Ok(photo) => photo,
        Err(err) => {
            form.analysis_message = Some(err.to_string());
            return dashboard::render(&state, form).await;
        }
    };

    let Some(photo) = photo else {
        return dashboard::render(&state, form).await;
    };
    if !photo.mime_type.starts_with("image/") {
        form.analysis_message = Some(NOT_AN_IMAGE.to_string());
        return dashboard::render(&state, form).await;
    }

    let Some(flight) = state.scan_flight.try_begin() else {
        debug!("pump scan already running, ignoring upload");
        return dashboard::render(&state, form).await;
    };
    let token = flight.token();
    let result = state.pump.extract_gallons(photo.data, &photo.mime_type).await;
    drop(flight);

    if !state.scan_flight.is_current(token) {
        debug!("discarding pump scan result superseded by a newer action");
        return dashboard::render(&state, form).await;
    }

    match result {
        Ok(Some(gallons)) => form.values.gallons = gallons.to_string(),
        Ok(None) => form.analysis_message = Some(UNREADABLE_PUMP.to_string()),
        Err(err) => form.analysis_message = Some(err.to_string()),
    }
    dashboard::render(&state, form).await
}
