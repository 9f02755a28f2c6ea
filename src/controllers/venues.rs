use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::error::BookingError;
use crate::forms::{FormFields, Submission, VenueForm};
use crate::models::Venue;
use crate::search::{SearchKind, SearchResults};
use crate::views::{current_time, Flash, VenueArea, VenueDetail};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/venues", get(list_venues).post(create_venue))
        .route("/venues/search", post(search_venues))
        .route("/venues/{id}", get(show_venue).delete(delete_venue))
        .route("/venues/{id}/edit", get(edit_venue).post(edit_venue_submission))
}

// GET /venues
async fn list_venues(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<VenueArea>>, BookingError> {
    let areas = state.directory.venue_areas(current_time()).await?;
    Ok(Json(areas))
}

// POST /venues/search
async fn search_venues(
    State(state): State<Arc<AppState>>,
    fields: FormFields,
) -> Result<Json<SearchResults>, BookingError> {
    let results = state
        .directory
        .search(SearchKind::Venue, fields.search_term())
        .await?;
    Ok(Json(results))
}

// GET /venues/{id}
async fn show_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<VenueDetail>, BookingError> {
    let detail = state.directory.venue_detail(id, current_time()).await?;
    Ok(Json(detail))
}

// POST /venues
async fn create_venue(
    State(state): State<Arc<AppState>>,
    fields: FormFields,
) -> Result<Json<Flash>, BookingError> {
    let form = VenueForm::from_fields(&fields, Submission::Create)?;
    Ok(Json(state.directory.create_venue(&form).await))
}

// DELETE /venues/{id}
async fn delete_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Flash>, BookingError> {
    let flash = state.directory.delete_venue(id).await?;
    Ok(Json(flash))
}

// GET /venues/{id}/edit
async fn edit_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Venue>, BookingError> {
    let venue = state.directory.venue(id).await?;
    Ok(Json(venue))
}

// POST /venues/{id}/edit
async fn edit_venue_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    fields: FormFields,
) -> Result<Json<Flash>, BookingError> {
    let form = VenueForm::from_fields(&fields, Submission::Edit)?;
    let flash = state.directory.update_venue(id, &form).await?;
    Ok(Json(flash))
}
