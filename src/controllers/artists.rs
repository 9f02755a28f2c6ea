use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::error::BookingError;
use crate::forms::{ArtistForm, FormFields, Submission};
use crate::models::Artist;
use crate::search::{SearchKind, SearchResults};
use crate::views::{current_time, ArtistDetail, ArtistListItem, Flash};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/artists", get(list_artists).post(create_artist))
        .route("/artists/search", post(search_artists))
        .route("/artists/{id}", get(show_artist).delete(delete_artist))
        .route("/artists/{id}/edit", get(edit_artist).post(edit_artist_submission))
}

// GET /artists
async fn list_artists(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ArtistListItem>>, BookingError> {
    Ok(Json(state.directory.artist_listing().await?))
}

// POST /artists/search
async fn search_artists(
    State(state): State<Arc<AppState>>,
    fields: FormFields,
) -> Result<Json<SearchResults>, BookingError> {
    let results = state
        .directory
        .search(SearchKind::Artist, fields.search_term())
        .await?;
    Ok(Json(results))
}

// GET /artists/{id}
async fn show_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ArtistDetail>, BookingError> {
    let detail = state.directory.artist_detail(id, current_time()).await?;
    Ok(Json(detail))
}

// POST /artists
async fn create_artist(
    State(state): State<Arc<AppState>>,
    fields: FormFields,
) -> Result<Json<Flash>, BookingError> {
    let form = ArtistForm::from_fields(&fields, Submission::Create)?;
    Ok(Json(state.directory.create_artist(&form).await))
}

// DELETE /artists/{id}
async fn delete_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Flash>, BookingError> {
    Ok(Json(state.directory.delete_artist(id).await?))
}

// GET /artists/{id}/edit
async fn edit_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Artist>, BookingError> {
    Ok(Json(state.directory.artist(id).await?))
}

// POST /artists/{id}/edit
async fn edit_artist_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    fields: FormFields,
) -> Result<Json<Flash>, BookingError> {
    let form = ArtistForm::from_fields(&fields, Submission::Edit)?;
    let flash = state.directory.update_artist(id, &form).await?;
    Ok(Json(flash))
}
