use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

use crate::error::BookingError;
use crate::forms::{FormFields, ShowForm};
use crate::views::{Flash, ShowEntry};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/shows", get(list_shows).post(create_show))
}

// GET /shows
async fn list_shows(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ShowEntry>>, BookingError> {
    Ok(Json(state.directory.show_listing().await?))
}

// POST /shows
async fn create_show(
    State(state): State<Arc<AppState>>,
    fields: FormFields,
) -> Result<Json<Flash>, BookingError> {
    let form = ShowForm::from_fields(&fields)?;
    Ok(Json(state.directory.create_show(&form).await))
}
