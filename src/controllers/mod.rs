pub mod artists;
pub mod shows;
pub mod venues;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(venues::routes())
        .merge(artists::routes())
        .merge(shows::routes())
}
