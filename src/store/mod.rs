//! Persistence for venues, artists and shows.
//!
//! Every mutating call runs as one transaction: it either commits whole or
//! leaves the stored rows exactly as they were.

pub mod memory;
pub mod postgres;

pub use memory::MemoryBookingStore;
pub use postgres::PgBookingStore;

use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::Database;
use crate::error::BookingError;
use crate::forms::{ArtistForm, ShowForm, VenueForm};
use crate::models::{Artist, Show, ShowListing, Venue};
use crate::views::SearchSummary;

#[async_trait]
pub trait BookingStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn list_venues(&self) -> Result<Vec<Venue>, BookingError>;
    async fn find_venue(&self, id: i32) -> Result<Option<Venue>, BookingError>;
    async fn insert_venue(&self, form: &VenueForm) -> Result<Venue, BookingError>;
    /// Full overwrite of the editable fields. `NotFound` if `id` is absent.
    async fn update_venue(&self, id: i32, form: &VenueForm) -> Result<Venue, BookingError>;
    /// Removes the venue and its shows; returns how many shows went with it.
    async fn delete_venue(&self, id: i32) -> Result<u64, BookingError>;

    async fn list_artists(&self) -> Result<Vec<Artist>, BookingError>;
    async fn find_artist(&self, id: i32) -> Result<Option<Artist>, BookingError>;
    async fn insert_artist(&self, form: &ArtistForm) -> Result<Artist, BookingError>;
    async fn update_artist(&self, id: i32, form: &ArtistForm) -> Result<Artist, BookingError>;
    async fn delete_artist(&self, id: i32) -> Result<u64, BookingError>;

    async fn list_shows(&self) -> Result<Vec<ShowListing>, BookingError>;
    async fn shows_for_venue(&self, venue_id: i32) -> Result<Vec<ShowListing>, BookingError>;
    async fn shows_for_artist(&self, artist_id: i32) -> Result<Vec<ShowListing>, BookingError>;
    /// `InvalidReference` when the artist or venue does not exist.
    async fn insert_show(&self, form: &ShowForm) -> Result<Show, BookingError>;

    /// Name search; `needle` is already trimmed.
    async fn search_venues(&self, needle: &str) -> Result<Vec<SearchSummary>, BookingError>;
    async fn search_artists(&self, needle: &str) -> Result<Vec<SearchSummary>, BookingError>;
}

/// Open the store named by the database URL.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn BookingStore>> {
    if config.is_memory() {
        info!("Using in-memory store; data is lost on restart");
        return Ok(Arc::new(MemoryBookingStore::new()));
    }

    let db = Database::new(config)
        .await
        .context("Failed to connect to database")?;
    info!("Database connected");

    db.run_migrations()
        .await
        .context("Failed to run migrations")?;

    Ok(Arc::new(PgBookingStore::new(db)))
}
