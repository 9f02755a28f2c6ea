use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::BookingStore;
use crate::error::BookingError;
use crate::forms::{ArtistForm, ShowForm, VenueForm};
use crate::models::{Artist, EntityKind, Show, ShowListing, Venue};
use crate::search::matches_name;
use crate::views::SearchSummary;

#[derive(Debug, Clone, Default)]
struct Tables {
    venues: BTreeMap<i32, Venue>,
    artists: BTreeMap<i32, Artist>,
    shows: BTreeMap<i32, Show>,
    last_venue_id: i32,
    last_artist_id: i32,
    last_show_id: i32,
}

impl Tables {
    fn listing(&self, show: &Show) -> Option<ShowListing> {
        let venue = self.venues.get(&show.venue_id)?;
        let artist = self.artists.get(&show.artist_id)?;
        Some(ShowListing {
            show_id: show.id,
            start_time: show.start_time,
            venue_id: venue.id,
            venue_name: venue.name.clone(),
            venue_image_link: venue.image_link.clone(),
            artist_id: artist.id,
            artist_name: artist.name.clone(),
            artist_image_link: artist.image_link.clone(),
        })
    }

    fn listings<F>(&self, keep: F) -> Vec<ShowListing>
    where
        F: Fn(&Show) -> bool,
    {
        let mut shows: Vec<ShowListing> = self
            .shows
            .values()
            .filter(|show| keep(show))
            .filter_map(|show| self.listing(show))
            .collect();
        shows.sort_by_key(|show| (show.start_time, show.show_id));
        shows
    }

    fn show_count<F>(&self, keep: F) -> usize
    where
        F: Fn(&Show) -> bool,
    {
        self.shows.values().filter(|show| keep(show)).count()
    }
}

/// Process-local store.
///
/// Each mutation works on a copy of the tables and swaps it in on commit,
/// so a failed mutation leaves nothing behind. `fail_commits` makes every
/// commit fail, which is how rollback paths are exercised.
#[derive(Debug, Default)]
pub struct MemoryBookingStore {
    tables: Mutex<Tables>,
    fail_commits: AtomicBool,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub async fn venue_count(&self) -> usize {
        self.tables.lock().await.venues.len()
    }

    pub async fn artist_count(&self) -> usize {
        self.tables.lock().await.artists.len()
    }

    pub async fn show_count(&self) -> usize {
        self.tables.lock().await.shows.len()
    }

    async fn transaction<T, F>(&self, work: F) -> Result<T, BookingError>
    where
        F: FnOnce(&mut Tables) -> Result<T, BookingError>,
    {
        let mut guard = self.tables.lock().await;
        let mut draft = guard.clone();
        let value = work(&mut draft)?;

        if self.fail_commits.load(Ordering::SeqCst) {
            warn!("memory store: commit rejected, rolling back");
            return Err(BookingError::PersistenceFailure(
                "commit rejected by memory store".to_string(),
            ));
        }

        *guard = draft;
        Ok(value)
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn list_venues(&self) -> Result<Vec<Venue>, BookingError> {
        Ok(self.tables.lock().await.venues.values().cloned().collect())
    }

    async fn find_venue(&self, id: i32) -> Result<Option<Venue>, BookingError> {
        Ok(self.tables.lock().await.venues.get(&id).cloned())
    }

    async fn insert_venue(&self, form: &VenueForm) -> Result<Venue, BookingError> {
        let venue = self
            .transaction(|t| {
                t.last_venue_id += 1;
                let venue = Venue::from_form(t.last_venue_id, form);
                t.venues.insert(venue.id, venue.clone());
                Ok(venue)
            })
            .await?;
        info!("Venue {} created with id {}", venue.name, venue.id);
        Ok(venue)
    }

    async fn update_venue(&self, id: i32, form: &VenueForm) -> Result<Venue, BookingError> {
        self.transaction(|t| {
            let venue = t
                .venues
                .get_mut(&id)
                .ok_or_else(|| BookingError::not_found(EntityKind::Venue, id))?;
            venue.apply(form);
            Ok(venue.clone())
        })
        .await
    }

    async fn delete_venue(&self, id: i32) -> Result<u64, BookingError> {
        self.transaction(|t| {
            if t.venues.remove(&id).is_none() {
                return Err(BookingError::not_found(EntityKind::Venue, id));
            }
            let before = t.shows.len();
            t.shows.retain(|_, show| show.venue_id != id);
            Ok((before - t.shows.len()) as u64)
        })
        .await
    }

    async fn list_artists(&self) -> Result<Vec<Artist>, BookingError> {
        Ok(self.tables.lock().await.artists.values().cloned().collect())
    }

    async fn find_artist(&self, id: i32) -> Result<Option<Artist>, BookingError> {
        Ok(self.tables.lock().await.artists.get(&id).cloned())
    }

    async fn insert_artist(&self, form: &ArtistForm) -> Result<Artist, BookingError> {
        let artist = self
            .transaction(|t| {
                t.last_artist_id += 1;
                let artist = Artist::from_form(t.last_artist_id, form);
                t.artists.insert(artist.id, artist.clone());
                Ok(artist)
            })
            .await?;
        info!("Artist {} created with id {}", artist.name, artist.id);
        Ok(artist)
    }

    async fn update_artist(&self, id: i32, form: &ArtistForm) -> Result<Artist, BookingError> {
        self.transaction(|t| {
            let artist = t
                .artists
                .get_mut(&id)
                .ok_or_else(|| BookingError::not_found(EntityKind::Artist, id))?;
            artist.apply(form);
            Ok(artist.clone())
        })
        .await
    }

    async fn delete_artist(&self, id: i32) -> Result<u64, BookingError> {
        self.transaction(|t| {
            if t.artists.remove(&id).is_none() {
                return Err(BookingError::not_found(EntityKind::Artist, id));
            }
            let before = t.shows.len();
            t.shows.retain(|_, show| show.artist_id != id);
            Ok((before - t.shows.len()) as u64)
        })
        .await
    }

    async fn list_shows(&self) -> Result<Vec<ShowListing>, BookingError> {
        Ok(self.tables.lock().await.listings(|_| true))
    }

    async fn shows_for_venue(&self, venue_id: i32) -> Result<Vec<ShowListing>, BookingError> {
        Ok(self
            .tables
            .lock()
            .await
            .listings(|show| show.venue_id == venue_id))
    }

    async fn shows_for_artist(&self, artist_id: i32) -> Result<Vec<ShowListing>, BookingError> {
        Ok(self
            .tables
            .lock()
            .await
            .listings(|show| show.artist_id == artist_id))
    }

    async fn insert_show(&self, form: &ShowForm) -> Result<Show, BookingError> {
        self.transaction(|t| {
            if !t.artists.contains_key(&form.artist_id) {
                return Err(BookingError::InvalidReference {
                    entity: EntityKind::Artist,
                    id: form.artist_id,
                });
            }
            if !t.venues.contains_key(&form.venue_id) {
                return Err(BookingError::InvalidReference {
                    entity: EntityKind::Venue,
                    id: form.venue_id,
                });
            }
            t.last_show_id += 1;
            let show = Show {
                id: t.last_show_id,
                start_time: form.start_time,
                venue_id: form.venue_id,
                artist_id: form.artist_id,
            };
            t.shows.insert(show.id, show.clone());
            Ok(show)
        })
        .await
    }

    async fn search_venues(&self, needle: &str) -> Result<Vec<SearchSummary>, BookingError> {
        let t = self.tables.lock().await;
        Ok(t.venues
            .values()
            .filter(|venue| matches_name(&venue.name, needle))
            .map(|venue| {
                let total = t.show_count(|show| show.venue_id == venue.id);
                SearchSummary::new(venue.id, venue.name.clone(), total)
            })
            .collect())
    }

    async fn search_artists(&self, needle: &str) -> Result<Vec<SearchSummary>, BookingError> {
        let t = self.tables.lock().await;
        Ok(t.artists
            .values()
            .filter(|artist| matches_name(&artist.name, needle))
            .map(|artist| {
                let total = t.show_count(|show| show.artist_id == artist.id);
                SearchSummary::new(artist.id, artist.name.clone(), total)
            })
            .collect())
    }
}
