//! directory.rs
//!
//! Use cases of the booking directory, on top of a [`BookingStore`]:
//! - read models for the listing, detail and search pages;
//! - create/edit/delete flows that report their outcome as a [`Flash`].
//!
//! Mutation failures other than `NotFound` never propagate: they are logged
//! and turned into a failure flash so the request still completes normally.

use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{error, info};

use crate::error::BookingError;
use crate::forms::{ArtistForm, ShowForm, VenueForm};
use crate::models::{Artist, EntityKind, Venue};
use crate::search::{normalize_term, SearchKind, SearchResults};
use crate::store::BookingStore;
use crate::views::{
    flatten_shows, group_venues_by_area, ArtistDetail, ArtistListItem, Flash, ShowEntry,
    VenueArea, VenueDetail,
};

#[derive(Clone)]
pub struct DirectoryService {
    store: Arc<dyn BookingStore>,
}

/// Lets `NotFound` through; any other failure becomes the given flash.
fn flash_or_not_found(err: BookingError, action: &str, failure: Flash) -> Result<Flash, BookingError> {
    match err {
        BookingError::NotFound { .. } => Err(err),
        other => {
            error!("{} failed: {}", action, other);
            Ok(failure)
        }
    }
}

impl DirectoryService {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn BookingStore> {
        &self.store
    }

    /* ---------- VENUES ---------- */

    pub async fn venue_areas(&self, now: NaiveDateTime) -> Result<Vec<VenueArea>, BookingError> {
        let venues = self.store.list_venues().await?;
        let shows = self.store.list_shows().await?;
        Ok(group_venues_by_area(venues, &shows, now))
    }

    pub async fn venue(&self, id: i32) -> Result<Venue, BookingError> {
        self.store
            .find_venue(id)
            .await?
            .ok_or_else(|| BookingError::not_found(EntityKind::Venue, id))
    }

    pub async fn venue_detail(&self, id: i32, now: NaiveDateTime) -> Result<VenueDetail, BookingError> {
        let venue = self.venue(id).await?;
        let shows = self.store.shows_for_venue(id).await?;
        Ok(VenueDetail::new(venue, &shows, now))
    }

    pub async fn create_venue(&self, form: &VenueForm) -> Flash {
        // The submitted name is used in both outcomes; nothing is re-read.
        match self.store.insert_venue(form).await {
            Ok(_) => Flash::success(format!("Venue {} was successfully listed!", form.name)),
            Err(e) => {
                error!("create_venue failed: {}", e);
                Flash::failure(format!(
                    "An error occurred. Venue {} could not be listed.",
                    form.name
                ))
            }
        }
    }

    pub async fn update_venue(&self, id: i32, form: &VenueForm) -> Result<Flash, BookingError> {
        let location = format!("/venues/{id}");
        match self.store.update_venue(id, form).await {
            Ok(venue) => Ok(Flash::success(format!(
                "Venue {} was successfully updated!",
                venue.name
            ))
            .redirect_to(location)),
            Err(e) => flash_or_not_found(
                e,
                "update_venue",
                Flash::failure(format!(
                    "An error occurred. Venue {} could not be updated.",
                    form.name
                ))
                .redirect_to(location),
            ),
        }
    }

    pub async fn delete_venue(&self, id: i32) -> Result<Flash, BookingError> {
        let venue = self.venue(id).await?;
        match self.store.delete_venue(id).await {
            Ok(shows) => {
                info!("Venue {} deleted together with {} shows", id, shows);
                Ok(Flash::success(format!("Venue {} was successfully deleted.", venue.name))
                    .redirect_to("/"))
            }
            Err(e) => flash_or_not_found(
                e,
                "delete_venue",
                Flash::failure(format!(
                    "An error occurred. Venue {} could not be deleted.",
                    venue.name
                )),
            ),
        }
    }

    /* ---------- ARTISTS ---------- */

    pub async fn artist_listing(&self) -> Result<Vec<ArtistListItem>, BookingError> {
        let artists = self.store.list_artists().await?;
        Ok(artists.into_iter().map(ArtistListItem::from).collect())
    }

    pub async fn artist(&self, id: i32) -> Result<Artist, BookingError> {
        self.store
            .find_artist(id)
            .await?
            .ok_or_else(|| BookingError::not_found(EntityKind::Artist, id))
    }

    pub async fn artist_detail(&self, id: i32, now: NaiveDateTime) -> Result<ArtistDetail, BookingError> {
        let artist = self.artist(id).await?;
        let shows = self.store.shows_for_artist(id).await?;
        Ok(ArtistDetail::new(artist, &shows, now))
    }

    pub async fn create_artist(&self, form: &ArtistForm) -> Flash {
        match self.store.insert_artist(form).await {
            Ok(_) => Flash::success(format!("Artist {} was successfully listed!", form.name)),
            Err(e) => {
                error!("create_artist failed: {}", e);
                Flash::failure(format!(
                    "An error occurred. Artist {} could not be listed.",
                    form.name
                ))
            }
        }
    }

    pub async fn update_artist(&self, id: i32, form: &ArtistForm) -> Result<Flash, BookingError> {
        let location = format!("/artists/{id}");
        match self.store.update_artist(id, form).await {
            Ok(artist) => Ok(Flash::success(format!(
                "Artist {} was successfully updated!",
                artist.name
            ))
            .redirect_to(location)),
            Err(e) => flash_or_not_found(
                e,
                "update_artist",
                Flash::failure(format!(
                    "An error occurred. Artist {} could not be updated.",
                    form.name
                ))
                .redirect_to(location),
            ),
        }
    }

    pub async fn delete_artist(&self, id: i32) -> Result<Flash, BookingError> {
        let artist = self.artist(id).await?;
        match self.store.delete_artist(id).await {
            Ok(shows) => {
                info!("Artist {} deleted together with {} shows", id, shows);
                Ok(Flash::success(format!("Artist {} was successfully deleted.", artist.name))
                    .redirect_to("/"))
            }
            Err(e) => flash_or_not_found(
                e,
                "delete_artist",
                Flash::failure(format!(
                    "An error occurred. Artist {} could not be deleted.",
                    artist.name
                )),
            ),
        }
    }

    /* ---------- SHOWS ---------- */

    pub async fn show_listing(&self) -> Result<Vec<ShowEntry>, BookingError> {
        let shows = self.store.list_shows().await?;
        Ok(flatten_shows(&shows))
    }

    pub async fn create_show(&self, form: &ShowForm) -> Flash {
        match self.store.insert_show(form).await {
            Ok(_) => Flash::success("Show was successfully listed!"),
            Err(e) => {
                error!("create_show failed: {}", e);
                Flash::failure("An error occurred. Show could not be listed.")
            }
        }
    }

    /* ---------- SEARCH ---------- */

    pub async fn search(&self, kind: SearchKind, raw_term: &str) -> Result<SearchResults, BookingError> {
        let needle = normalize_term(raw_term);
        let hits = match kind {
            SearchKind::Venue => self.store.search_venues(needle).await?,
            SearchKind::Artist => self.store.search_artists(needle).await?,
        };
        Ok(SearchResults::new(raw_term, hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Genres;
    use crate::store::MemoryBookingStore;
    use crate::views::current_time;
    use chrono::Duration;

    fn venue_form(name: &str, city: &str) -> VenueForm {
        VenueForm {
            name: name.to_string(),
            city: city.to_string(),
            state: "CA".into(),
            address: String::new(),
            phone: String::new(),
            image_link: String::new(),
            facebook_link: String::new(),
            genres: Genres::new(["Jazz"]),
            website: String::new(),
            seeking_talent: false,
            seeking_description: String::new(),
        }
    }

    fn artist_form(name: &str) -> ArtistForm {
        ArtistForm {
            name: name.to_string(),
            city: "San Francisco".into(),
            state: "CA".into(),
            phone: String::new(),
            genres: Genres::default(),
            image_link: String::new(),
            facebook_link: String::new(),
            seeking_venue: true,
            website: String::new(),
            seeking_description: String::new(),
        }
    }

    fn service() -> (Arc<MemoryBookingStore>, DirectoryService) {
        let store = Arc::new(MemoryBookingStore::new());
        (store.clone(), DirectoryService::new(store))
    }

    #[tokio::test]
    async fn failed_create_names_the_submitted_venue() {
        let (store, directory) = service();
        store.fail_commits(true);

        let flash = directory.create_venue(&venue_form("The Musical Hop", "SF")).await;

        assert!(!flash.success);
        assert_eq!(flash.message, "An error occurred. Venue The Musical Hop could not be listed.");
        assert_eq!(store.venue_count().await, 0);
    }

    #[tokio::test]
    async fn listing_and_detail_disagree_on_show_at_now() {
        let (_, directory) = service();
        directory.create_venue(&venue_form("Hop", "San Francisco")).await;
        directory.create_artist(&artist_form("Guns N Petals")).await;

        let now = current_time();
        let flash = directory
            .create_show(&ShowForm { artist_id: 1, venue_id: 1, start_time: now })
            .await;
        assert!(flash.success);

        let areas = directory.venue_areas(now).await.unwrap();
        assert_eq!(areas[0].venues[0].num_upcoming_shows, 0);

        let detail = directory.venue_detail(1, now).await.unwrap();
        assert_eq!(detail.shows.upcoming_shows_count, 1);
        assert_eq!(detail.shows.past_shows_count, 0);

        let later = directory.venue_detail(1, now + Duration::seconds(1)).await.unwrap();
        assert_eq!(later.shows.past_shows_count, 1);
    }

    #[tokio::test]
    async fn detail_for_unknown_id_is_not_found() {
        let (_, directory) = service();
        let err = directory.artist_detail(3, current_time()).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound { entity: EntityKind::Artist, id: 3 }));
    }

    #[tokio::test]
    async fn update_of_unknown_venue_is_not_found() {
        let (_, directory) = service();
        let err = directory.update_venue(8, &venue_form("Ghost", "SF")).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound { .. }));
    }

    #[tokio::test]
    async fn failed_update_reports_flash_and_keeps_row() {
        let (store, directory) = service();
        directory.create_venue(&venue_form("Hop", "SF")).await;
        store.fail_commits(true);

        let flash = directory.update_venue(1, &venue_form("Renamed", "LA")).await.unwrap();

        assert!(!flash.success);
        assert_eq!(flash.redirect.as_deref(), Some("/venues/1"));
        store.fail_commits(false);
        assert_eq!(directory.venue(1).await.unwrap().name, "Hop");
    }

    #[tokio::test]
    async fn booking_against_missing_venue_reports_failure() {
        let (store, directory) = service();
        directory.create_artist(&artist_form("Matt Quevedo")).await;

        let flash = directory
            .create_show(&ShowForm { artist_id: 1, venue_id: 77, start_time: current_time() })
            .await;

        assert_eq!(flash, Flash::failure("An error occurred. Show could not be listed."));
        assert_eq!(store.show_count().await, 0);
    }

    #[tokio::test]
    async fn search_trims_but_echoes_raw_term() {
        let (_, directory) = service();
        directory.create_venue(&venue_form("The Musical Hop", "SF")).await;
        directory.create_venue(&venue_form("Park Square Live Music & Coffee", "SF")).await;

        let results = directory.search(SearchKind::Venue, "  Hop ").await.unwrap();
        assert_eq!(results.count, 1);
        assert_eq!(results.results[0].name, "The Musical Hop");
        assert_eq!(results.search_term, "  Hop ");

        let music = directory.search(SearchKind::Venue, "music").await.unwrap();
        assert_eq!(music.count, 2);
    }

    #[tokio::test]
    async fn delete_venue_flash_redirects_home() {
        let (store, directory) = service();
        directory.create_venue(&venue_form("Hop", "SF")).await;

        let flash = directory.delete_venue(1).await.unwrap();

        assert_eq!(flash.message, "Venue Hop was successfully deleted.");
        assert_eq!(flash.redirect.as_deref(), Some("/"));
        assert_eq!(store.venue_count().await, 0);
    }
}
