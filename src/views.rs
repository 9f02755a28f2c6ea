//! Read models derived from stored venues, artists and shows.
//!
//! Everything here is pure: the caller supplies the rows and the moment
//! used to decide which shows are upcoming. Two different boundaries are in
//! play and both are kept as-is:
//!
//! - listing counts ([`num_upcoming_shows`]) treat a show as upcoming only
//!   when it starts strictly after `now`;
//! - detail pages ([`partition_shows`]) put a show starting exactly at
//!   `now` into `upcoming_shows`.
//!
//! Search summaries report the total number of shows, ignoring time.

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::collections::{BTreeMap, HashMap};

use crate::models::{Artist, ShowListing, Venue};

/// Evaluation moment for upcoming/past decisions. Show times are stored
/// without a zone and read as UTC.
pub fn current_time() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn iso8601(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/* ---------- venue listing ---------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueSummary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueArea {
    pub city: String,
    pub state: String,
    pub venues: Vec<VenueSummary>,
}

/// Shows starting strictly after `now`.
pub fn num_upcoming_shows<I>(start_times: I, now: NaiveDateTime) -> usize
where
    I: IntoIterator<Item = NaiveDateTime>,
{
    start_times.into_iter().filter(|t| *t > now).count()
}

/// Group venues by exact `(city, state)`.
///
/// Area order is not part of the contract; venues inside an area keep the
/// order they were given in.
pub fn group_venues_by_area(
    venues: Vec<Venue>,
    shows: &[ShowListing],
    now: NaiveDateTime,
) -> Vec<VenueArea> {
    let mut starts: HashMap<i32, Vec<NaiveDateTime>> = HashMap::new();
    for show in shows {
        starts.entry(show.venue_id).or_default().push(show.start_time);
    }

    let mut areas: BTreeMap<(String, String), Vec<VenueSummary>> = BTreeMap::new();
    for venue in venues {
        let upcoming = num_upcoming_shows(
            starts.get(&venue.id).into_iter().flatten().copied(),
            now,
        );
        areas
            .entry((venue.city, venue.state))
            .or_default()
            .push(VenueSummary {
                id: venue.id,
                name: venue.name,
                num_upcoming_shows: upcoming,
            });
    }

    areas
        .into_iter()
        .map(|((city, state), venues)| VenueArea { city, state, venues })
        .collect()
}

/* ---------- detail pages ---------- */

/// An artist playing at the venue being viewed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistAppearance {
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: String,
}

impl From<&ShowListing> for ArtistAppearance {
    fn from(show: &ShowListing) -> Self {
        ArtistAppearance {
            artist_id: show.artist_id,
            artist_name: show.artist_name.clone(),
            artist_image_link: show.artist_image_link.clone(),
            start_time: iso8601(show.start_time),
        }
    }
}

/// A venue hosting the artist being viewed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueAppearance {
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: String,
    pub start_time: String,
}

impl From<&ShowListing> for VenueAppearance {
    fn from(show: &ShowListing) -> Self {
        VenueAppearance {
            venue_id: show.venue_id,
            venue_name: show.venue_name.clone(),
            venue_image_link: show.venue_image_link.clone(),
            start_time: iso8601(show.start_time),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowPartition<T> {
    pub past_shows: Vec<T>,
    pub upcoming_shows: Vec<T>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

/// Split shows into past (before `now`) and upcoming (at or after `now`),
/// rendering each as its counterpart `T`.
pub fn partition_shows<'a, T>(shows: &'a [ShowListing], now: NaiveDateTime) -> ShowPartition<T>
where
    T: From<&'a ShowListing>,
{
    let (past, upcoming): (Vec<&ShowListing>, Vec<&ShowListing>) =
        shows.iter().partition(|show| show.start_time < now);

    ShowPartition {
        past_shows_count: past.len(),
        upcoming_shows_count: upcoming.len(),
        past_shows: past.into_iter().map(T::from).collect(),
        upcoming_shows: upcoming.into_iter().map(T::from).collect(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VenueDetail {
    #[serde(flatten)]
    pub venue: Venue,
    #[serde(flatten)]
    pub shows: ShowPartition<ArtistAppearance>,
}

impl VenueDetail {
    pub fn new(venue: Venue, shows: &[ShowListing], now: NaiveDateTime) -> Self {
        VenueDetail {
            venue,
            shows: partition_shows(shows, now),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtistDetail {
    #[serde(flatten)]
    pub artist: Artist,
    #[serde(flatten)]
    pub shows: ShowPartition<VenueAppearance>,
}

impl ArtistDetail {
    pub fn new(artist: Artist, shows: &[ShowListing], now: NaiveDateTime) -> Self {
        ArtistDetail {
            artist,
            shows: partition_shows(shows, now),
        }
    }
}

/* ---------- listings & search ---------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistListItem {
    pub id: i32,
    pub name: String,
}

impl From<Artist> for ArtistListItem {
    fn from(artist: Artist) -> Self {
        ArtistListItem {
            id: artist.id,
            name: artist.name,
        }
    }
}

/// Search hit. `num_upcoming_shows` is the entity's total show count.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct SearchSummary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: i64,
}

impl SearchSummary {
    pub fn new(id: i32, name: impl Into<String>, total_shows: usize) -> Self {
        SearchSummary {
            id,
            name: name.into(),
            num_upcoming_shows: total_shows as i64,
        }
    }
}

/// Row of the `/shows` page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowEntry {
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: String,
}

pub fn flatten_shows(shows: &[ShowListing]) -> Vec<ShowEntry> {
    shows
        .iter()
        .map(|show| ShowEntry {
            venue_id: show.venue_id,
            venue_name: show.venue_name.clone(),
            artist_id: show.artist_id,
            artist_name: show.artist_name.clone(),
            artist_image_link: show.artist_image_link.clone(),
            start_time: iso8601(show.start_time),
        })
        .collect()
}

/// Outcome message of a mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flash {
    pub success: bool,
    pub message: String,
    pub redirect: Option<String>,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Flash {
            success: true,
            message: message.into(),
            redirect: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Flash {
            success: false,
            message: message.into(),
            redirect: None,
        }
    }

    pub fn redirect_to(mut self, location: impl Into<String>) -> Self {
        self.redirect = Some(location.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Genres;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 6, 15)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    fn venue(id: i32, name: &str, city: &str, state: &str) -> Venue {
        Venue {
            id,
            name: name.into(),
            city: city.into(),
            state: state.into(),
            address: String::new(),
            phone: String::new(),
            image_link: format!("https://img.example.com/venue/{id}.jpg"),
            facebook_link: String::new(),
            genres: Genres::new(["Jazz"]),
            website: String::new(),
            seeking_talent: false,
            seeking_description: String::new(),
        }
    }

    fn show(show_id: i32, venue_id: i32, artist_id: i32, start_time: NaiveDateTime) -> ShowListing {
        ShowListing {
            show_id,
            start_time,
            venue_id,
            venue_name: format!("Venue {venue_id}"),
            venue_image_link: format!("https://img.example.com/venue/{venue_id}.jpg"),
            artist_id,
            artist_name: format!("Artist {artist_id}"),
            artist_image_link: format!("https://img.example.com/artist/{artist_id}.jpg"),
        }
    }

    #[test]
    fn venues_group_by_exact_city_and_state() {
        let venues = vec![
            venue(1, "The Musical Hop", "San Francisco", "CA"),
            venue(2, "The Dueling Pianos Bar", "New York", "NY"),
            venue(3, "Park Square Live Music & Coffee", "San Francisco", "CA"),
            venue(4, "Lowercase Hall", "san francisco", "CA"),
        ];
        let areas = group_venues_by_area(venues, &[], now());

        assert_eq!(areas.len(), 3);
        let sf = areas
            .iter()
            .find(|a| a.city == "San Francisco" && a.state == "CA")
            .unwrap();
        let ids: Vec<i32> = sf.venues.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn listing_count_excludes_show_starting_now() {
        let t = now();
        let times = [t - Duration::days(1), t, t + Duration::seconds(1)];
        assert_eq!(num_upcoming_shows(times, t), 1);
    }

    #[test]
    fn detail_partition_counts_show_starting_now_as_upcoming() {
        let t = now();
        let shows = vec![
            show(1, 1, 1, t - Duration::hours(2)),
            show(2, 1, 2, t),
            show(3, 1, 3, t + Duration::days(3)),
        ];

        let partition: ShowPartition<ArtistAppearance> = partition_shows(&shows, t);
        assert_eq!(partition.past_shows_count, 1);
        assert_eq!(partition.upcoming_shows_count, 2);
        assert_eq!(partition.upcoming_shows[0].artist_id, 2);

        // Same rows through the listing rule: the show at `now` drops out.
        let areas = group_venues_by_area(vec![venue(1, "Hop", "SF", "CA")], &shows, t);
        assert_eq!(areas[0].venues[0].num_upcoming_shows, 1);
    }

    #[test]
    fn artist_detail_uses_venue_as_counterpart() {
        let t = now();
        let shows = vec![show(9, 5, 2, t + Duration::days(1))];
        let partition: ShowPartition<VenueAppearance> = partition_shows(&shows, t);
        let entry = &partition.upcoming_shows[0];
        assert_eq!(entry.venue_id, 5);
        assert_eq!(entry.venue_name, "Venue 5");
        assert_eq!(entry.start_time, "2030-06-16T20:00:00");
    }

    #[test]
    fn venue_detail_flattens_fields_and_partition() {
        let t = now();
        let detail = VenueDetail::new(
            venue(1, "The Musical Hop", "San Francisco", "CA"),
            &[show(1, 1, 4, t - Duration::days(400))],
            t,
        );
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["name"], "The Musical Hop");
        assert_eq!(json["genres"], serde_json::json!(["Jazz"]));
        assert_eq!(json["past_shows_count"], 1);
        assert_eq!(json["past_shows"][0]["artist_name"], "Artist 4");
        assert_eq!(json["upcoming_shows"], serde_json::json!([]));
    }

    #[test]
    fn search_summary_counts_every_show() {
        let summary = SearchSummary::new(1, "The Musical Hop", 3);
        assert_eq!(summary.num_upcoming_shows, 3);
    }

    #[test]
    fn flat_show_list_renders_iso_times() {
        let entries = flatten_shows(&[show(1, 1, 4, now())]);
        assert_eq!(entries[0].start_time, "2030-06-15T20:00:00");
        assert_eq!(entries[0].artist_image_link, "https://img.example.com/artist/4.jpg");
    }

    #[test]
    fn flash_serializes_redirect() {
        let flash = Flash::success("Venue Hop was successfully updated!").redirect_to("/venues/1");
        let json = serde_json::to_value(&flash).unwrap();
        assert_eq!(json["redirect"], "/venues/1");
        assert_eq!(json["success"], true);
    }

    const CITIES: [&str; 3] = ["San Francisco", "New York", "Austin"];
    const STATES: [&str; 3] = ["CA", "NY", "TX"];

    proptest! {
        #[test]
        fn every_venue_lands_in_exactly_one_area(
            locations in prop::collection::vec((0usize..3, 0usize..3), 0..40)
        ) {
            let venues: Vec<Venue> = locations
                .iter()
                .enumerate()
                .map(|(i, (c, s))| venue(i as i32 + 1, "v", CITIES[*c], STATES[*s]))
                .collect();

            let areas = group_venues_by_area(venues.clone(), &[], now());

            let keys: HashSet<(&str, &str)> =
                areas.iter().map(|a| (a.city.as_str(), a.state.as_str())).collect();
            prop_assert_eq!(keys.len(), areas.len());

            let mut seen = HashSet::new();
            for area in &areas {
                let expected = venues
                    .iter()
                    .filter(|v| v.city == area.city && v.state == area.state)
                    .count();
                prop_assert_eq!(area.venues.len(), expected);
                for v in &area.venues {
                    prop_assert!(seen.insert(v.id));
                }
            }
            prop_assert_eq!(seen.len(), venues.len());
        }
    }
}
