use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Show {
    pub id: i32,
    pub start_time: NaiveDateTime,
    pub venue_id: i32,
    pub artist_id: i32,
}

/// A show joined with the venue and artist it links.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ShowListing {
    pub show_id: i32,
    pub start_time: NaiveDateTime,
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: String,
}
