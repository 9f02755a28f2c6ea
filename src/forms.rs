//! Typed inputs for the create/edit/book submissions.
//!
//! Bodies arrive as `application/x-www-form-urlencoded`. Multi-select
//! widgets repeat their key (`genres=Jazz&genres=Blues`), so the body is
//! first decoded into ordered pairs and only then mapped onto the typed
//! form for the operation. A missing field is a `MissingField` error and
//! never reaches the store.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use chrono::{DateTime, NaiveDateTime};
use validator::{Validate, ValidationError};

use crate::error::BookingError;
use crate::models::genres::{Genres, GENRE_SEPARATOR};

/// Decoded urlencoded body, in submission order.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    pub fn parse(body: &[u8]) -> Result<Self, BookingError> {
        let pairs = serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
            .map_err(|e| BookingError::Validation(e.to_string()))?;
        Ok(Self { pairs })
    }

    /// First value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn require(&self, name: &'static str) -> Result<String, BookingError> {
        self.get(name)
            .map(str::to_string)
            .ok_or(BookingError::MissingField(name))
    }

    pub fn genres(&self) -> Genres {
        Genres::new(self.get_all("genres"))
    }

    /// Raw search term, untrimmed. Absent means empty.
    pub fn search_term(&self) -> &str {
        self.get("search_term").unwrap_or_default()
    }
}

impl<S: Send + Sync> FromRequest<S> for FormFields {
    type Rejection = BookingError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| BookingError::Validation(e.body_text()))?;
        Self::parse(&body)
    }
}

/// Which form produced the submission; the accepted truthy tokens differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Create,
    Edit,
}

fn validate_genres(genres: &Genres) -> Result<(), ValidationError> {
    if genres.iter().any(|g| g.contains(GENRE_SEPARATOR)) {
        return Err(ValidationError::new("genre_contains_separator"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct VenueForm {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(max = 120))]
    pub city: String,
    #[validate(length(max = 120))]
    pub state: String,
    #[validate(length(max = 120))]
    pub address: String,
    #[validate(length(max = 120))]
    pub phone: String,
    #[validate(length(max = 500))]
    pub image_link: String,
    #[validate(length(max = 120))]
    pub facebook_link: String,
    #[validate(custom(function = "validate_genres"))]
    pub genres: Genres,
    #[validate(length(max = 120))]
    pub website: String,
    pub seeking_talent: bool,
    #[validate(length(max = 120))]
    pub seeking_description: String,
}

impl VenueForm {
    pub fn from_fields(fields: &FormFields, submission: Submission) -> Result<Self, BookingError> {
        let form = VenueForm {
            name: fields.require("name")?,
            city: fields.require("city")?,
            state: fields.require("state")?,
            address: fields.require("address")?,
            phone: fields.require("phone")?,
            image_link: fields.require("image_link")?,
            facebook_link: fields.require("facebook_link")?,
            genres: fields.genres(),
            website: fields.require("website")?,
            seeking_talent: venue_seeking_talent(fields, submission),
            seeking_description: fields.require("seeking_description")?,
        };
        form.validate()?;
        Ok(form)
    }
}

fn venue_seeking_talent(fields: &FormFields, submission: Submission) -> bool {
    let flag = fields.get("seeking_talent").filter(|v| !v.is_empty());
    match submission {
        Submission::Create => flag == Some("y"),
        // Edits take the "on" token from `seeking_venue`, not `seeking_talent`.
        Submission::Edit => {
            flag.is_some() && (flag == Some("y") || fields.get("seeking_venue") == Some("on"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ArtistForm {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(max = 120))]
    pub city: String,
    #[validate(length(max = 120))]
    pub state: String,
    #[validate(length(max = 120))]
    pub phone: String,
    #[validate(custom(function = "validate_genres"))]
    pub genres: Genres,
    #[validate(length(max = 500))]
    pub image_link: String,
    #[validate(length(max = 120))]
    pub facebook_link: String,
    pub seeking_venue: bool,
    #[validate(length(max = 120))]
    pub website: String,
    #[validate(length(max = 120))]
    pub seeking_description: String,
}

impl ArtistForm {
    pub fn from_fields(fields: &FormFields, submission: Submission) -> Result<Self, BookingError> {
        let accepted: &[&str] = match submission {
            Submission::Create => &["y"],
            Submission::Edit => &["y", "on"],
        };
        let form = ArtistForm {
            name: fields.require("name")?,
            city: fields.require("city")?,
            state: fields.require("state")?,
            phone: fields.require("phone")?,
            genres: fields.genres(),
            image_link: fields.require("image_link")?,
            facebook_link: fields.require("facebook_link")?,
            seeking_venue: fields
                .get("seeking_venue")
                .is_some_and(|v| accepted.contains(&v)),
            website: fields.require("website")?,
            seeking_description: fields.require("seeking_description")?,
        };
        form.validate()?;
        Ok(form)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShowForm {
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: NaiveDateTime,
}

impl ShowForm {
    pub fn from_fields(fields: &FormFields) -> Result<Self, BookingError> {
        Ok(ShowForm {
            artist_id: parse_id(fields, "artist_id")?,
            venue_id: parse_id(fields, "venue_id")?,
            start_time: parse_start_time(&fields.require("start_time")?)?,
        })
    }
}

fn parse_id(fields: &FormFields, name: &'static str) -> Result<i32, BookingError> {
    let raw = fields.require(name)?;
    raw.trim()
        .parse()
        .map_err(|_| BookingError::Validation(format!("{name} must be an integer, got {raw:?}")))
}

const START_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Accepts the picker's local formats and RFC 3339 (normalised to UTC).
pub fn parse_start_time(raw: &str) -> Result<NaiveDateTime, BookingError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }
    START_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| BookingError::Validation(format!("start_time {raw:?} is not a date-time")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue_body(extra: &str) -> FormFields {
        let body = format!(
            "name=The+Musical+Hop&city=San+Francisco&state=CA&address=1015+Folsom+Street\
             &phone=123-123-1234&image_link=&facebook_link=&website=\
             &seeking_description=&genres=Jazz&genres=Reggae{extra}"
        );
        FormFields::parse(body.as_bytes()).unwrap()
    }

    #[test]
    fn repeated_genres_keep_submission_order() {
        let form = VenueForm::from_fields(&venue_body(""), Submission::Create).unwrap();
        assert_eq!(form.genres.iter().collect::<Vec<_>>(), vec!["Jazz", "Reggae"]);
        assert_eq!(form.name, "The Musical Hop");
    }

    #[test]
    fn missing_field_is_typed_error() {
        let fields = FormFields::parse(b"name=Solo").unwrap();
        let err = ArtistForm::from_fields(&fields, Submission::Create).unwrap_err();
        assert!(matches!(err, BookingError::MissingField("city")));
    }

    #[test]
    fn empty_name_fails_validation() {
        let fields = FormFields::parse(
            b"name=&city=a&state=b&phone=&image_link=&facebook_link=&website=&seeking_description=",
        )
        .unwrap();
        let err = ArtistForm::from_fields(&fields, Submission::Create).unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
    }

    #[test]
    fn create_venue_accepts_only_y() {
        let yes = VenueForm::from_fields(&venue_body("&seeking_talent=y"), Submission::Create).unwrap();
        let on = VenueForm::from_fields(&venue_body("&seeking_talent=on"), Submission::Create).unwrap();
        assert!(yes.seeking_talent);
        assert!(!on.seeking_talent);
    }

    #[test]
    fn edit_venue_reads_on_token_from_seeking_venue() {
        // "on" in the venue's own checkbox is not accepted on edit...
        let own = VenueForm::from_fields(&venue_body("&seeking_talent=on"), Submission::Edit).unwrap();
        assert!(!own.seeking_talent);

        // ...but it is when `seeking_venue` happens to carry it.
        let crossed = VenueForm::from_fields(
            &venue_body("&seeking_talent=on&seeking_venue=on"),
            Submission::Edit,
        )
        .unwrap();
        assert!(crossed.seeking_talent);

        // The venue checkbox still has to be present.
        let absent = VenueForm::from_fields(&venue_body("&seeking_venue=on"), Submission::Edit).unwrap();
        assert!(!absent.seeking_talent);
    }

    #[test]
    fn edit_artist_accepts_y_and_on() {
        let base = "name=Guns+N+Petals&city=San+Francisco&state=CA&phone=&image_link=\
                    &facebook_link=&website=&seeking_description=";
        for (token, create, edit) in [("y", true, true), ("on", false, true), ("yes", false, false)] {
            let fields = FormFields::parse(format!("{base}&seeking_venue={token}").as_bytes()).unwrap();
            assert_eq!(
                ArtistForm::from_fields(&fields, Submission::Create).unwrap().seeking_venue,
                create,
                "create with {token}"
            );
            assert_eq!(
                ArtistForm::from_fields(&fields, Submission::Edit).unwrap().seeking_venue,
                edit,
                "edit with {token}"
            );
        }
    }

    #[test]
    fn genre_with_separator_is_rejected() {
        let err = VenueForm::from_fields(&venue_body("&genres=Rock%2CPop"), Submission::Create)
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
    }

    #[test]
    fn show_form_parses_ids_and_time() {
        let fields =
            FormFields::parse(b"artist_id=4&venue_id=1&start_time=2019-05-21+21%3A30%3A00").unwrap();
        let form = ShowForm::from_fields(&fields).unwrap();
        assert_eq!(form.artist_id, 4);
        assert_eq!(form.venue_id, 1);
        assert_eq!(form.start_time.to_string(), "2019-05-21 21:30:00");
    }

    #[test]
    fn start_time_accepts_rfc3339_and_picker_format() {
        let utc = parse_start_time("2035-04-01T22:00:00+02:00").unwrap();
        assert_eq!(utc.to_string(), "2035-04-01 20:00:00");
        assert!(parse_start_time("2035-04-01T20:00").is_ok());
        assert!(matches!(parse_start_time("next friday"), Err(BookingError::Validation(_))));
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        let fields = FormFields::parse(b"artist_id=abc&venue_id=1&start_time=2035-01-01+10%3A00").unwrap();
        assert!(matches!(ShowForm::from_fields(&fields), Err(BookingError::Validation(_))));
    }

    #[test]
    fn search_term_defaults_to_empty() {
        assert_eq!(FormFields::default().search_term(), "");
        let fields = FormFields::parse(b"search_term=+Hop+").unwrap();
        assert_eq!(fields.search_term(), " Hop ");
    }
}
