use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Genres;
use crate::forms::VenueForm;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Venue {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub image_link: String,
    pub facebook_link: String,
    #[sqlx(try_from = "String")]
    pub genres: Genres,
    pub website: String,
    pub seeking_talent: bool,
    pub seeking_description: String,
}

impl Venue {
    pub fn from_form(id: i32, form: &VenueForm) -> Self {
        Venue {
            id,
            name: form.name.clone(),
            city: form.city.clone(),
            state: form.state.clone(),
            address: form.address.clone(),
            phone: form.phone.clone(),
            image_link: form.image_link.clone(),
            facebook_link: form.facebook_link.clone(),
            genres: form.genres.clone(),
            website: form.website.clone(),
            seeking_talent: form.seeking_talent,
            seeking_description: form.seeking_description.clone(),
        }
    }

    /// Overwrite every editable field; edits are full replacements.
    pub fn apply(&mut self, form: &VenueForm) {
        *self = Venue::from_form(self.id, form);
    }
}
