use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Genres;
use crate::forms::ArtistForm;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Artist {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    #[sqlx(try_from = "String")]
    pub genres: Genres,
    pub image_link: String,
    pub facebook_link: String,
    pub seeking_venue: bool,
    pub website: String,
    pub seeking_description: String,
}

impl Artist {
    pub fn from_form(id: i32, form: &ArtistForm) -> Self {
        Artist {
            id,
            name: form.name.clone(),
            city: form.city.clone(),
            state: form.state.clone(),
            phone: form.phone.clone(),
            genres: form.genres.clone(),
            image_link: form.image_link.clone(),
            facebook_link: form.facebook_link.clone(),
            seeking_venue: form.seeking_venue,
            website: form.website.clone(),
            seeking_description: form.seeking_description.clone(),
        }
    }

    pub fn apply(&mut self, form: &ArtistForm) {
        *self = Artist::from_form(self.id, form);
    }
}
