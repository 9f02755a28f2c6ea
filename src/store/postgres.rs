use async_trait::async_trait;
use sqlx::PgConnection;
use tracing::{error, info};

use super::BookingStore;
use crate::database::Database;
use crate::error::BookingError;
use crate::forms::{ArtistForm, ShowForm, VenueForm};
use crate::models::{Artist, EntityKind, Show, ShowListing, Venue};
use crate::search::like_pattern;
use crate::views::SearchSummary;

const SHOW_LISTING_SELECT: &str = r#"
    SELECT
        s.id AS show_id,
        s.start_time,
        v.id AS venue_id,
        v.name AS venue_name,
        v.image_link AS venue_image_link,
        a.id AS artist_id,
        a.name AS artist_name,
        a.image_link AS artist_image_link
    FROM "Show" s
    JOIN "Venue" v ON v.id = s.venue_id
    JOIN "Artist" a ON a.id = s.artist_id
"#;

fn table_name(entity: EntityKind) -> &'static str {
    match entity {
        EntityKind::Venue => r#""Venue""#,
        EntityKind::Artist => r#""Artist""#,
        EntityKind::Show => r#""Show""#,
    }
}

/// PostgreSQL-backed store; one transaction per mutation.
#[derive(Clone)]
pub struct PgBookingStore {
    db: Database,
}

impl PgBookingStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn listings_where(
        &self,
        column: &str,
        id: i32,
    ) -> Result<Vec<ShowListing>, BookingError> {
        let sql = format!("{SHOW_LISTING_SELECT} WHERE s.{column} = $1 ORDER BY s.start_time, s.id");
        let shows = sqlx::query_as::<_, ShowListing>(&sql)
            .bind(id)
            .fetch_all(&self.db.pool)
            .await?;
        Ok(shows)
    }

    async fn search(
        &self,
        entity: EntityKind,
        fk_column: &str,
        needle: &str,
    ) -> Result<Vec<SearchSummary>, BookingError> {
        let sql = format!(
            r#"
            SELECT e.id, e.name, COUNT(s.id) AS num_upcoming_shows
            FROM {table} e
            LEFT JOIN "Show" s ON s.{fk_column} = e.id
            WHERE e.name ILIKE $1 ESCAPE '\'
            GROUP BY e.id, e.name
            ORDER BY e.id
            "#,
            table = table_name(entity),
        );
        let hits = sqlx::query_as::<_, SearchSummary>(&sql)
            .bind(like_pattern(needle))
            .fetch_all(&self.db.pool)
            .await?;
        Ok(hits)
    }

    /// Delete the entity's shows, then the entity, in one transaction.
    async fn delete_with_shows(
        &self,
        entity: EntityKind,
        fk_column: &str,
        id: i32,
    ) -> Result<u64, BookingError> {
        let mut tx = self.db.pool.begin().await?;

        if !row_exists(&mut tx, entity, id).await? {
            return Err(BookingError::not_found(entity, id));
        }

        let shows_deleted = match sqlx::query(&format!(r#"DELETE FROM "Show" WHERE {fk_column} = $1"#))
            .bind(id)
            .execute(&mut *tx)
            .await
        {
            Ok(result) => result.rows_affected(),
            Err(e) => {
                error!("failed to delete shows of {} {}: {:?}", entity, id, e);
                let _ = tx.rollback().await;
                return Err(e.into());
            }
        };

        let delete_entity = format!("DELETE FROM {} WHERE id = $1", table_name(entity));
        if let Err(e) = sqlx::query(&delete_entity).bind(id).execute(&mut *tx).await {
            error!("failed to delete {} {}: {:?}", entity, id, e);
            let _ = tx.rollback().await;
            return Err(e.into());
        }

        tx.commit().await?;
        info!("Deleted {} {} with {} shows", entity, id, shows_deleted);
        Ok(shows_deleted)
    }
}

async fn row_exists(
    conn: &mut PgConnection,
    entity: EntityKind,
    id: i32,
) -> Result<bool, sqlx::Error> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
        table_name(entity)
    );
    sqlx::query_scalar::<_, bool>(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await
}

#[async_trait]
impl BookingStore for PgBookingStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    /* ---------- VENUES ---------- */

    async fn list_venues(&self) -> Result<Vec<Venue>, BookingError> {
        let venues = sqlx::query_as::<_, Venue>(r#"SELECT * FROM "Venue" ORDER BY id"#)
            .fetch_all(&self.db.pool)
            .await?;
        Ok(venues)
    }

    async fn find_venue(&self, id: i32) -> Result<Option<Venue>, BookingError> {
        let venue = sqlx::query_as::<_, Venue>(r#"SELECT * FROM "Venue" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.db.pool)
            .await?;
        Ok(venue)
    }

    async fn insert_venue(&self, form: &VenueForm) -> Result<Venue, BookingError> {
        let mut tx = self.db.pool.begin().await?;

        let venue = sqlx::query_as::<_, Venue>(
            r#"
            INSERT INTO "Venue" (
                name, city, state, address, phone, image_link, facebook_link,
                genres, website, seeking_talent, seeking_description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&form.name)
        .bind(&form.city)
        .bind(&form.state)
        .bind(&form.address)
        .bind(&form.phone)
        .bind(&form.image_link)
        .bind(&form.facebook_link)
        .bind(form.genres.to_stored())
        .bind(&form.website)
        .bind(form.seeking_talent)
        .bind(&form.seeking_description)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Venue {} created with id {}", venue.name, venue.id);
        Ok(venue)
    }

    async fn update_venue(&self, id: i32, form: &VenueForm) -> Result<Venue, BookingError> {
        let mut tx = self.db.pool.begin().await?;

        let updated = sqlx::query_as::<_, Venue>(
            r#"
            UPDATE "Venue"
            SET name = $1, city = $2, state = $3, address = $4, phone = $5,
                image_link = $6, facebook_link = $7, genres = $8, website = $9,
                seeking_talent = $10, seeking_description = $11
            WHERE id = $12
            RETURNING *
            "#,
        )
        .bind(&form.name)
        .bind(&form.city)
        .bind(&form.state)
        .bind(&form.address)
        .bind(&form.phone)
        .bind(&form.image_link)
        .bind(&form.facebook_link)
        .bind(form.genres.to_stored())
        .bind(&form.website)
        .bind(form.seeking_talent)
        .bind(&form.seeking_description)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let venue = updated.ok_or_else(|| BookingError::not_found(EntityKind::Venue, id))?;
        tx.commit().await?;
        Ok(venue)
    }

    async fn delete_venue(&self, id: i32) -> Result<u64, BookingError> {
        self.delete_with_shows(EntityKind::Venue, "venue_id", id).await
    }

    /* ---------- ARTISTS ---------- */

    async fn list_artists(&self) -> Result<Vec<Artist>, BookingError> {
        let artists = sqlx::query_as::<_, Artist>(r#"SELECT * FROM "Artist" ORDER BY id"#)
            .fetch_all(&self.db.pool)
            .await?;
        Ok(artists)
    }

    async fn find_artist(&self, id: i32) -> Result<Option<Artist>, BookingError> {
        let artist = sqlx::query_as::<_, Artist>(r#"SELECT * FROM "Artist" WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.db.pool)
            .await?;
        Ok(artist)
    }

    async fn insert_artist(&self, form: &ArtistForm) -> Result<Artist, BookingError> {
        let mut tx = self.db.pool.begin().await?;

        let artist = sqlx::query_as::<_, Artist>(
            r#"
            INSERT INTO "Artist" (
                name, city, state, phone, genres, image_link, facebook_link,
                seeking_venue, website, seeking_description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&form.name)
        .bind(&form.city)
        .bind(&form.state)
        .bind(&form.phone)
        .bind(form.genres.to_stored())
        .bind(&form.image_link)
        .bind(&form.facebook_link)
        .bind(form.seeking_venue)
        .bind(&form.website)
        .bind(&form.seeking_description)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Artist {} created with id {}", artist.name, artist.id);
        Ok(artist)
    }

    async fn update_artist(&self, id: i32, form: &ArtistForm) -> Result<Artist, BookingError> {
        let mut tx = self.db.pool.begin().await?;

        let updated = sqlx::query_as::<_, Artist>(
            r#"
            UPDATE "Artist"
            SET name = $1, city = $2, state = $3, phone = $4, genres = $5,
                image_link = $6, facebook_link = $7, seeking_venue = $8,
                website = $9, seeking_description = $10
            WHERE id = $11
            RETURNING *
            "#,
        )
        .bind(&form.name)
        .bind(&form.city)
        .bind(&form.state)
        .bind(&form.phone)
        .bind(form.genres.to_stored())
        .bind(&form.image_link)
        .bind(&form.facebook_link)
        .bind(form.seeking_venue)
        .bind(&form.website)
        .bind(&form.seeking_description)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let artist = updated.ok_or_else(|| BookingError::not_found(EntityKind::Artist, id))?;
        tx.commit().await?;
        Ok(artist)
    }

    async fn delete_artist(&self, id: i32) -> Result<u64, BookingError> {
        self.delete_with_shows(EntityKind::Artist, "artist_id", id).await
    }

    /* ---------- SHOWS ---------- */

    async fn list_shows(&self) -> Result<Vec<ShowListing>, BookingError> {
        let sql = format!("{SHOW_LISTING_SELECT} ORDER BY s.start_time, s.id");
        let shows = sqlx::query_as::<_, ShowListing>(&sql)
            .fetch_all(&self.db.pool)
            .await?;
        Ok(shows)
    }

    async fn shows_for_venue(&self, venue_id: i32) -> Result<Vec<ShowListing>, BookingError> {
        self.listings_where("venue_id", venue_id).await
    }

    async fn shows_for_artist(&self, artist_id: i32) -> Result<Vec<ShowListing>, BookingError> {
        self.listings_where("artist_id", artist_id).await
    }

    async fn insert_show(&self, form: &ShowForm) -> Result<Show, BookingError> {
        let mut tx = self.db.pool.begin().await?;

        // Dropping `tx` on the early returns rolls it back
        if !row_exists(&mut tx, EntityKind::Artist, form.artist_id).await? {
            return Err(BookingError::InvalidReference {
                entity: EntityKind::Artist,
                id: form.artist_id,
            });
        }
        if !row_exists(&mut tx, EntityKind::Venue, form.venue_id).await? {
            return Err(BookingError::InvalidReference {
                entity: EntityKind::Venue,
                id: form.venue_id,
            });
        }

        let show = sqlx::query_as::<_, Show>(
            r#"
            INSERT INTO "Show" (start_time, venue_id, artist_id)
            VALUES ($1, $2, $3)
            RETURNING id, start_time, venue_id, artist_id
            "#,
        )
        .bind(form.start_time)
        .bind(form.venue_id)
        .bind(form.artist_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(
            "Show {} booked: artist {} at venue {}",
            show.id, show.artist_id, show.venue_id
        );
        Ok(show)
    }

    /* ---------- SEARCH ---------- */

    async fn search_venues(&self, needle: &str) -> Result<Vec<SearchSummary>, BookingError> {
        self.search(EntityKind::Venue, "venue_id", needle).await
    }

    async fn search_artists(&self, needle: &str) -> Result<Vec<SearchSummary>, BookingError> {
        self.search(EntityKind::Artist, "artist_id", needle).await
    }
}
