use futures::future::BoxFuture;

use crate::artist::{Artist, ArtistFields};
use crate::errors::BookingError;
use crate::show::{ArtistShow, NewShow, ShowListing, VenueShow};
use crate::summary::{Id, Summary};
use crate::venue::{Venue, VenueFields};

#[cfg(test)]
pub(crate) mod mock;

pub trait Db {
    /// Makes a round trip to the database.
    fn check(&self) -> BoxFuture<Result<(), BookingError>>;

    /// Every venue, in ID order.
    fn venues(&self) -> BoxFuture<Result<Vec<Venue>, BookingError>>;

    /// Venues whose names contain `term`, ignoring case.
    fn search_venues(&self, term: &str) -> BoxFuture<Result<Vec<Summary>, BookingError>>;

    fn venue(&self, id: Id) -> BoxFuture<Result<Option<Venue>, BookingError>>;

    /// Every show at the given venue, along with who plays it.
    fn venue_shows(&self, id: Id) -> BoxFuture<Result<Vec<ArtistShow>, BookingError>>;

    fn insert_venue(&self, fields: VenueFields) -> BoxFuture<Result<Id, BookingError>>;

    /// Replaces every field of an existing venue.
    fn update_venue(&self, id: Id, fields: VenueFields) -> BoxFuture<Result<(), BookingError>>;

    /// Deletes a venue and its shows.
    fn delete_venue(&self, id: Id) -> BoxFuture<Result<(), BookingError>>;

    /// Every artist, in ID order.
    fn artists(&self) -> BoxFuture<Result<Vec<Summary>, BookingError>>;

    /// Artists whose names contain `term`, ignoring case.
    fn search_artists(&self, term: &str) -> BoxFuture<Result<Vec<Summary>, BookingError>>;

    fn artist(&self, id: Id) -> BoxFuture<Result<Option<Artist>, BookingError>>;

    /// Every show by the given artist, along with where it is.
    fn artist_shows(&self, id: Id) -> BoxFuture<Result<Vec<VenueShow>, BookingError>>;

    fn insert_artist(&self, fields: ArtistFields) -> BoxFuture<Result<Id, BookingError>>;

    /// Replaces every field of an existing artist.
    fn update_artist(&self, id: Id, fields: ArtistFields)
        -> BoxFuture<Result<(), BookingError>>;

    /// Every show, with its venue and artist.
    fn shows(&self) -> BoxFuture<Result<Vec<ShowListing>, BookingError>>;

    fn insert_show(&self, show: NewShow) -> BoxFuture<Result<(), BookingError>>;
}

/// Escapes the wildcards of a `LIKE` pattern so that `term` only
/// matches itself.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());

    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }

        escaped.push(c);
    }

    escaped
}

pub use self::postgres::*;

mod postgres {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::{
        self,
        postgres::{PgPool, PgRow},
    };

    use super::escape_like;
    use crate::aggregation::{decode_genres, encode_genres};
    use crate::artist::{Artist, ArtistFields};
    use crate::errors::BookingError;
    use crate::show::{ArtistShow, NewShow, ShowListing, VenueShow};
    use crate::summary::{Id, Summary};
    use crate::venue::{Venue, VenueFields};
    use crate::vocabulary::{Genre, State};

    const SHOWS_ID_CONSTRAINT: &str = "shows_primary_key";
    const SHOWS_VENUE_CONSTRAINT: &str = "shows_venue_id_fkey";
    const SHOWS_ARTIST_CONSTRAINT: &str = "shows_artist_id_fkey";

    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }
    }

    // these can be simplified once async functions in traits are stabilized
    impl super::Db for PgDb {
        fn check(&self) -> BoxFuture<Result<(), BookingError>> {
            async move {
                sqlx::query(include_str!("queries/check.sql"))
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(())
            }
            .boxed()
        }

        fn venues(&self) -> BoxFuture<Result<Vec<Venue>, BookingError>> {
            async move {
                let query = sqlx::query(include_str!("queries/venues.sql"));

                let venues = query
                    .try_map(|row: PgRow| new_venue(&row))
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(venues)
            }
            .boxed()
        }

        fn search_venues(&self, term: &str) -> BoxFuture<Result<Vec<Summary>, BookingError>> {
            let pattern = escape_like(term);

            async move {
                let query = sqlx::query_as::<_, Summary>(include_str!("queries/search_venues.sql"));

                let results = query
                    .bind(pattern)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(results)
            }
            .boxed()
        }

        fn venue(&self, id: Id) -> BoxFuture<Result<Option<Venue>, BookingError>> {
            async move {
                let query = sqlx::query(include_str!("queries/venue.sql"));

                let venue = query
                    .bind(id)
                    .try_map(|row: PgRow| new_venue(&row))
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(venue)
            }
            .boxed()
        }

        fn venue_shows(&self, id: Id) -> BoxFuture<Result<Vec<ArtistShow>, BookingError>> {
            async move {
                let query = sqlx::query_as::<_, ArtistShow>(include_str!("queries/venue_shows.sql"));

                let shows = query
                    .bind(id)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(shows)
            }
            .boxed()
        }

        fn insert_venue(&self, fields: VenueFields) -> BoxFuture<Result<Id, BookingError>> {
            async move {
                let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

                let query = sqlx::query_as(include_str!("queries/insert_venue.sql"));

                let (id,): (Id,) = query
                    .bind(&fields.name)
                    .bind(&fields.city)
                    .bind(fields.state.label())
                    .bind(&fields.address)
                    .bind(&fields.phone)
                    .bind(&fields.image_link)
                    .bind(&fields.facebook_link)
                    .bind(&fields.website)
                    .bind(encode_genres(&fields.genres))
                    .bind(fields.seeking_talent)
                    .bind(&fields.seeking_description)
                    .fetch_one(&mut tx)
                    .await
                    .map_err(map_sqlx_error)?;

                tx.commit().await.map_err(map_sqlx_error)?;

                Ok(id)
            }
            .boxed()
        }

        fn update_venue(&self, id: Id, fields: VenueFields) -> BoxFuture<Result<(), BookingError>> {
            async move {
                let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

                let query = sqlx::query(include_str!("queries/update_venue.sql"));

                let rows = query
                    .bind(id)
                    .bind(&fields.name)
                    .bind(&fields.city)
                    .bind(fields.state.label())
                    .bind(&fields.address)
                    .bind(&fields.phone)
                    .bind(&fields.image_link)
                    .bind(&fields.facebook_link)
                    .bind(&fields.website)
                    .bind(encode_genres(&fields.genres))
                    .bind(fields.seeking_talent)
                    .bind(&fields.seeking_description)
                    .execute(&mut tx)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if rows == 0 {
                    return Err(BookingError::venue_not_found(id));
                }

                tx.commit().await.map_err(map_sqlx_error)?;

                Ok(())
            }
            .boxed()
        }

        fn delete_venue(&self, id: Id) -> BoxFuture<Result<(), BookingError>> {
            async move {
                let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

                let query = sqlx::query(include_str!("queries/delete_venue.sql"));

                let rows = query
                    .bind(id)
                    .execute(&mut tx)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if rows == 0 {
                    return Err(BookingError::venue_not_found(id));
                }

                tx.commit().await.map_err(map_sqlx_error)?;

                Ok(())
            }
            .boxed()
        }

        fn artists(&self) -> BoxFuture<Result<Vec<Summary>, BookingError>> {
            async move {
                let query = sqlx::query_as::<_, Summary>(include_str!("queries/artists.sql"));

                let artists = query.fetch_all(&self.pool).await.map_err(map_sqlx_error)?;

                Ok(artists)
            }
            .boxed()
        }

        fn search_artists(&self, term: &str) -> BoxFuture<Result<Vec<Summary>, BookingError>> {
            let pattern = escape_like(term);

            async move {
                let query =
                    sqlx::query_as::<_, Summary>(include_str!("queries/search_artists.sql"));

                let results = query
                    .bind(pattern)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(results)
            }
            .boxed()
        }

        fn artist(&self, id: Id) -> BoxFuture<Result<Option<Artist>, BookingError>> {
            async move {
                let query = sqlx::query(include_str!("queries/artist.sql"));

                let artist = query
                    .bind(id)
                    .try_map(|row: PgRow| new_artist(&row))
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(artist)
            }
            .boxed()
        }

        fn artist_shows(&self, id: Id) -> BoxFuture<Result<Vec<VenueShow>, BookingError>> {
            async move {
                let query = sqlx::query_as::<_, VenueShow>(include_str!("queries/artist_shows.sql"));

                let shows = query
                    .bind(id)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(shows)
            }
            .boxed()
        }

        fn insert_artist(&self, fields: ArtistFields) -> BoxFuture<Result<Id, BookingError>> {
            async move {
                let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

                let query = sqlx::query_as(include_str!("queries/insert_artist.sql"));

                let (id,): (Id,) = query
                    .bind(&fields.name)
                    .bind(&fields.city)
                    .bind(fields.state.label())
                    .bind(&fields.phone)
                    .bind(encode_genres(&fields.genres))
                    .bind(&fields.image_link)
                    .bind(&fields.facebook_link)
                    .bind(&fields.website)
                    .bind(fields.seeking_venue)
                    .bind(&fields.seeking_description)
                    .fetch_one(&mut tx)
                    .await
                    .map_err(map_sqlx_error)?;

                tx.commit().await.map_err(map_sqlx_error)?;

                Ok(id)
            }
            .boxed()
        }

        fn update_artist(
            &self,
            id: Id,
            fields: ArtistFields,
        ) -> BoxFuture<Result<(), BookingError>> {
            async move {
                let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

                let query = sqlx::query(include_str!("queries/update_artist.sql"));

                let rows = query
                    .bind(id)
                    .bind(&fields.name)
                    .bind(&fields.city)
                    .bind(fields.state.label())
                    .bind(&fields.phone)
                    .bind(encode_genres(&fields.genres))
                    .bind(&fields.image_link)
                    .bind(&fields.facebook_link)
                    .bind(&fields.website)
                    .bind(fields.seeking_venue)
                    .bind(&fields.seeking_description)
                    .execute(&mut tx)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                if rows == 0 {
                    return Err(BookingError::artist_not_found(id));
                }

                tx.commit().await.map_err(map_sqlx_error)?;

                Ok(())
            }
            .boxed()
        }

        fn shows(&self) -> BoxFuture<Result<Vec<ShowListing>, BookingError>> {
            async move {
                let query = sqlx::query_as::<_, ShowListing>(include_str!("queries/shows.sql"));

                let shows = query.fetch_all(&self.pool).await.map_err(map_sqlx_error)?;

                Ok(shows)
            }
            .boxed()
        }

        fn insert_show(&self, show: NewShow) -> BoxFuture<Result<(), BookingError>> {
            async move {
                let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

                let query = sqlx::query(include_str!("queries/insert_show.sql"));

                query
                    .bind(show.venue_id)
                    .bind(show.artist_id)
                    .bind(show.start_time)
                    .execute(&mut tx)
                    .await
                    .map_err(|e| map_show_error(e, &show))?;

                tx.commit().await.map_err(map_sqlx_error)?;

                Ok(())
            }
            .boxed()
        }
    }

    fn new_venue(row: &PgRow) -> Result<Venue, sqlx::Error> {
        let fields = VenueFields {
            name: try_get(row, "name")?,
            city: try_get(row, "city")?,
            state: try_get_state(row)?,
            address: try_get(row, "address")?,
            phone: try_get(row, "phone")?,
            image_link: try_get(row, "image_link")?,
            facebook_link: try_get(row, "facebook_link")?,
            website: try_get(row, "website")?,
            genres: try_get_genres(row)?,
            seeking_talent: try_get(row, "seeking_talent")?,
            seeking_description: try_get(row, "seeking_description")?,
        };

        Ok(Venue::new(try_get(row, "id")?, fields))
    }

    fn new_artist(row: &PgRow) -> Result<Artist, sqlx::Error> {
        let fields = ArtistFields {
            name: try_get(row, "name")?,
            city: try_get(row, "city")?,
            state: try_get_state(row)?,
            phone: try_get(row, "phone")?,
            genres: try_get_genres(row)?,
            image_link: try_get(row, "image_link")?,
            facebook_link: try_get(row, "facebook_link")?,
            website: try_get(row, "website")?,
            seeking_venue: try_get(row, "seeking_venue")?,
            seeking_description: try_get(row, "seeking_description")?,
        };

        Ok(Artist::new(try_get(row, "id")?, fields))
    }

    fn try_get<'a, T: sqlx::Type<sqlx::Postgres> + sqlx::decode::Decode<'a, sqlx::Postgres>>(
        row: &'a PgRow,
        column: &str,
    ) -> Result<T, sqlx::Error> {
        use sqlx::prelude::*;

        row.try_get(column)
    }

    fn try_get_state(row: &PgRow) -> Result<State, sqlx::Error> {
        let value: String = try_get(row, "state")?;

        value
            .parse()
            .map_err(|_| invalid_stored_value("state", value))
    }

    fn try_get_genres(row: &PgRow) -> Result<Vec<Genre>, sqlx::Error> {
        let value: String = try_get(row, "genres")?;

        match decode_genres(&value) {
            Ok(genres) if !genres.is_empty() => Ok(genres),
            _ => Err(invalid_stored_value("genres", value)),
        }
    }

    // only reachable if rows were written outside this service
    fn invalid_stored_value(column: &'static str, value: String) -> sqlx::Error {
        sqlx::Error::Decode(Box::new(BookingError::InvalidStoredValue { column, value }))
    }

    fn map_show_error(error: sqlx::Error, show: &NewShow) -> BookingError {
        use sqlx::Error;

        match error {
            Error::Database(ref e) if e.constraint() == Some(SHOWS_ID_CONSTRAINT) => {
                BookingError::DuplicateShow
            }
            Error::Database(ref e) if e.constraint() == Some(SHOWS_VENUE_CONSTRAINT) => {
                BookingError::UnknownVenue(show.venue_id)
            }
            Error::Database(ref e) if e.constraint() == Some(SHOWS_ARTIST_CONSTRAINT) => {
                BookingError::UnknownArtist(show.artist_id)
            }
            _ => map_sqlx_error(error),
        }
    }

    fn map_sqlx_error(error: sqlx::Error) -> BookingError {
        BookingError::Sqlx { source: error }
    }
}
