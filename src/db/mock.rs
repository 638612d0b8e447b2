use std::collections::BTreeMap;
use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt};

use crate::artist::{Artist, ArtistFields};
use crate::db::Db;
use crate::errors::BookingError;
use crate::show::{ArtistShow, NewShow, ShowListing, VenueShow};
use crate::summary::{Id, Summary};
use crate::venue::{Venue, VenueFields};

#[derive(Default)]
struct Tables {
    last_venue_id: Id,
    last_artist_id: Id,
    venues: BTreeMap<Id, VenueFields>,
    artists: BTreeMap<Id, ArtistFields>,
    shows: Vec<NewShow>,
}

/// Hands out IDs the way a `SERIAL` column does, one sequence per
/// table.
fn next_id(last: &mut Id) -> Id {
    *last += 1;
    *last
}

/// An in-memory database that enforces the same keys as the real
/// schema.
#[derive(Default)]
pub(crate) struct MockDb {
    tables: RwLock<Tables>,
    unavailable: bool,
}

impl MockDb {
    pub(crate) fn unavailable() -> Self {
        MockDb {
            unavailable: true,
            ..Default::default()
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> Result<T, BookingError> {
        self.fail_if_unavailable()?;

        Ok(f(&self.tables.read().unwrap()))
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<T, BookingError>,
    ) -> Result<T, BookingError> {
        self.fail_if_unavailable()?;

        f(&mut self.tables.write().unwrap())
    }

    fn fail_if_unavailable(&self) -> Result<(), BookingError> {
        if self.unavailable {
            Err(BookingError::Sqlx {
                source: sqlx::Error::PoolTimedOut,
            })
        } else {
            Ok(())
        }
    }
}

fn contains_ignoring_case(name: &str, term: &str) -> bool {
    name.to_lowercase().contains(&term.to_lowercase())
}

impl Db for MockDb {
    fn check(&self) -> BoxFuture<Result<(), BookingError>> {
        let result = self.read(|_| ());

        async move { result }.boxed()
    }

    fn venues(&self) -> BoxFuture<Result<Vec<Venue>, BookingError>> {
        let result = self.read(|t| {
            t.venues
                .iter()
                .map(|(&id, fields)| Venue::new(id, fields.clone()))
                .collect()
        });

        async move { result }.boxed()
    }

    fn search_venues(&self, term: &str) -> BoxFuture<Result<Vec<Summary>, BookingError>> {
        let result = self.read(|t| {
            t.venues
                .iter()
                .filter(|(_, v)| contains_ignoring_case(&v.name, term))
                .map(|(&id, v)| Summary::new(id, v.name.clone()))
                .collect()
        });

        async move { result }.boxed()
    }

    fn venue(&self, id: Id) -> BoxFuture<Result<Option<Venue>, BookingError>> {
        let result = self.read(|t| t.venues.get(&id).map(|v| Venue::new(id, v.clone())));

        async move { result }.boxed()
    }

    fn venue_shows(&self, id: Id) -> BoxFuture<Result<Vec<ArtistShow>, BookingError>> {
        let result = self.read(|t| {
            t.shows
                .iter()
                .filter(|s| s.venue_id == id)
                .filter_map(|s| {
                    let artist = t.artists.get(&s.artist_id)?;

                    Some(ArtistShow {
                        artist_id: s.artist_id,
                        artist_name: artist.name.clone(),
                        artist_image_link: artist.image_link.clone(),
                        start_time: s.start_time,
                    })
                })
                .collect()
        });

        async move { result }.boxed()
    }

    fn insert_venue(&self, fields: VenueFields) -> BoxFuture<Result<Id, BookingError>> {
        let result = self.write(|t| {
            let id = next_id(&mut t.last_venue_id);
            t.venues.insert(id, fields);

            Ok(id)
        });

        async move { result }.boxed()
    }

    fn update_venue(&self, id: Id, fields: VenueFields) -> BoxFuture<Result<(), BookingError>> {
        let result = self.write(|t| match t.venues.get_mut(&id) {
            Some(existing) => {
                *existing = fields;
                Ok(())
            }
            None => Err(BookingError::venue_not_found(id)),
        });

        async move { result }.boxed()
    }

    fn delete_venue(&self, id: Id) -> BoxFuture<Result<(), BookingError>> {
        let result = self.write(|t| match t.venues.remove(&id) {
            Some(_) => {
                t.shows.retain(|s| s.venue_id != id);
                Ok(())
            }
            None => Err(BookingError::venue_not_found(id)),
        });

        async move { result }.boxed()
    }

    fn artists(&self) -> BoxFuture<Result<Vec<Summary>, BookingError>> {
        let result = self.read(|t| {
            t.artists
                .iter()
                .map(|(&id, a)| Summary::new(id, a.name.clone()))
                .collect()
        });

        async move { result }.boxed()
    }

    fn search_artists(&self, term: &str) -> BoxFuture<Result<Vec<Summary>, BookingError>> {
        let result = self.read(|t| {
            t.artists
                .iter()
                .filter(|(_, a)| contains_ignoring_case(&a.name, term))
                .map(|(&id, a)| Summary::new(id, a.name.clone()))
                .collect()
        });

        async move { result }.boxed()
    }

    fn artist(&self, id: Id) -> BoxFuture<Result<Option<Artist>, BookingError>> {
        let result = self.read(|t| t.artists.get(&id).map(|a| Artist::new(id, a.clone())));

        async move { result }.boxed()
    }

    fn artist_shows(&self, id: Id) -> BoxFuture<Result<Vec<VenueShow>, BookingError>> {
        let result = self.read(|t| {
            t.shows
                .iter()
                .filter(|s| s.artist_id == id)
                .filter_map(|s| {
                    let venue = t.venues.get(&s.venue_id)?;

                    Some(VenueShow {
                        venue_id: s.venue_id,
                        venue_name: venue.name.clone(),
                        venue_image_link: venue.image_link.clone(),
                        start_time: s.start_time,
                    })
                })
                .collect()
        });

        async move { result }.boxed()
    }

    fn insert_artist(&self, fields: ArtistFields) -> BoxFuture<Result<Id, BookingError>> {
        let result = self.write(|t| {
            let id = next_id(&mut t.last_artist_id);
            t.artists.insert(id, fields);

            Ok(id)
        });

        async move { result }.boxed()
    }

    fn update_artist(
        &self,
        id: Id,
        fields: ArtistFields,
    ) -> BoxFuture<Result<(), BookingError>> {
        let result = self.write(|t| match t.artists.get_mut(&id) {
            Some(existing) => {
                *existing = fields;
                Ok(())
            }
            None => Err(BookingError::artist_not_found(id)),
        });

        async move { result }.boxed()
    }

    fn shows(&self) -> BoxFuture<Result<Vec<ShowListing>, BookingError>> {
        let result = self.read(|t| {
            t.shows
                .iter()
                .filter_map(|s| {
                    let venue = t.venues.get(&s.venue_id)?;
                    let artist = t.artists.get(&s.artist_id)?;

                    Some(ShowListing {
                        venue_id: s.venue_id,
                        venue_name: venue.name.clone(),
                        venue_image_link: venue.image_link.clone(),
                        artist_id: s.artist_id,
                        artist_name: artist.name.clone(),
                        artist_image_link: artist.image_link.clone(),
                        start_time: s.start_time,
                    })
                })
                .collect()
        });

        async move { result }.boxed()
    }

    fn insert_show(&self, show: NewShow) -> BoxFuture<Result<(), BookingError>> {
        let result = self.write(|t| {
            if !t.venues.contains_key(&show.venue_id) {
                return Err(BookingError::UnknownVenue(show.venue_id));
            }

            if !t.artists.contains_key(&show.artist_id) {
                return Err(BookingError::UnknownArtist(show.artist_id));
            }

            if t.shows.contains(&show) {
                return Err(BookingError::DuplicateShow);
            }

            t.shows.push(show);

            Ok(())
        });

        async move { result }.boxed()
    }
}
