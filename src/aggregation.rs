//! Pure transformations applied to rows after they have been fetched.

use std::collections::HashMap;

use serde::Serialize;
use time::OffsetDateTime;

use crate::show::Scheduled;
use crate::summary::Summary;
use crate::venue::Venue;
use crate::vocabulary::{parse_genres, Genre, State, UnknownGenre};

/// The separator placed between the elements of a stored list.
pub const LIST_DELIMITER: &str = ", ";

/// Joins `values` into their stored form.
///
/// ```
/// use booking::aggregation::encode_list;
/// assert_eq!(encode_list(&["Jazz", "Reggae"]), "Jazz, Reggae");
/// ```
pub fn encode_list<S: AsRef<str>>(values: impl IntoIterator<Item = S>) -> String {
    values
        .into_iter()
        .map(|v| v.as_ref().to_owned())
        .collect::<Vec<_>>()
        .join(LIST_DELIMITER)
}

/// Splits a stored list on each comma, dropping any whitespace that
/// follows it.
///
/// ```
/// use booking::aggregation::decode_list;
/// assert_eq!(decode_list("Jazz,Reggae,\t Swing"), vec!["Jazz", "Reggae", "Swing"]);
/// ```
pub fn decode_list(stored: &str) -> Vec<&str> {
    let mut parts = stored.split(',');
    let mut values: Vec<&str> = parts.next().into_iter().collect();

    values.extend(parts.map(str::trim_start));

    values
}

pub fn encode_genres(genres: &[Genre]) -> String {
    encode_list(genres.iter().map(|g| g.label()))
}

pub fn decode_genres(stored: &str) -> Result<Vec<Genre>, UnknownGenre> {
    parse_genres(decode_list(stored))
}

/// Venues sharing a city and state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Area {
    pub city: String,
    pub state: State,
    pub venues: Vec<Summary>,
}

/// Groups venues by city and state, ignoring the case of the city.
/// Areas appear in the order their first venue does, and take their
/// spelling from it.
pub fn group_by_area(venues: impl IntoIterator<Item = Venue>) -> Vec<Area> {
    let mut areas: Vec<Area> = vec![];
    let mut positions: HashMap<(String, State), usize> = HashMap::new();

    for venue in venues {
        let Venue { id, fields } = venue;
        let key = (fields.city.to_lowercase(), fields.state);
        let summary = Summary::new(id, fields.name);

        match positions.get(&key).copied() {
            Some(position) => areas[position].venues.push(summary),
            None => {
                positions.insert(key, areas.len());
                areas.push(Area {
                    city: fields.city,
                    state: fields.state,
                    venues: vec![summary],
                });
            }
        }
    }

    areas
}

/// Splits `shows` into those strictly before `now` and those strictly
/// after it. A show starting exactly at `now` is in neither.
pub fn partition_by_time<T: Scheduled>(
    shows: impl IntoIterator<Item = T>,
    now: OffsetDateTime,
) -> (Vec<T>, Vec<T>) {
    let mut past = vec![];
    let mut upcoming = vec![];

    for show in shows {
        let start_time = show.start_time();

        if start_time < now {
            past.push(show);
        } else if start_time > now {
            upcoming.push(show);
        }
    }

    (past, upcoming)
}
