use serde::Serialize;

use crate::show::ArtistShow;
use crate::summary::Id;
use crate::vocabulary::{Genre, State};

/// Everything about a venue that a submission can set. An edit
/// replaces all of it at once.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VenueFields {
    pub name: String,
    pub city: String,
    pub state: State,
    pub address: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,

    /// Never empty.
    pub genres: Vec<Genre>,

    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

/// A single venue in the database.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Venue {
    pub id: Id,

    #[serde(flatten)]
    pub fields: VenueFields,
}

impl Venue {
    pub fn new(id: Id, fields: VenueFields) -> Self {
        Venue { id, fields }
    }
}

/// A venue together with its shows, split around the time of the
/// request.
#[derive(Clone, Debug, Serialize)]
pub struct VenueDetail {
    #[serde(flatten)]
    venue: Venue,

    past_shows: Vec<ArtistShow>,
    upcoming_shows: Vec<ArtistShow>,
    past_shows_count: usize,
    upcoming_shows_count: usize,
}

impl VenueDetail {
    pub fn new(venue: Venue, past_shows: Vec<ArtistShow>, upcoming_shows: Vec<ArtistShow>) -> Self {
        VenueDetail {
            venue,
            past_shows_count: past_shows.len(),
            upcoming_shows_count: upcoming_shows.len(),
            past_shows,
            upcoming_shows,
        }
    }
}
