use serde::Serialize;

use crate::show::VenueShow;
use crate::summary::Id;
use crate::vocabulary::{Genre, State};

/// Everything about an artist that a submission can set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArtistFields {
    pub name: String,
    pub city: String,
    pub state: State,
    pub phone: Option<String>,

    /// Never empty.
    pub genres: Vec<Genre>,

    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

/// A single artist in the database.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Artist {
    pub id: Id,

    #[serde(flatten)]
    pub fields: ArtistFields,
}

impl Artist {
    pub fn new(id: Id, fields: ArtistFields) -> Self {
        Artist { id, fields }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ArtistDetail {
    #[serde(flatten)]
    artist: Artist,

    past_shows: Vec<VenueShow>,
    upcoming_shows: Vec<VenueShow>,
    past_shows_count: usize,
    upcoming_shows_count: usize,
}

impl ArtistDetail {
    pub fn new(artist: Artist, past_shows: Vec<VenueShow>, upcoming_shows: Vec<VenueShow>) -> Self {
        ArtistDetail {
            artist,
            past_shows_count: past_shows.len(),
            upcoming_shows_count: upcoming_shows.len(),
            past_shows,
            upcoming_shows,
        }
    }
}
