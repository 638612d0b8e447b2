use serde::{Serialize, Serializer};
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::summary::Id;

/// The format used when a start time is sent back to a client.
const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Formats accepted from form submissions, tried in order. All of them
/// are read as UTC.
const INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    OUTPUT_FORMAT,
    "%Y-%m-%dT%H:%M",
];

/// Anything that happens at a single instant.
pub trait Scheduled {
    fn start_time(&self) -> OffsetDateTime;
}

/// A show to be created.
#[derive(Clone, Debug, PartialEq)]
pub struct NewShow {
    pub venue_id: Id,
    pub artist_id: Id,
    pub start_time: OffsetDateTime,
}

/// A show as seen from its venue: who plays, and when.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct ArtistShow {
    pub artist_id: Id,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub start_time: OffsetDateTime,
}

/// A show as seen from its artist: where, and when.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct VenueShow {
    pub venue_id: Id,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub start_time: OffsetDateTime,
}

/// A show with both sides resolved, as listed on the shows page.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct ShowListing {
    pub venue_id: Id,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub artist_id: Id,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub start_time: OffsetDateTime,
}

impl Scheduled for NewShow {
    fn start_time(&self) -> OffsetDateTime {
        self.start_time
    }
}

impl Scheduled for ArtistShow {
    fn start_time(&self) -> OffsetDateTime {
        self.start_time
    }
}

impl Scheduled for VenueShow {
    fn start_time(&self) -> OffsetDateTime {
        self.start_time
    }
}

impl Scheduled for ShowListing {
    fn start_time(&self) -> OffsetDateTime {
        self.start_time
    }
}

pub fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp.to_offset(UtcOffset::UTC).format(OUTPUT_FORMAT)
}

/// Parses a submitted start time in any of the accepted formats.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    INPUT_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(raw, *format).ok())
        .map(PrimitiveDateTime::assume_utc)
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &OffsetDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(*timestamp))
}
