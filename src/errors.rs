use thiserror::Error;

use crate::form::ValidationErrors;
use crate::summary::Id;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx { source: sqlx::Error },

    /// Represents a lookup for a row that doesn't exist.
    #[error("no {entity} with ID {id}")]
    NotFound { entity: &'static str, id: Id },

    /// Represents a path segment that isn't an ID.
    #[error("invalid ID: {0}")]
    InvalidId(String),

    /// Represents a submission that failed validation.
    #[error("invalid submission")]
    Validation(ValidationErrors),

    /// Represents a show identical to an existing one.
    #[error("show already exists")]
    DuplicateShow,

    /// Represents a show referring to a missing venue.
    #[error("no venue with ID {0}")]
    UnknownVenue(Id),

    /// Represents a show referring to a missing artist.
    #[error("no artist with ID {0}")]
    UnknownArtist(Id),

    /// Represents a stored value outside its vocabulary.
    #[error("invalid stored value {value:?} in column {column}")]
    InvalidStoredValue { column: &'static str, value: String },

    /// Represents an error while generating a URL.
    #[error("unable to build URL for {path:?}")]
    UnableToBuildUrl {
        path: String,
        source: url::ParseError,
    },
}

impl BookingError {
    pub fn venue_not_found(id: Id) -> Self {
        BookingError::NotFound { entity: "venue", id }
    }

    pub fn artist_not_found(id: Id) -> Self {
        BookingError::NotFound { entity: "artist", id }
    }
}

