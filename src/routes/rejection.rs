use serde::Serialize;
use warp::reject;

use crate::errors::BookingError;
use crate::form::ValidationErrors;
use crate::summary::Id;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BookingError,
}

impl Rejection {
    pub fn new(context: Context, error: BookingError) -> Self {
        Rejection { context, error }
    }

    /// The body sent back to the client. It describes what failed
    /// without revealing why.
    pub fn flatten(&self) -> FailureResponse<'_> {
        use Context::*;

        let message = match &self.context {
            CreateVenue { name, .. } => {
                format!("An error occurred. {} could not be listed.", titled("Venue", name))
            }
            EditVenue { name, .. } => format!("An error occurred. Could not update venue {}.", name),
            CreateArtist { name, .. } => {
                format!("An error occurred. {} could not be listed.", titled("Artist", name))
            }
            EditArtist { name, .. } => {
                format!("An error occurred. Could not update artist {}.", name)
            }
            CreateShow => "An error occurred. Show could not be listed.".to_owned(),
            DeleteVenue { .. } => return FailureResponse::Deletion { state: "failed" },
            _ => return FailureResponse::message_for(&self.error),
        };

        let errors = match &self.error {
            BookingError::Validation(errors) => Some(errors),
            _ => None,
        };

        FailureResponse::Flash {
            message,
            category: "error",
            errors,
        }
    }
}

impl reject::Reject for Rejection {}

fn titled(kind: &str, name: &Option<String>) -> String {
    match name {
        Some(name) => format!("{} {}", kind, name),
        None => kind.to_owned(),
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FailureResponse<'a> {
    Deletion {
        state: &'static str,
    },
    Flash {
        message: String,
        category: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        errors: Option<&'a ValidationErrors>,
    },
    Message {
        message: &'static str,
    },
}

impl FailureResponse<'static> {
    pub fn not_found() -> Self {
        FailureResponse::Message {
            message: "Not found",
        }
    }

    pub fn method_not_allowed() -> Self {
        FailureResponse::Message {
            message: "Method not allowed",
        }
    }

    pub fn length_required() -> Self {
        FailureResponse::Message {
            message: "Length required",
        }
    }

    pub fn payload_too_large() -> Self {
        FailureResponse::Message {
            message: "Payload too large",
        }
    }

    pub fn internal_server_error() -> Self {
        FailureResponse::Message {
            message: "Internal server error",
        }
    }

    fn message_for(error: &BookingError) -> Self {
        match error {
            BookingError::NotFound { .. } => Self::not_found(),
            _ => Self::internal_server_error(),
        }
    }
}

/// Names the route that failed and what it was working on.
#[derive(Clone, Debug)]
pub enum Context {
    Home,
    Venues,
    SearchVenues { term: String },
    Venue { id: Id },
    VenueForm { id: Option<Id> },
    CreateVenue { name: Option<String> },
    EditVenue { id: Id, name: String },
    DeleteVenue { id: String },
    Artists,
    SearchArtists { term: String },
    Artist { id: Id },
    ArtistForm { id: Option<Id> },
    CreateArtist { name: Option<String> },
    EditArtist { id: Id, name: String },
    Shows,
    CreateShow,
}

impl Context {
    pub fn home() -> Context {
        Context::Home
    }

    pub fn venues() -> Context {
        Context::Venues
    }

    pub fn search_venues(term: String) -> Context {
        Context::SearchVenues { term }
    }

    pub fn venue(id: Id) -> Context {
        Context::Venue { id }
    }

    pub fn venue_form(id: Option<Id>) -> Context {
        Context::VenueForm { id }
    }

    pub fn create_venue(name: Option<String>) -> Context {
        Context::CreateVenue { name }
    }

    pub fn edit_venue(id: Id, name: String) -> Context {
        Context::EditVenue { id, name }
    }

    pub fn delete_venue(id: String) -> Context {
        Context::DeleteVenue { id }
    }

    pub fn artists() -> Context {
        Context::Artists
    }

    pub fn search_artists(term: String) -> Context {
        Context::SearchArtists { term }
    }

    pub fn artist(id: Id) -> Context {
        Context::Artist { id }
    }

    pub fn artist_form(id: Option<Id>) -> Context {
        Context::ArtistForm { id }
    }

    pub fn create_artist(name: Option<String>) -> Context {
        Context::CreateArtist { name }
    }

    pub fn edit_artist(id: Id, name: String) -> Context {
        Context::EditArtist { id, name }
    }

    pub fn shows() -> Context {
        Context::Shows
    }

    pub fn create_show() -> Context {
        Context::CreateShow
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn failure_bodies_hide_the_cause() {
        let rejection = Rejection::new(
            Context::create_venue(Some("The Musical Hop".to_owned())),
            BookingError::Sqlx {
                source: sqlx::Error::PoolTimedOut,
            },
        );

        assert_eq!(
            serde_json::to_value(rejection.flatten()).unwrap(),
            json!({
                "message": "An error occurred. Venue The Musical Hop could not be listed.",
                "category": "error",
            })
        );
    }

    #[test]
    fn validation_failures_list_their_fields() {
        let mut errors = ValidationErrors::default();
        errors.add("name", "This field is required.");

        let rejection = Rejection::new(Context::create_artist(None), BookingError::Validation(errors));

        assert_eq!(
            serde_json::to_value(rejection.flatten()).unwrap(),
            json!({
                "message": "An error occurred. Artist could not be listed.",
                "category": "error",
                "errors": {"name": ["This field is required."]},
            })
        );
    }

    #[test]
    fn failed_deletions_only_report_their_state() {
        let rejection = Rejection::new(Context::delete_venue("7".to_owned()), BookingError::venue_not_found(7));

        assert_eq!(
            serde_json::to_value(rejection.flatten()).unwrap(),
            json!({"state": "failed"})
        );
    }
}
