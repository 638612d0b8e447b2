use std::convert::Infallible;
use std::sync::Arc;

use log::{error, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, Reply, WithStatus};
use warp::Filter;

use crate::environment::Environment;
use crate::errors::BookingError;

pub mod admin;
mod handlers;
mod rejection;
mod response;

pub use internal::*;

use rejection::FailureResponse;

/// The largest form body to accept.
const MAX_CONTENT_LENGTH: u64 = 64 * 1024;

/// Every public route, with failures turned into JSON replies.
pub fn make_routes(
    environment: Environment,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let logger = environment.logger.clone();

    make_home_route(environment.clone())
        .or(make_venues_route(environment.clone()))
        .or(make_search_venues_route(environment.clone()))
        .or(make_venue_create_form_route(environment.clone()))
        .or(make_create_venue_route(environment.clone()))
        .or(make_venue_route(environment.clone()))
        .or(make_venue_edit_form_route(environment.clone()))
        .or(make_edit_venue_route(environment.clone()))
        .or(make_delete_venue_route(environment.clone()))
        .or(make_artists_route(environment.clone()))
        .or(make_search_artists_route(environment.clone()))
        .or(make_artist_create_form_route(environment.clone()))
        .or(make_create_artist_route(environment.clone()))
        .or(make_artist_route(environment.clone()))
        .or(make_artist_edit_form_route(environment.clone()))
        .or(make_edit_artist_route(environment.clone()))
        .or(make_shows_route(environment.clone()))
        .or(make_show_create_form_route(environment.clone()))
        .or(make_create_show_route(environment))
        .recover(move |r| format_rejection(logger.clone(), r))
}

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, Infallible> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        error!(logger, "Request failed"; "context" => ?r.context, "error" => ?r.error, "status" => %status_code_for(e), "message" => %r.error);
        let flattened = r.flatten();

        return Ok(with_status(json(&flattened), status_code_for(e)));
    }

    let (response, status) = if rej.is_not_found() {
        (FailureResponse::not_found(), StatusCode::NOT_FOUND)
    } else if rej.find::<reject::MethodNotAllowed>().is_some() {
        (
            FailureResponse::method_not_allowed(),
            StatusCode::METHOD_NOT_ALLOWED,
        )
    } else if rej.find::<reject::LengthRequired>().is_some() {
        (
            FailureResponse::length_required(),
            StatusCode::LENGTH_REQUIRED,
        )
    } else if rej.find::<reject::PayloadTooLarge>().is_some() {
        (
            FailureResponse::payload_too_large(),
            StatusCode::PAYLOAD_TOO_LARGE,
        )
    } else {
        error!(logger, "Unhandled rejection"; "rejection" => ?rej);
        (
            FailureResponse::internal_server_error(),
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    };

    Ok(with_status(json(&response), status))
}

fn status_code_for(e: &BookingError) -> StatusCode {
    use BookingError::*;

    match e {
        NotFound { .. } => StatusCode::NOT_FOUND,
        InvalidId(_) | Validation(_) | UnknownVenue(_) | UnknownArtist(_) => {
            StatusCode::BAD_REQUEST
        }
        DuplicateShow => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

mod internal {
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{body, delete, get as g, path as p, path::param as par, post};

    use super::{handlers, MAX_CONTENT_LENGTH};
    use crate::environment::Environment;
    use crate::summary::Id;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route {
        ($name:ident => $handler:ident; $($filters:expr),+) => (
            pub fn $name(environment: Environment) -> Route {
                warp::any()
                    .map(move || environment.clone())
                    $(.and($filters))+
                    .and_then(handlers::$handler)
                    .boxed()
            }
        );
    }

    macro_rules! form {
        () => {
            body::content_length_limit(MAX_CONTENT_LENGTH).and(body::bytes())
        };
    }

    route!(make_home_route => home; end(), g());

    route!(make_venues_route => venues; p("venues"), end(), g());
    route!(make_search_venues_route => search_venues; p!("venues" / "search"), end(), post(), form!());
    route!(make_venue_create_form_route => venue_create_form; p!("venues" / "create"), end(), g());
    route!(make_create_venue_route => create_venue; p!("venues" / "create"), end(), post(), form!());
    route!(make_venue_route => venue; p("venues"), par::<Id>(), end(), g());
    route!(make_venue_edit_form_route => venue_edit_form; p("venues"), par::<Id>(), p("edit"), end(), g());
    route!(make_edit_venue_route => edit_venue; p("venues"), par::<Id>(), p("edit"), end(), post(), form!());
    route!(make_delete_venue_route => delete_venue; p("venues"), par::<String>(), end(), delete());

    route!(make_artists_route => artists; p("artists"), end(), g());
    route!(make_search_artists_route => search_artists; p!("artists" / "search"), end(), post(), form!());
    route!(make_artist_create_form_route => artist_create_form; p!("artists" / "create"), end(), g());
    route!(make_create_artist_route => create_artist; p!("artists" / "create"), end(), post(), form!());
    route!(make_artist_route => artist; p("artists"), par::<Id>(), end(), g());
    route!(make_artist_edit_form_route => artist_edit_form; p("artists"), par::<Id>(), p("edit"), end(), g());
    route!(make_edit_artist_route => edit_artist; p("artists"), par::<Id>(), p("edit"), end(), post(), form!());

    route!(make_shows_route => shows; p("shows"), end(), g());
    route!(make_show_create_form_route => show_create_form; p!("shows" / "create"), end(), g());
    route!(make_create_show_route => create_show; p!("shows" / "create"), end(), post(), form!());
}
