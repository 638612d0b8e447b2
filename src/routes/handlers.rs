use std::time::{Duration, Instant};

use bytes::Bytes;
use log::{debug, o};
use url::Url;
use warp::{
    http::{header::LOCATION, StatusCode},
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::aggregation::{group_by_area, partition_by_time};
use crate::artist::ArtistDetail;
use crate::environment::Environment;
use crate::errors::BookingError;
use crate::form::{parse_artist, parse_search_term, parse_show, parse_venue, FormData, FormDocument};
use crate::routes::{
    rejection::{Context, Rejection},
    response::SuccessResponse,
};
use crate::summary::Id;
use crate::venue::VenueDetail;

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($body:tt)+) => {{
        let start = Instant::now();

        let result = { $($body)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    }};
}

fn reject_with(context: Context) -> impl FnOnce(BookingError) -> reject::Rejection {
    move |e| reject::custom(Rejection::new(context, e))
}

pub async fn home(environment: Environment) -> RouteResult {
    timed! {
        let urls = &environment.urls;
        let links = (|| -> Result<_, BookingError> {
            Ok(SuccessResponse::Home {
                venues: urls.venues()?.to_string(),
                artists: urls.artists()?.to_string(),
                shows: urls.shows()?.to_string(),
            })
        })()
        .map_err(reject_with(Context::home()))?;

        json(&links)
    }
}

pub async fn venues(environment: Environment) -> RouteResult {
    timed! {
        let venues = environment
            .db
            .venues()
            .await
            .map_err(reject_with(Context::venues()))?;

        json(&group_by_area(venues))
    }
}

pub async fn search_venues(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let term = parse_search_term(&FormData::parse(&body));

        debug!(environment.logger, "Searching venues..."; "term" => &term);
        let results = environment
            .db
            .search_venues(&term)
            .await
            .map_err(reject_with(Context::search_venues(term.clone())))?;

        json(&SuccessResponse::search(results))
    }
}

pub async fn venue(environment: Environment, id: Id) -> RouteResult {
    timed! {
        let error_handler = || reject_with(Context::venue(id));

        let venue = environment
            .db
            .venue(id)
            .await
            .map_err(error_handler())?
            .ok_or_else(|| error_handler()(BookingError::venue_not_found(id)))?;

        let shows = environment
            .db
            .venue_shows(id)
            .await
            .map_err(error_handler())?;

        let (past_shows, upcoming_shows) = partition_by_time(shows, environment.now());

        json(&VenueDetail::new(venue, past_shows, upcoming_shows))
    }
}

pub async fn venue_create_form(_environment: Environment) -> RouteResult {
    timed! {
        json(&FormDocument::blank_venue())
    }
}

pub async fn create_venue(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let form = FormData::parse(&body);
        let error_handler = || reject_with(Context::create_venue(form.get("name").map(str::to_owned)));

        let fields = parse_venue(&form).map_err(error_handler())?;
        let name = fields.name.clone();

        let logger = environment.logger.new(o!("name" => name.clone()));

        debug!(logger, "Inserting venue...");
        let id = environment
            .db
            .insert_venue(fields)
            .await
            .map_err(error_handler())?;

        debug!(logger, "Inserted venue"; "id" => id);
        let location = environment.urls.venue(id).map_err(error_handler())?;

        see_other(
            location,
            SuccessResponse::flash(format!("Venue {} was successfully listed!", name), Some(id)),
        )
    }
}

pub async fn venue_edit_form(environment: Environment, id: Id) -> RouteResult {
    timed! {
        let error_handler = || reject_with(Context::venue_form(Some(id)));

        let venue = environment
            .db
            .venue(id)
            .await
            .map_err(error_handler())?
            .ok_or_else(|| error_handler()(BookingError::venue_not_found(id)))?;

        json(&FormDocument::venue(venue.fields))
    }
}

pub async fn edit_venue(environment: Environment, id: Id, body: Bytes) -> RouteResult {
    timed! {
        let existing = environment
            .db
            .venue(id)
            .await
            .map_err(reject_with(Context::venue(id)))?
            .ok_or_else(|| reject_with(Context::venue(id))(BookingError::venue_not_found(id)))?;

        let error_handler = || reject_with(Context::edit_venue(id, existing.fields.name.clone()));

        let fields = parse_venue(&FormData::parse(&body)).map_err(error_handler())?;
        let name = fields.name.clone();

        debug!(environment.logger, "Updating venue..."; "id" => id, "name" => &name);
        environment
            .db
            .update_venue(id, fields)
            .await
            .map_err(error_handler())?;

        let location = environment.urls.venue(id).map_err(error_handler())?;

        see_other(
            location,
            SuccessResponse::flash(format!("Venue {} was successfully updated!", name), Some(id)),
        )
    }
}

pub async fn delete_venue(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = || reject_with(Context::delete_venue(id.clone()));

        let id = id
            .parse::<Id>()
            .map_err(|_| BookingError::InvalidId(id.clone()))
            .map_err(error_handler())?;

        debug!(environment.logger, "Deleting venue..."; "id" => id);
        environment
            .db
            .delete_venue(id)
            .await
            .map_err(error_handler())?;

        json(&SuccessResponse::deleted())
    }
}

pub async fn artists(environment: Environment) -> RouteResult {
    timed! {
        let artists = environment
            .db
            .artists()
            .await
            .map_err(reject_with(Context::artists()))?;

        json(&artists)
    }
}

pub async fn search_artists(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let term = parse_search_term(&FormData::parse(&body));

        debug!(environment.logger, "Searching artists..."; "term" => &term);
        let results = environment
            .db
            .search_artists(&term)
            .await
            .map_err(reject_with(Context::search_artists(term.clone())))?;

        json(&SuccessResponse::search(results))
    }
}

pub async fn artist(environment: Environment, id: Id) -> RouteResult {
    timed! {
        let error_handler = || reject_with(Context::artist(id));

        let artist = environment
            .db
            .artist(id)
            .await
            .map_err(error_handler())?
            .ok_or_else(|| error_handler()(BookingError::artist_not_found(id)))?;

        let shows = environment
            .db
            .artist_shows(id)
            .await
            .map_err(error_handler())?;

        let (past_shows, upcoming_shows) = partition_by_time(shows, environment.now());

        json(&ArtistDetail::new(artist, past_shows, upcoming_shows))
    }
}

pub async fn artist_create_form(_environment: Environment) -> RouteResult {
    timed! {
        json(&FormDocument::blank_artist())
    }
}

pub async fn create_artist(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let form = FormData::parse(&body);
        let error_handler = || reject_with(Context::create_artist(form.get("name").map(str::to_owned)));

        let fields = parse_artist(&form).map_err(error_handler())?;
        let name = fields.name.clone();

        let logger = environment.logger.new(o!("name" => name.clone()));

        debug!(logger, "Inserting artist...");
        let id = environment
            .db
            .insert_artist(fields)
            .await
            .map_err(error_handler())?;

        debug!(logger, "Inserted artist"; "id" => id);
        let location = environment.urls.artist(id).map_err(error_handler())?;

        see_other(
            location,
            SuccessResponse::flash(format!("Artist {} was successfully listed!", name), Some(id)),
        )
    }
}

pub async fn artist_edit_form(environment: Environment, id: Id) -> RouteResult {
    timed! {
        let error_handler = || reject_with(Context::artist_form(Some(id)));

        let artist = environment
            .db
            .artist(id)
            .await
            .map_err(error_handler())?
            .ok_or_else(|| error_handler()(BookingError::artist_not_found(id)))?;

        json(&FormDocument::artist(artist.fields))
    }
}

pub async fn edit_artist(environment: Environment, id: Id, body: Bytes) -> RouteResult {
    timed! {
        let existing = environment
            .db
            .artist(id)
            .await
            .map_err(reject_with(Context::artist(id)))?
            .ok_or_else(|| reject_with(Context::artist(id))(BookingError::artist_not_found(id)))?;

        let error_handler = || reject_with(Context::edit_artist(id, existing.fields.name.clone()));

        let fields = parse_artist(&FormData::parse(&body)).map_err(error_handler())?;
        let name = fields.name.clone();

        debug!(environment.logger, "Updating artist..."; "id" => id, "name" => &name);
        environment
            .db
            .update_artist(id, fields)
            .await
            .map_err(error_handler())?;

        let location = environment.urls.artist(id).map_err(error_handler())?;

        see_other(
            location,
            SuccessResponse::flash(format!("Artist {} was successfully updated!", name), Some(id)),
        )
    }
}

pub async fn shows(environment: Environment) -> RouteResult {
    timed! {
        let shows = environment
            .db
            .shows()
            .await
            .map_err(reject_with(Context::shows()))?;

        json(&shows)
    }
}

pub async fn show_create_form(environment: Environment) -> RouteResult {
    timed! {
        json(&FormDocument::blank_show(environment.now()))
    }
}

pub async fn create_show(environment: Environment, body: Bytes) -> RouteResult {
    timed! {
        let error_handler = || reject_with(Context::create_show());

        let show = parse_show(&FormData::parse(&body)).map_err(error_handler())?;

        debug!(environment.logger, "Inserting show..."; "venue_id" => show.venue_id, "artist_id" => show.artist_id);
        environment
            .db
            .insert_show(show)
            .await
            .map_err(error_handler())?;

        let location = environment.urls.shows().map_err(error_handler())?;

        see_other(
            location,
            SuccessResponse::flash("Show was successfully listed!".to_owned(), None),
        )
    }
}

/// Points the client at `location`, with a message for it to show there.
fn see_other(location: Url, flash: SuccessResponse<'_>) -> impl Reply {
    with_header(
        with_status(json(&flash), StatusCode::SEE_OTHER),
        LOCATION,
        location.as_str(),
    )
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
