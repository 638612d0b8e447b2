use std::env;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use time::OffsetDateTime;
use warp::http::StatusCode;

use booking::db::PgDb;
use booking::environment::Environment;
use booking::routes;
use booking::urls::Urls;

const BASE_URL: &str = "http://localhost:5000/";

/// Keeps the names used by one run apart from rows left by others.
static RUN_ID: Lazy<String> = Lazy::new(|| {
    let now = OffsetDateTime::now_utc();
    format!("{}{:09}", now.unix_timestamp(), now.nanosecond())
});

fn now() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_589_194_605)
}

struct Reply {
    status: StatusCode,
    location: Option<String>,
    body: Value,
}

#[tokio::test]
async fn api_works() {
    dotenv::dotenv().ok();

    let connection_string = match env::var("BOOKING_DB_CONNECTION_STRING") {
        Ok(connection_string) => connection_string,
        Err(_) => {
            eprintln!("BOOKING_DB_CONNECTION_STRING is not set; skipping");
            return;
        }
    };

    prepare_db(connection_string.clone()).await;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&connection_string)
        .await
        .expect("create database pool from BOOKING_DB_CONNECTION_STRING");

    let environment = Environment::new(
        Arc::new(log::discard()),
        Arc::new(PgDb::new(pool)),
        Arc::new(Urls::new(BASE_URL)),
        Arc::new(now),
    );

    let venue_id = test_create_venue(&environment).await;
    let artist_id = test_create_artist(&environment).await;

    test_search(&environment, venue_id).await;
    test_shows(&environment, venue_id, artist_id).await;
    test_edit_venue(&environment, venue_id).await;
    test_delete_venue(&environment, venue_id, artist_id).await;
}

async fn test_create_venue(environment: &Environment) -> i64 {
    let name = format!("The Musical Hop {}", *RUN_ID);
    let body = format!(
        "name={}&city=San+Francisco&state=CA&address=1015+Folsom+Street&genres=Jazz&genres=Reggae",
        name.replace(' ', "+")
    );

    let created = send(environment, "POST", "/venues/create", &body).await;

    assert_eq!(created.status, StatusCode::SEE_OTHER);
    assert_eq!(created.body["category"], "success");

    let id = created.body["id"].as_i64().expect("venue ID in response");
    assert_eq!(
        created.location,
        Some(format!("{}venues/{}", BASE_URL, id))
    );

    let fetched = send(environment, "GET", &format!("/venues/{}", id), "").await;

    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["name"], json!(name));
    assert_eq!(fetched.body["genres"], json!(["Jazz", "Reggae"]));
    assert_eq!(fetched.body["seeking_talent"], json!(false));

    id
}

async fn test_create_artist(environment: &Environment) -> i64 {
    let body = format!(
        "name=Guns+N+Petals+{}&city=San+Francisco&state=CA&genres=Rock+n+Roll&website=https%3A%2F%2Fwww.gunsnpetalsband.com",
        *RUN_ID
    );

    let created = send(environment, "POST", "/artists/create", &body).await;

    assert_eq!(created.status, StatusCode::SEE_OTHER);

    created.body["id"].as_i64().expect("artist ID in response")
}

async fn test_search(environment: &Environment, venue_id: i64) {
    let term = format!("search_term=MUSICAL+HOP+{}", *RUN_ID);
    let found = send(environment, "POST", "/venues/search", &term).await;

    assert_eq!(found.body["count"], json!(1));
    assert_eq!(found.body["data"][0]["id"], json!(venue_id));

    // wildcards only match themselves
    let term = format!("search_term={}%25", *RUN_ID);
    let found = send(environment, "POST", "/venues/search", &term).await;

    assert_eq!(found.body, json!({"count": 0, "data": []}));
}

async fn test_shows(environment: &Environment, venue_id: i64, artist_id: i64) {
    for start_time in &["2019-06-15+23%3A00%3A00", "2035-04-01T20%3A00"] {
        let body = format!(
            "venue_id={}&artist_id={}&start_time={}",
            venue_id, artist_id, start_time
        );
        let created = send(environment, "POST", "/shows/create", &body).await;

        assert_eq!(created.status, StatusCode::SEE_OTHER, "{}", start_time);
    }

    let body = format!(
        "venue_id={}&artist_id={}&start_time=2035-04-01T20%3A00%3A00",
        venue_id, artist_id
    );
    let duplicate = send(environment, "POST", "/shows/create", &body).await;

    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(
        duplicate.body["message"],
        "An error occurred. Show could not be listed."
    );

    let venue = send(environment, "GET", &format!("/venues/{}", venue_id), "").await;

    assert_eq!(venue.body["past_shows_count"], json!(1));
    assert_eq!(venue.body["upcoming_shows_count"], json!(1));
    assert_eq!(
        venue.body["upcoming_shows"][0]["start_time"],
        "2035-04-01T20:00:00Z"
    );

    let artist = send(environment, "GET", &format!("/artists/{}", artist_id), "").await;

    assert_eq!(artist.body["past_shows"][0]["venue_id"], json!(venue_id));
    assert_eq!(
        artist.body["website"],
        "https://www.gunsnpetalsband.com"
    );

    let body = format!(
        "venue_id={}&artist_id={}&start_time=2035-04-01T20%3A00%3A00",
        i32::MAX,
        artist_id
    );
    let orphan = send(environment, "POST", "/shows/create", &body).await;

    assert_eq!(orphan.status, StatusCode::BAD_REQUEST);
}

async fn test_edit_venue(environment: &Environment, venue_id: i64) {
    let body = format!(
        "name=The+Dueling+Pianos+Bar+{}&city=New+York&state=NY&address=335+Delancey+Street&genres=Classical&genres=R%26B&seeking_talent=y",
        *RUN_ID
    );
    let path = format!("/venues/{}/edit", venue_id);

    let edited = send(environment, "POST", &path, &body).await;
    assert_eq!(edited.status, StatusCode::SEE_OTHER);

    let form = send(environment, "GET", &path, "").await;

    assert_eq!(form.body["form"]["state"], "NY");
    assert_eq!(form.body["form"]["genres"], json!(["Classical", "R&B"]));
    assert_eq!(form.body["form"]["seeking_talent"], json!(true));
}

async fn test_delete_venue(environment: &Environment, venue_id: i64, artist_id: i64) {
    let path = format!("/venues/{}", venue_id);

    let deleted = send(environment, "DELETE", &path, "").await;
    assert_eq!(deleted.body, json!({"state": "success"}));

    let again = send(environment, "DELETE", &path, "").await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert_eq!(again.body, json!({"state": "failed"}));

    let artist = send(environment, "GET", &format!("/artists/{}", artist_id), "").await;

    assert_eq!(artist.body["past_shows_count"], json!(0));
    assert_eq!(artist.body["upcoming_shows_count"], json!(0));
}

async fn send(environment: &Environment, method: &str, path: &str, body: &str) -> Reply {
    let filter = routes::make_routes(environment.clone());

    let response = warp::test::request()
        .method(method)
        .path(path)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body.to_owned())
        .reply(&filter)
        .await;

    Reply {
        status: response.status(),
        location: response
            .headers()
            .get("location")
            .and_then(|l| l.to_str().ok())
            .map(str::to_owned),
        body: serde_json::from_slice(response.body()).expect("parse response as JSON"),
    }
}

async fn prepare_db(connection_string: String) {
    if env::var("BOOKING_TEST_INITIALIZE_DB").unwrap_or_else(|_| "0".to_owned()) == "1" {
        tokio::task::spawn_blocking(move || initialize_db_for_test(&connection_string))
            .await
            .expect("initialize DB");
    }
}

fn initialize_db_for_test(connection_string: &str) {
    use movine::Movine;
    // `movine` needs the synchronous client
    use postgres::{Client, NoTls};

    let mut client = Client::connect(connection_string, NoTls)
        .expect("create postgres::Client from BOOKING_DB_CONNECTION_STRING");
    let mut movine = Movine::new(&mut client);

    movine.set_migration_dir("migrations");
    movine.set_strict(true);

    if movine.status().is_err() {
        movine.initialize().expect("initialize movine");
    }

    movine.up().expect("run movine migrations");
}
