use std::error::Error;
use std::sync::Arc;

use futures::future::FutureExt;
use log::{info, initialize_logger};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::mpsc;
use warp::Filter;

use booking::config::{get_parsed_variable, get_variable};
use booking::db::PgDb;
use booking::environment::{system_clock, Environment};
use booking::routes;
use booking::urls::Urls;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    #[cfg(feature = "env_logging")]
    let _guard = log::initialize_env_logging();

    let logger = initialize_logger();

    let main_port: u16 = get_variable("BOOKING_PORT")
        .parse()
        .expect("parse BOOKING_PORT as u16");
    let admin_port: u16 = get_variable("BOOKING_ADMIN_PORT")
        .parse()
        .expect("parse BOOKING_ADMIN_PORT as u16");

    info!(logger, "Starting..."; "main_port" => main_port, "admin_port" => admin_port);
    let logger = Arc::new(logger);

    info!(logger, "Creating database pool...");
    let connection_string = get_variable("BOOKING_DB_CONNECTION_STRING");
    let pool = PgPoolOptions::new()
        .max_connections(get_parsed_variable("BOOKING_DB_MAX_CONNECTIONS", 5))
        .connect(&connection_string)
        .await
        .expect("create database pool from BOOKING_DB_CONNECTION_STRING");
    let db = Arc::new(PgDb::new(pool));

    let urls = Arc::new(Urls::new(get_variable("BOOKING_BASE_URL")));

    let environment = Environment::new(logger.clone(), db, urls, system_clock());

    let (termination_sender, mut termination_receiver) = mpsc::channel::<()>(1);

    let terminate = Arc::new(move || {
        let termination_sender = termination_sender.clone();

        async move {
            // a full channel means termination is already under way
            let _ = termination_sender.try_send(());
        }
        .boxed()
    });

    let should_terminate = async move {
        termination_receiver.recv().await;
    }
    .shared();

    let ctrlc = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let signal = tokio::signal::ctrl_c();

        async move {
            tokio::select! {
                _ = should_terminate => {},
                _ = signal => {
                    terminate().await;
                }
            }
        }
    };

    let main_server = {
        let should_terminate = should_terminate.clone();

        let (_, main_server) = warp::serve(routes::make_routes(environment.clone()))
            .bind_with_graceful_shutdown(([0, 0, 0, 0], main_port), async {
                should_terminate.await;
            });

        main_server
    };

    let admin_server = {
        let should_terminate = should_terminate.clone();

        let routes = routes::admin::make_healthz_route(environment.clone())
            .or(routes::admin::make_termination_route(terminate));

        let (_, admin_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], admin_port), async {
                should_terminate.await;
            });

        admin_server
    };

    tokio::join!(ctrlc, main_server, admin_server);

    info!(logger, "Exiting gracefully...");

    Ok(())
}
