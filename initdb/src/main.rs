//! A helper program to initialize the database, optionally loading
//! seed data afterwards.

use std::env;
use std::fs;

use movine::Movine;
use postgres::{Client, NoTls};

use log::{debug, info, initialize_logger};

const MIGRATIONS_DIR: &str = "./migrations";

fn main() {
    dotenv::dotenv().ok();

    let logger = initialize_logger();
    let connection_string = env::var("BOOKING_DB_CONNECTION_STRING")
        .expect("could not read BOOKING_DB_CONNECTION_STRING");

    debug!(logger, "Connecting to database...");

    let mut client =
        Client::connect(&connection_string, NoTls).expect("could not connect to database");

    {
        let mut movine = Movine::new(&mut client);
        movine.set_migration_dir(MIGRATIONS_DIR);
        movine.set_strict(true);

        if movine.status().is_err() {
            debug!(logger, "Initializing movine...");
            movine.initialize().expect("failed to initialize movine")
        }

        debug!(logger, "Running migrations..."; "directory" => MIGRATIONS_DIR);
        movine.up().expect("failed to run migrations");
    }

    if let Ok(seed_file) = env::var("BOOKING_SEED_FILE") {
        info!(logger, "Loading seed data..."; "file" => &seed_file);

        let sql = fs::read_to_string(&seed_file).expect("could not read BOOKING_SEED_FILE");
        client
            .batch_execute(&sql)
            .expect("failed to load seed data");
    }

    debug!(logger, "Completed initialization.");
}
