use std::env;
use std::str::FromStr;

/// Returns the value of the named environment variable if it exists or panics.
pub fn get_variable(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("must define {} environment variable", name))
}

/// Parses the named environment variable, falling back to `default`
/// when it is not set. Panics if it is set but does not parse.
pub fn get_parsed_variable<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("parse {} environment variable {:?}", name, value)),
        Err(_) => default,
    }
}
