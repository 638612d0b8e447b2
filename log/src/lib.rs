use std::sync::Mutex;

use slog::Drain;
use slog::Fuse;
use slog_async::Async;
use slog_json::Json;

pub use slog::{debug, error, info, o, trace, warn, Discard, Logger};

/// Builds the root logger: JSON lines on stderr, written from a
/// background thread, tagged with the build information.
pub fn initialize_logger() -> Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);
    let drain = Async::new(drain).build().fuse();

    Logger::root(
        drain,
        o!(
            "service" => info::NAME,
            "version" => info::VERSION,
            "revision" => info::REVISION,
            "build_timestamp" => info::BUILD_TIMESTAMP
        ),
    )
}

/// A logger that drops everything. Useful when a component needs a
/// `Logger` but its output is irrelevant.
pub fn discard() -> Logger {
    Logger::root(Discard, o!())
}

/// Installs a global logger filtered by `RUST_LOG`. The returned guard
/// must be kept alive for as long as logging is needed.
#[cfg(feature = "env_logging")]
pub fn initialize_env_logging() -> slog_scope::GlobalLoggerGuard {
    slog_envlogger::init().expect("initialize slog-envlogger")
}
