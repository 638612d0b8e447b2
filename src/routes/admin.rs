use std::convert::Infallible;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use log::warn;
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Reply};
use warp::Filter;

use super::response::SuccessResponse;
use crate::environment::Environment;

/// Reports the build and whether the database answers. Responds with
/// 503 when it doesn't.
pub fn make_healthz_route(
    environment: Environment,
) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
    warp::path("healthz")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(move || {
            let environment = environment.clone();

            async move {
                let (database, status) = match environment.db.check().await {
                    Ok(()) => ("ok", StatusCode::OK),
                    Err(e) => {
                        warn!(environment.logger, "Database check failed"; "error" => ?e);
                        ("unavailable", StatusCode::SERVICE_UNAVAILABLE)
                    }
                };

                let response = SuccessResponse::Healthz {
                    revision: info::REVISION,
                    timestamp: info::BUILD_TIMESTAMP,
                    version: info::VERSION,
                    database,
                };

                Ok::<_, Infallible>(with_status(json(&response), status))
            }
        })
}

type TerminationFuture<'a> = BoxFuture<'a, ()>;

pub type TerminationFunctionWrapper<'a> =
    Arc<dyn Fn() -> TerminationFuture<'a> + Send + Sync + 'a>;

pub fn make_termination_route<'a>(
    terminate: TerminationFunctionWrapper<'a>,
) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone + 'a {
    let handler = move || -> BoxFuture<Result<StatusCode, Infallible>> {
        let terminate = terminate.clone();

        async move {
            let future = terminate();
            future.await;
            Ok(StatusCode::NO_CONTENT)
        }
        .boxed()
    };

    warp::path("terminate")
        .and(warp::path::end())
        .and(warp::post())
        .and_then(handler)
}
