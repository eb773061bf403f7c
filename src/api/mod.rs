pub mod v1;

use serde::Serialize;
use warp::Filter;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Unversioned liveness check.
pub fn health() -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::get()
        .and(warp::path!("health"))
        .map(|| warp::reply::json(&HealthResponse { status: "ok" }))
}
