use axum::{
    http::Method,
    routing::{get, put},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::state::AppState;

pub mod participants;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Any origin, the four verbs the API uses, any header, no credentials.
pub fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

/// Participant routes under `prefix`. The list/create route also answers with a trailing slash.
fn participant_routes(prefix: &str) -> Router<AppState> {
    let collection = get(participants::list).post(participants::create);
    Router::new()
        .route(prefix, collection.clone())
        .route(&format!("{prefix}/"), collection)
        .route(
            &format!("{prefix}/:id"),
            get(participants::get_one).delete(participants::delete),
        )
        .route(&format!("{prefix}/:id/score"), put(participants::update_score))
        .route(&format!("{prefix}/:id/increaseScore"), put(participants::increase_score))
        .route(&format!("{prefix}/:id/decreaseScore"), put(participants::decrease_score))
        .route(&format!("{prefix}/:id/name"), put(participants::update_name))
}

/// Build the full application router: health, default-year and year-scoped participant routes.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(participant_routes("/api/participants"))
        .merge(participant_routes("/api/:year/participants"))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx responses
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
