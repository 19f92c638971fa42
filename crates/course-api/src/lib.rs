pub mod convert;
pub mod courses;
pub mod detail;
pub mod error;
pub mod form;
pub mod middleware;
pub mod mutation;
pub mod policy;
pub mod query;
pub mod slug;
pub mod state;
pub mod validation;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::middleware::{identify, require_auth};
use crate::state::AppState;

/// Room for a maximum-size thumbnail plus the text fields.
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// All course routes, the `/storage` file mount and `/health`.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/courses", get(courses::index))
        .route("/courses/{id}", get(courses::show))
        .layer(from_fn_with_state(state.clone(), identify));

    let protected_routes = Router::new()
        .route("/courses", post(courses::store))
        .route(
            "/courses/{id}",
            put(courses::update).patch(courses::update).delete(courses::destroy),
        )
        .layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .route("/health", get(courses::health))
        .nest_service("/storage", ServeDir::new(state.storage.root()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
