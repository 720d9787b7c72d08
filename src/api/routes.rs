//! API Router
//! Mission: Wire handlers, middleware, and shared state into one app

use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer};

use crate::auth::{api as auth_api, require_auth, JwtHandler, UserStore};
use crate::events::{api as events_api, EventStore};
use crate::middleware::logging::request_logging;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub user_store: Arc<UserStore>,
    pub event_store: Arc<EventStore>,
    pub jwt_handler: Arc<JwtHandler>,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth_api::register))
        .route("/login", post(auth_api::login));

    let user_routes = Router::new()
        .route(
            "/profile",
            get(auth_api::get_profile).put(auth_api::update_profile),
        )
        .route_layer(middleware::from_fn_with_state(
            state.jwt_handler.clone(),
            require_auth,
        ));

    // GET /, GET /:id and the RSVP route are public; create/update/delete
    // require a bearer token.
    let public_event_routes = Router::new()
        .route("/", get(events_api::list_events))
        .route("/:id", get(events_api::get_event))
        .route("/:id/rsvp", put(events_api::rsvp_event));

    let protected_event_routes = Router::new()
        .route("/", post(events_api::create_event))
        .route(
            "/:id",
            put(events_api::update_event).delete(events_api::delete_event),
        )
        .route_layer(middleware::from_fn_with_state(
            state.jwt_handler.clone(),
            require_auth,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest(
            "/api/events",
            public_event_routes.merge(protected_event_routes),
        )
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Last-resort handler: a panic anywhere below becomes a fixed 500 body
/// with no internal detail.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "message": "Something broke!",
        })),
    )
        .into_response()
}
