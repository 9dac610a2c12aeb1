//! In-memory development backend for the surgery scheduling client.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod seed;
pub mod state;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::{appointments::appointment_routes, auth::auth_routes, patients::patient_routes};
use state::AppState;

fn cors(client_url: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match client_url.map(HeaderValue::from_str) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(_)) => {
            tracing::warn!("CLIENT_URL is not a valid origin, allowing any");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}

pub fn app(state: AppState, client_url: Option<&str>) -> Router {
    Router::new()
        .nest("/api/auth", auth_routes(state.clone()))
        .nest("/api/patients", patient_routes(state.clone()))
        .nest("/api/appointments", appointment_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors(client_url))
}
