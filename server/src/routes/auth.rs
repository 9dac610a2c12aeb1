use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use crate::handlers::auth_handlers::{
    admin_login, change_password, login, logout, me, register,
};
use crate::middleware::auth_middleware::auth_middleware;
use crate::state::AppState;

pub fn auth_routes(state: AppState) -> Router {
    let protected = Router::new()
        .route("/me", get(me))
        .route("/logout", post(logout))
        .route("/change-password", put(change_password))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/login", post(login))
        .route("/admin-login", post(admin_login))
        .route("/register", post(register))
        .merge(protected)
        .with_state(state)
}
