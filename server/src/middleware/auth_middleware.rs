use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::errors::ErrorKind;

use crate::errors::AppError;
use crate::handlers::jwt::verify_token;
use crate::state::AppState;

/// Resolves the bearer token to a [`surgery_client::User`] extension, or
/// answers 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return AppError::Unauthorized("Missing bearer token".into()).into_response();
    };

    let data = match verify_token(&state.jwt_secret, bearer.token()) {
        Ok(data) => data,
        Err(err) => {
            let msg = match *err.kind() {
                ErrorKind::ExpiredSignature => "Token expired",
                _ => "Invalid token",
            };
            tracing::debug!(error = %err, "rejected bearer token");
            return AppError::Unauthorized(msg.into()).into_response();
        }
    };

    let Some(account) = state.account_by_username(&data.claims.sub) else {
        return AppError::Unauthorized("User no longer exists".into()).into_response();
    };
    if !account.user.is_active {
        return AppError::Unauthorized("Account disabled".into()).into_response();
    }

    req.extensions_mut().insert(account.user);
    next.run(req).await
}
