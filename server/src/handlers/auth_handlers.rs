use axum::{
    extract::{Json, State},
    Extension,
};
use surgery_client::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    RegisterResponse, Role, User,
};

use crate::errors::AppError;
use crate::state::{Account, AppState};

use super::jwt::generate_token;

const BAD_CREDENTIALS: &str = "Invalid username or password";

/// Password check shared by both login endpoints. Every failure reads the
/// same so the response does not reveal which part was wrong.
fn authenticate(state: &AppState, credentials: &LoginRequest) -> Result<Account, AppError> {
    let account = state
        .account_by_username(&credentials.username)
        .filter(|account| account.user.is_active)
        .ok_or_else(|| AppError::BadRequest(BAD_CREDENTIALS.into()))?;

    if !bcrypt::verify(&credentials.password, &account.password_hash)? {
        return Err(AppError::BadRequest(BAD_CREDENTIALS.into()));
    }
    Ok(account)
}

fn issue(state: &AppState, user: User) -> Result<Json<LoginResponse>, AppError> {
    let token = generate_token(&state.jwt_secret, &user)?;
    tracing::info!(username = %user.username, role = %user.role, "issued token");
    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".into(),
        user,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let account = authenticate(&state, &credentials)?;
    issue(&state, account.user)
}

/// Only the built-in `admin` account may sign in here.
pub async fn admin_login(
    State(state): State<AppState>,
    Json(credentials): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if credentials.username != "admin" {
        return Err(AppError::BadRequest(BAD_CREDENTIALS.into()));
    }
    let account = authenticate(&state, &credentials)?;
    if account.user.role != Role::Admin {
        return Err(AppError::BadRequest(BAD_CREDENTIALS.into()));
    }
    issue(&state, account.user)
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    if request.role == Some(Role::Admin) {
        return Err(AppError::BadRequest(
            "Administrator accounts cannot be self-registered".into(),
        ));
    }
    let user = state.create_account(&request)?;
    tracing::info!(username = %user.username, role = %user.role, "registered account");

    Ok(Json(RegisterResponse {
        message: "Registration successful".into(),
        user,
    }))
}

pub async fn me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout(Extension(user): Extension<User>) -> Json<MessageResponse> {
    tracing::info!(username = %user.username, "logged out");
    Json(MessageResponse {
        message: "Logged out".into(),
    })
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(passwords): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if passwords.new_password.is_empty() {
        return Err(AppError::BadRequest("New password must not be empty".into()));
    }

    let current_hash = state
        .accounts
        .get(&user.id)
        .map(|account| account.password_hash.clone())
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let cost = state.bcrypt_cost;
    let new_hash = tokio::task::spawn_blocking(move || -> Result<Option<String>, bcrypt::BcryptError> {
        if !bcrypt::verify(&passwords.old_password, &current_hash)? {
            return Ok(None);
        }
        bcrypt::hash(&passwords.new_password, cost).map(Some)
    })
    .await??
    .ok_or_else(|| AppError::BadRequest("Current password is incorrect".into()))?;

    if !state.set_password_hash(user.id, new_hash) {
        return Err(AppError::NotFound("User not found".into()));
    }
    tracing::info!(username = %user.username, "password changed");

    Ok(Json(MessageResponse {
        message: "Password changed".into(),
    }))
}
