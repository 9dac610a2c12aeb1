use async_trait::async_trait;
use reqwest::Method;

use super::ApiClient;
use crate::error::ApiError;
use crate::models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    RegisterResponse, User,
};

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError>;
    async fn admin_login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError>;
    async fn register(&self, user: &RegisterRequest) -> Result<RegisterResponse, ApiError>;
    async fn current_user(&self) -> Result<User, ApiError>;
    async fn logout(&self) -> Result<MessageResponse, ApiError>;
    async fn change_password(
        &self,
        passwords: &ChangePasswordRequest,
    ) -> Result<MessageResponse, ApiError>;
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.send(Method::POST, "/api/auth/login", credentials).await
    }

    async fn admin_login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.send(Method::POST, "/api/auth/admin-login", credentials).await
    }

    async fn register(&self, user: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        self.send(Method::POST, "/api/auth/register", user).await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/api/auth/me").await
    }

    async fn logout(&self) -> Result<MessageResponse, ApiError> {
        self.execute(self.request(Method::POST, "/api/auth/logout")?).await
    }

    async fn change_password(
        &self,
        passwords: &ChangePasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.send(Method::PUT, "/api/auth/change-password", passwords).await
    }
}
