//! Thin REST wrapper over the scheduling backend.
//!
//! Every request goes through [`ApiClient::request`], which attaches the stored
//! bearer token, and [`ApiClient::execute`], which turns a 401 into a forced
//! logout: the session is wiped and the router is sent to `/login`.

mod appointments;
mod auth;
mod patients;

pub use appointments::AppointmentsApi;
pub use auth::AuthApi;
pub use patients::PatientsApi;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::router::{Navigator, LOGIN_PATH};
use crate::storage::SessionStorage;

/// Error payload the backend sends with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: SessionStorage,
    navigator: Navigator,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        session: SessionStorage,
        navigator: Navigator,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            http: Client::builder().timeout(config.timeout).build()?,
            base_url: config.base_url.clone(),
            session,
            navigator,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStorage {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = endpoint_url(&self.base_url, path)?;
        let builder = self.http.request(method.clone(), url);

        Ok(match self.session.token() {
            Some(token) => {
                tracing::debug!(%method, path, "sending request with bearer token");
                builder.bearer_auth(token)
            }
            None => {
                tracing::debug!(%method, path, "sending request without token");
                builder
            }
        })
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        let message = body.error.or(body.message);

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                reason = message.as_deref().unwrap_or("none"),
                "received 401, clearing session"
            );
            self.expire_session();
            return Err(ApiError::Unauthorized { message });
        }

        Err(ApiError::Status { status, message })
    }

    fn expire_session(&self) {
        if let Err(err) = self.session.clear() {
            tracing::warn!(error = %err, "failed to clear persisted session");
        }
        self.navigator.push(LOGIN_PATH);
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.request(Method::GET, path)?).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: serde::Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.execute(self.request(method, path)?.json(body)).await
    }
}

/// Resolves an `/api/...` path below the base URL, keeping any path prefix
/// the base carries.
fn endpoint_url(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let prefixed = format!("{}/", base.path());
        base.set_path(&prefixed);
    }
    base.join(path.trim_start_matches('/'))
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}
