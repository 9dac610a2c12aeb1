use std::env;
use std::net::SocketAddr;

use crate::errors::ConfigError;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";
const DEV_SECRET: &str = "surgery-dev-secret";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub jwt_secret: String,
    /// Allowed CORS origin; any origin when unset.
    pub client_url: Option<String>,
    pub bcrypt_cost: u32,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .parse()
            .map_err(|source| ConfigError::InvalidAddr {
                value: raw_addr.clone(),
                source,
            })?;

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using the development secret");
            DEV_SECRET.to_string()
        });

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(raw) => raw
                .parse()
                .ok()
                .filter(|cost| (4..=31).contains(cost))
                .ok_or(ConfigError::InvalidCost(raw))?,
            Err(_) => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            addr,
            jwt_secret,
            client_url: env::var("CLIENT_URL").ok(),
            bcrypt_cost,
        })
    }

    /// Settings for tests: ephemeral port, fixed secret, cheapest hashing.
    pub fn ephemeral() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: DEV_SECRET.to_string(),
            client_url: None,
            bcrypt_cost: 4,
        }
    }
}
