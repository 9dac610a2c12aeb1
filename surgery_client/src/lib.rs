pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod router;
pub mod storage;
pub mod store;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, AppointmentsApi, AuthApi, PatientsApi};
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, StorageError};
pub use models::*;
pub use router::{Navigator, Router};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SessionStorage};
pub use store::{ActionResult, Store};
