//! Client-side state: three independent partitions (auth, patients,
//! appointments). Actions perform one backend call, commit on success and
//! always return an [`ActionResult`]; errors never escape an action.

mod appointments;
mod auth;
mod collection;
mod patients;

pub use appointments::AppointmentsPartition;
pub use auth::AuthPartition;
pub use collection::Collection;
pub use patients::PatientsPartition;

use serde::Serialize;

use crate::error::ApiError;
use crate::storage::SessionStorage;

/// Uniform `{success, data?, message?}` result of every store action.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActionResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ActionResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn done() -> Self {
        Self {
            success: true,
            data: None,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Failure carrying the backend's error text, or `fallback` when it sent none.
    pub fn from_error(action: &'static str, err: &ApiError, fallback: &str) -> Self {
        tracing::warn!(action, error = %err, "store action failed");
        Self::failed(err.backend_message().unwrap_or(fallback))
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

#[derive(Debug)]
pub struct Store {
    pub auth: AuthPartition,
    pub patients: PatientsPartition,
    pub appointments: AppointmentsPartition,
}

impl Store {
    /// Builds the store, restoring the auth partition from `session`.
    pub fn new(session: SessionStorage) -> Self {
        Self {
            auth: AuthPartition::from_storage(session),
            patients: PatientsPartition::default(),
            appointments: AppointmentsPartition::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::rejected;

    #[test]
    fn failure_prefers_backend_message() {
        let result: ActionResult<()> =
            ActionResult::from_error("test", &rejected("Patient not found"), "fallback");
        assert_eq!(result.message.as_deref(), Some("Patient not found"));

        let silent = ApiError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        let result: ActionResult<()> = ActionResult::from_error("test", &silent, "fallback");
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("fallback"));
    }

    #[test]
    fn envelope_omits_missing_fields() {
        let json = serde_json::to_value(ActionResult::<u8>::done()).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true }));

        let json = serde_json::to_value(ActionResult::<u8>::failed("nope")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "message": "nope" }));
    }
}
