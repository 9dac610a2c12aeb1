pub mod appointment_handlers;
pub mod auth_handlers;
pub mod jwt;
pub mod patient_handlers;

use surgery_client::{Role, User};

use crate::errors::AppError;

pub const STAFF: &[Role] = &[Role::Doctor, Role::Nurse, Role::Anesthesiologist, Role::Admin];
pub const DOCTOR_OR_ADMIN: &[Role] = &[Role::Doctor, Role::Admin];

/// 403 unless `user` holds one of `roles`.
pub fn require_role(user: &User, roles: &[Role]) -> Result<(), AppError> {
    if roles.contains(&user.role) {
        Ok(())
    } else {
        tracing::debug!(username = %user.username, role = %user.role, "access denied");
        Err(AppError::Forbidden("Access denied".into()))
    }
}
