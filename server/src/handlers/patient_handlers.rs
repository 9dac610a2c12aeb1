use axum::{
    extract::{Json, Path, Query, State},
    Extension,
};
use chrono::Local;
use surgery_client::{MessageResponse, Page, Patient, PatientQuery, Role, User};

use crate::errors::AppError;
use crate::state::AppState;

use super::{require_role, DOCTOR_OR_ADMIN};

const DEFAULT_PAGE_SIZE: u32 = 10;

fn matches_search(patient: &Patient, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    [
        patient.user.as_ref().and_then(|u| u.real_name.as_deref()),
        patient.medical_record_number.as_deref(),
        patient.disease_description.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle))
}

fn find(state: &AppState, id: i64) -> Result<Patient, AppError> {
    state
        .patients
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound("Patient not found".into()))
}

/// Newest records first, optionally narrowed by a free-text search and severity.
pub async fn list_patients(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<PatientQuery>,
) -> Result<Json<Page<Patient>>, AppError> {
    require_role(&user, DOCTOR_OR_ADMIN)?;

    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let mut patients: Vec<Patient> = state
        .patients
        .iter()
        .filter(|entry| search.map_or(true, |needle| matches_search(entry.value(), needle)))
        .filter(|entry| query.severity.map_or(true, |level| entry.severity_level == level))
        .map(|entry| entry.value().clone())
        .collect();
    patients.sort_by(|a, b| b.id.cmp(&a.id));

    Ok(Json(Page::slice(
        patients,
        query.page.unwrap_or(0),
        query.size.unwrap_or(DEFAULT_PAGE_SIZE),
    )))
}

pub async fn get_patient(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, AppError> {
    require_role(&user, DOCTOR_OR_ADMIN)?;
    find(&state, id).map(Json)
}

pub async fn create_patient(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(mut patient): Json<Patient>,
) -> Result<Json<Patient>, AppError> {
    require_role(&user, &[Role::Admin])?;

    let now = Local::now().naive_local();
    patient.id = state.next_id();
    patient.status.get_or_insert_with(|| "WAITING".to_string());
    patient.created_at = Some(now);
    patient.updated_at = Some(now);

    state.patients.insert(patient.id, patient.clone());
    tracing::info!(id = patient.id, "created patient");
    Ok(Json(patient))
}

pub async fn update_patient(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    Json(mut patient): Json<Patient>,
) -> Result<Json<Patient>, AppError> {
    require_role(&user, DOCTOR_OR_ADMIN)?;
    let existing = find(&state, id)?;

    patient.id = id;
    patient.created_at = existing.created_at;
    patient.updated_at = Some(Local::now().naive_local());
    if patient.status.is_none() {
        patient.status = existing.status;
    }

    state.patients.insert(id, patient.clone());
    Ok(Json(patient))
}

pub async fn delete_patient(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    require_role(&user, &[Role::Admin])?;
    state
        .patients
        .remove(&id)
        .ok_or_else(|| AppError::NotFound("Patient not found".into()))?;

    tracing::info!(id, "deleted patient");
    Ok(Json(MessageResponse {
        message: "Patient deleted".into(),
    }))
}

/// The signed-in patient's own record.
pub async fn my_patient_info(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Patient>, AppError> {
    require_role(&user, &[Role::Patient])?;
    state
        .patient_for_user(user.id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Patient record not found".into()))
}
