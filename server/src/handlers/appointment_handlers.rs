use axum::{
    extract::{Json, Path, Query, State},
    Extension,
};
use chrono::{Local, NaiveDate};
use serde_json::json;
use surgery_client::utils::{format_date, today};
use surgery_client::{
    Appointment, AppointmentQuery, AppointmentRequest, AppointmentStatus, CancelRequest,
    MessageResponse, Page, Role, User,
};

use crate::errors::AppError;
use crate::state::AppState;

use super::{require_role, DOCTOR_OR_ADMIN, STAFF};

const DEFAULT_PAGE_SIZE: u32 = 10;

fn find(state: &AppState, id: i64) -> Result<Appointment, AppError> {
    state
        .appointments
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound("Appointment not found".into()))
}

fn sorted(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
    appointments.sort_by(|a, b| {
        a.planned_date
            .cmp(&b.planned_date)
            .then_with(|| a.planned_start_time.cmp(&b.planned_start_time))
            .then_with(|| a.id.cmp(&b.id))
    });
    appointments
}

fn collect(state: &AppState, keep: impl Fn(&Appointment) -> bool) -> Vec<Appointment> {
    sorted(
        state
            .appointments
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect(),
    )
}

/// Looks up an optional staff assignment and checks the member's role.
fn staff_member(
    state: &AppState,
    id: Option<i64>,
    role: Role,
) -> Result<Option<User>, AppError> {
    let Some(id) = id else {
        return Ok(None);
    };
    state
        .user(id)
        .filter(|user| user.role == role)
        .map(Some)
        .ok_or_else(|| AppError::BadRequest(format!("No {} with id {id}", role.as_str().to_lowercase())))
}

/// Copies a create/update body onto `appointment`, resolving ids to records.
fn apply_request(
    state: &AppState,
    appointment: &mut Appointment,
    request: &AppointmentRequest,
    author: &User,
) -> Result<(), AppError> {
    if request.surgery_name.trim().is_empty() {
        return Err(AppError::BadRequest("Surgery name is required".into()));
    }
    let patient = state
        .patients
        .get(&request.patient_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::BadRequest("Patient not found".into()))?;

    let doctor = match staff_member(state, request.doctor_id, Role::Doctor)? {
        Some(doctor) => Some(doctor),
        None if author.role == Role::Doctor => Some(author.clone()),
        None => appointment.doctor.take(),
    };

    appointment.patient = Some(patient);
    appointment.doctor = doctor;
    appointment.nurse = staff_member(state, request.nurse_id, Role::Nurse)?;
    appointment.anesthesiologist =
        staff_member(state, request.anesthesiologist_id, Role::Anesthesiologist)?;
    appointment.room = request.room_id.map(|id| json!({ "id": id }));
    appointment.bed = request.bed_id.map(|id| json!({ "id": id }));
    appointment.surgery_name = Some(request.surgery_name.clone());
    appointment.surgery_type = request.surgery_type.clone();
    appointment.planned_date = format_date(request.planned_date);
    appointment.planned_start_time = request.planned_start_time.clone();
    appointment.planned_end_time = request.planned_end_time.clone();
    appointment.estimated_duration = request.estimated_duration;
    appointment.surgery_description = request.surgery_description.clone();
    appointment.pre_surgery_notes = request.pre_surgery_notes.clone();
    appointment.priority_level = request.priority_level.unwrap_or_default();
    appointment.updated_at = Some(Local::now().naive_local());
    Ok(())
}

pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<Page<Appointment>>, AppError> {
    require_role(&user, STAFF)?;

    let start = query.start_date.map(format_date);
    let end = query.end_date.map(format_date);
    let name = query
        .patient_name
        .as_deref()
        .map(|n| n.trim().to_lowercase())
        .filter(|n| !n.is_empty());

    let appointments = collect(&state, |apt| {
        query.status.map_or(true, |status| apt.status == status)
            && start.as_ref().map_or(true, |s| apt.planned_date >= *s)
            && end.as_ref().map_or(true, |e| apt.planned_date <= *e)
            && name.as_ref().map_or(true, |needle| {
                apt.patient
                    .as_ref()
                    .and_then(|p| p.user.as_ref())
                    .and_then(|u| u.real_name.as_deref())
                    .is_some_and(|real| real.to_lowercase().contains(needle))
            })
    });

    Ok(Json(Page::slice(
        appointments,
        query.page.unwrap_or(0),
        query.size.unwrap_or(DEFAULT_PAGE_SIZE),
    )))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, AppError> {
    require_role(&user, STAFF)?;
    find(&state, id).map(Json)
}

/// New appointments start SCHEDULED and move their patient to SCHEDULED.
pub async fn create_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<AppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    require_role(&user, DOCTOR_OR_ADMIN)?;

    let mut appointment = Appointment::default();
    apply_request(&state, &mut appointment, &request, &user)?;
    appointment.id = state.next_id();
    appointment.status = AppointmentStatus::Scheduled;
    appointment.created_at = appointment.updated_at;

    state.set_patient_status(request.patient_id, "SCHEDULED");
    state.appointments.insert(appointment.id, appointment.clone());
    tracing::info!(id = appointment.id, date = %appointment.planned_date, "scheduled surgery");
    Ok(Json(appointment))
}

pub async fn update_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    Json(request): Json<AppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    require_role(&user, DOCTOR_OR_ADMIN)?;

    let mut appointment = find(&state, id)?;
    if appointment.status == AppointmentStatus::Completed {
        return Err(AppError::BadRequest(
            "Completed appointments cannot be modified".into(),
        ));
    }
    apply_request(&state, &mut appointment, &request, &user)?;

    state.appointments.insert(id, appointment.clone());
    Ok(Json(appointment))
}

/// Records the caller's confirmation and marks the team as confirmed.
pub async fn confirm_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    require_role(&user, &[Role::Doctor, Role::Nurse, Role::Anesthesiologist])?;

    let Some(mut appointment) = state.appointments.get_mut(&id) else {
        return Err(AppError::NotFound("Appointment not found".into()));
    };
    if matches!(
        appointment.status,
        AppointmentStatus::Cancelled | AppointmentStatus::Completed
    ) {
        return Err(AppError::BadRequest(format!(
            "Appointment is already {:?}",
            appointment.status
        )));
    }

    match user.role {
        Role::Nurse => appointment.nurse_confirmed = true,
        Role::Anesthesiologist => appointment.anesthesiologist_confirmed = true,
        _ => appointment.doctor_final_confirmed = true,
    }
    appointment.status = AppointmentStatus::TeamConfirmed;
    appointment.updated_at = Some(Local::now().naive_local());

    Ok(Json(MessageResponse {
        message: "Appointment confirmed".into(),
    }))
}

/// Patients cancel their own appointments; the patient goes back to WAITING.
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    Json(body): Json<CancelRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    require_role(&user, &[Role::Patient])?;

    let patient_id = {
        let Some(mut appointment) = state.appointments.get_mut(&id) else {
            return Err(AppError::NotFound("Appointment not found".into()));
        };
        if appointment.patient_user_id() != Some(user.id) {
            return Err(AppError::Forbidden("Not your appointment".into()));
        }
        if appointment.status == AppointmentStatus::Completed {
            return Err(AppError::BadRequest(
                "Completed appointments cannot be cancelled".into(),
            ));
        }

        appointment.status = AppointmentStatus::Cancelled;
        appointment.cancel_reason = body.reason;
        appointment.updated_at = Some(Local::now().naive_local());
        appointment.patient.as_ref().map(|p| p.id)
    };

    if let Some(patient_id) = patient_id {
        state.set_patient_status(patient_id, "WAITING");
    }
    tracing::info!(id, username = %user.username, "appointment cancelled");
    Ok(Json(MessageResponse {
        message: "Appointment cancelled".into(),
    }))
}

/// Today's surgeries; staff other than admins only see the ones they work on.
pub async fn today_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    require_role(&user, STAFF)?;

    let today = today();
    Ok(Json(collect(&state, |apt| {
        apt.planned_date == today && (user.role == Role::Admin || apt.is_assigned_to(user.id))
    })))
}

pub async fn appointments_for_date(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    require_role(&user, STAFF)?;

    let date = format_date(date);
    Ok(Json(collect(&state, |apt| apt.planned_date == date)))
}

pub async fn patient_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    require_role(&user, &[Role::Patient])?;
    Ok(Json(collect(&state, |apt| apt.patient_user_id() == Some(user.id))))
}

/// The patient's appointments from today on that are still going ahead.
pub async fn patient_upcoming_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    require_role(&user, &[Role::Patient])?;

    let today = today();
    Ok(Json(collect(&state, |apt| {
        apt.patient_user_id() == Some(user.id)
            && apt.planned_date >= today
            && !matches!(
                apt.status,
                AppointmentStatus::Cancelled | AppointmentStatus::Completed
            )
    })))
}
