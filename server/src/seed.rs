use chrono::{Days, Local};
use surgery_client::utils::format_date;
use surgery_client::{
    Appointment, AppointmentStatus, Patient, RegisterRequest, Role, SeverityLevel, User,
};

use crate::errors::AppError;
use crate::state::AppState;

pub const SEED_PASSWORD: &str = "password";

fn account(state: &AppState, username: &str, real_name: &str, role: Role) -> Result<User, AppError> {
    state.create_account(&RegisterRequest {
        username: username.into(),
        password: SEED_PASSWORD.into(),
        email: format!("{username}@hospital.test"),
        real_name: real_name.into(),
        role: Some(role),
        ..RegisterRequest::default()
    })
}

/// Demo accounts (all with [`SEED_PASSWORD`]), one patient record and two
/// surgeries: one today, one in three days.
pub fn seed(state: &AppState) -> Result<(), AppError> {
    account(state, "admin", "System Administrator", Role::Admin)?;
    let doctor = account(state, "doctor", "Dr. Gregory Hale", Role::Doctor)?;
    let nurse = account(state, "nurse", "Nina Brooks", Role::Nurse)?;
    let anesthesiologist = account(state, "anesthesiologist", "Dr. Omar Reyes", Role::Anesthesiologist)?;
    let patient_user = account(state, "patient", "Paul Turner", Role::Patient)?;

    let now = Local::now();
    let patient = Patient {
        id: state.next_id(),
        user: Some(patient_user),
        medical_record_number: Some("MR-0001".into()),
        disease_description: Some("Chronic gallstones".into()),
        severity_level: SeverityLevel::Urgent,
        assigned_doctor: Some(doctor.clone()),
        status: Some("SCHEDULED".into()),
        admission_date: Some(now.date_naive()),
        created_at: Some(now.naive_local()),
        ..Patient::default()
    };
    state.patients.insert(patient.id, patient.clone());

    let later = now
        .date_naive()
        .checked_add_days(Days::new(3))
        .unwrap_or(now.date_naive());

    for (date, name, start) in [
        (now.date_naive(), "Laparoscopic cholecystectomy", "09:00"),
        (later, "Follow-up exploration", "14:00"),
    ] {
        let appointment = Appointment {
            id: state.next_id(),
            patient: Some(patient.clone()),
            doctor: Some(doctor.clone()),
            nurse: Some(nurse.clone()),
            anesthesiologist: Some(anesthesiologist.clone()),
            surgery_name: Some(name.into()),
            planned_date: format_date(date),
            planned_start_time: Some(start.into()),
            estimated_duration: Some(90),
            status: AppointmentStatus::Scheduled,
            priority_level: SeverityLevel::Urgent,
            created_at: Some(now.naive_local()),
            ..Appointment::default()
        };
        state.appointments.insert(appointment.id, appointment);
    }

    tracing::info!(
        accounts = state.accounts.len(),
        appointments = state.appointments.len(),
        "seeded demo data"
    );
    Ok(())
}
