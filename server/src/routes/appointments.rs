use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::handlers::appointment_handlers::{
    appointments_for_date, cancel_appointment, confirm_appointment, create_appointment,
    get_appointment, list_appointments, patient_appointments, patient_upcoming_appointments,
    today_appointments, update_appointment,
};
use crate::middleware::auth_middleware::auth_middleware;
use crate::state::AppState;

pub fn appointment_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_appointments).post(create_appointment))
        .route("/today", get(today_appointments))
        .route("/date/{date}", get(appointments_for_date))
        .route("/patient/my-appointments", get(patient_appointments))
        .route("/patient/upcoming", get(patient_upcoming_appointments))
        .route("/{id}", get(get_appointment).put(update_appointment))
        .route("/{id}/confirm", post(confirm_appointment))
        .route("/{id}/cancel", post(cancel_appointment))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
