use axum::{middleware::from_fn_with_state, routing::get, Router};

use crate::handlers::patient_handlers::{
    create_patient, delete_patient, get_patient, list_patients, my_patient_info, update_patient,
};
use crate::middleware::auth_middleware::auth_middleware;
use crate::state::AppState;

pub fn patient_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_patients).post(create_patient))
        .route("/my-info", get(my_patient_info))
        .route(
            "/{id}",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
        .route_layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
