use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/navigate", post(handlers::navigate))
        .route("/api/popstate", post(handlers::pop_state))
        .route("/api/page/state", post(handlers::update_page_state))
        .route(
            "/api/appointments",
            get(handlers::list_appointments).post(handlers::save_appointment),
        )
        .route("/api/appointments/today", get(handlers::get_today))
        .route("/api/slots", get(handlers::get_slots))
        .route("/api/slots/booking", get(handlers::get_booking))
        .route("/api/patients/:id", get(handlers::get_patient))
        .route("/api/patient/soap", post(handlers::save_soap))
        .route("/api/logout", post(handlers::logout))
        .with_state(state)
}
