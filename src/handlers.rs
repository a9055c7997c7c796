use crate::errors::AppError;
use crate::models::{
    Appointment, AppointmentRequest, BookingQuery, NavigateRequest, NavigationResponse,
    PageStateRequest, PatientResponse, PopStateRequest, SlotQuery, SlotsResponse, SoapNote,
    SoapSections, TodayResponse, UpsertResponse,
};
use crate::pages::{DAY_OFFSETS, PageContext, lookup_patient};
use crate::router::{Navigation, Viewport};
use crate::scheduler::{
    build_slots, day_label, resolve_booking, slot_grid, today, todays_appointments, upsert,
};
use crate::state::{AppState, Session};
use crate::storage::{clear_login_flag, load_appointments, persist_store, save_appointments};
use crate::ui::render_shell;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
};
use tracing::info;

pub async fn index() -> Html<String> {
    Html(render_shell())
}

pub async fn navigate(
    State(state): State<AppState>,
    Json(payload): Json<NavigateRequest>,
) -> Json<NavigationResponse> {
    let mut session = state.session.lock().await;
    let mut data = state.data.lock().await;
    let Session { router, demo } = &mut *session;
    let mut ctx = PageContext {
        store: &mut data,
        demo,
        today: today(),
    };

    let nav = router
        .navigate_to(payload.page.trim(), payload.push_history, &mut ctx)
        .await;
    Json(to_response(nav, router.viewport()))
}

pub async fn pop_state(
    State(state): State<AppState>,
    Json(payload): Json<PopStateRequest>,
) -> Json<NavigationResponse> {
    let mut session = state.session.lock().await;
    let mut data = state.data.lock().await;
    let Session { router, demo } = &mut *session;
    let mut ctx = PageContext {
        store: &mut data,
        demo,
        today: today(),
    };

    let nav = router
        .pop_state(payload.state.as_deref(), payload.fragment.as_deref(), &mut ctx)
        .await;
    Json(to_response(nav, router.viewport()))
}

/// Updates the page selections (day tab, visit filter, patient) and
/// re-renders whatever page is active.
pub async fn update_page_state(
    State(state): State<AppState>,
    Json(payload): Json<PageStateRequest>,
) -> Result<Json<NavigationResponse>, AppError> {
    if let Some(offset) = payload.offset {
        ensure_offset(offset)?;
    }

    let mut session = state.session.lock().await;
    let mut data = state.data.lock().await;
    let Session { router, demo } = &mut *session;
    if let Some(offset) = payload.offset {
        demo.day_offset = offset;
    }
    if let Some(filter) = payload.filter {
        demo.visit_filter = filter;
    }
    if let Some(patient) = payload.patient {
        demo.patient_id = patient.trim().to_string();
    }

    let mut ctx = PageContext {
        store: &mut data,
        demo,
        today: today(),
    };
    let nav = router.reload(&mut ctx).await;
    Ok(Json(to_response(nav, router.viewport())))
}

pub async fn list_appointments(State(state): State<AppState>) -> Json<Vec<Appointment>> {
    let data = state.data.lock().await;
    Json(load_appointments(&data))
}

pub async fn save_appointment(
    State(state): State<AppState>,
    Json(payload): Json<AppointmentRequest>,
) -> Result<Json<UpsertResponse>, AppError> {
    let mut data = state.data.lock().await;
    let mut list = load_appointments(&data);
    let (outcome, index) = upsert(&mut list, payload.into())?;
    save_appointments(&mut data, &list)?;
    persist_store(&state.data_path, &data).await?;

    let appointment = list.swap_remove(index);
    info!(date = %appointment.date, time = %appointment.time, ?outcome, "appointment saved");
    Ok(Json(UpsertResponse {
        outcome,
        appointment,
    }))
}

pub async fn get_today(State(state): State<AppState>) -> Json<TodayResponse> {
    let data = state.data.lock().await;
    let list = load_appointments(&data);
    Json(todays_appointments(&list).into())
}

pub async fn get_slots(
    State(state): State<AppState>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<SlotsResponse>, AppError> {
    ensure_offset(query.offset)?;
    let data = state.data.lock().await;
    let list = load_appointments(&data);
    Ok(Json(SlotsResponse {
        offset: query.offset,
        label: day_label(query.offset),
        slots: slot_grid(&list, build_slots(query.offset)),
    }))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Query(query): Query<BookingQuery>,
) -> Json<Option<Appointment>> {
    let data = state.data.lock().await;
    let list = load_appointments(&data);
    Json(resolve_booking(&list, &query.into()).cloned())
}

pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<PatientResponse> {
    let data = state.data.lock().await;
    let patient = lookup_patient(&data, id.trim());
    Json(PatientResponse {
        initials: patient.initials(),
        patient,
    })
}

pub async fn save_soap(
    State(state): State<AppState>,
    Json(payload): Json<SoapSections>,
) -> Result<Json<SoapNote>, AppError> {
    let mut session = state.session.lock().await;
    let workspace = session
        .demo
        .workspace
        .as_mut()
        .ok_or_else(|| AppError::conflict("patient page is not open"))?;
    let note = workspace.save_soap(payload, today())?.clone();
    Ok(Json(note))
}

pub async fn logout(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let mut data = state.data.lock().await;
    clear_login_flag(&mut data);
    persist_store(&state.data_path, &data).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn ensure_offset(offset: i64) -> Result<(), AppError> {
    if DAY_OFFSETS.contains(&offset) {
        Ok(())
    } else {
        Err(AppError::bad_request("offset must be 0, 1 or 2"))
    }
}

fn to_response(nav: Navigation, view: &Viewport) -> NavigationResponse {
    match nav {
        Navigation::Rendered { page, history_url } => NavigationResponse {
            outcome: "rendered",
            page: Some(page),
            title: Some(view.document_title.clone()),
            heading: Some(view.page_heading.clone()),
            active: view.active_nav.clone(),
            html: Some(view.content.clone()),
            history_url,
            ..NavigationResponse::default()
        },
        Navigation::Unchanged => NavigationResponse {
            outcome: "unchanged",
            ..NavigationResponse::default()
        },
        Navigation::Ignored => NavigationResponse {
            outcome: "ignored",
            ..NavigationResponse::default()
        },
        Navigation::Placeholder => NavigationResponse {
            outcome: "placeholder",
            html: Some(view.content.clone()),
            ..NavigationResponse::default()
        },
        Navigation::Redirect(target) => NavigationResponse {
            outcome: "redirect",
            redirect: Some(target),
            ..NavigationResponse::default()
        },
    }
}
