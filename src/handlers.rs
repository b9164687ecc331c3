use crate::errors::{AppError, ControllerError};
use crate::models::{DateForm, DeleteForm, EntryForm, FormSnapshotResponse};
use crate::notify::Notifier;
use crate::state::AppState;
use crate::ui::{FormView, render_form_page, render_list_page};
use axum::{
    Form, Json,
    extract::State,
    response::{Html, Redirect},
};

const FORM_PATH: &str = "/diary";
pub const CONFIRM_DELETE_MESSAGE: &str = "Please confirm the deletion.";
pub const NOTHING_TO_DELETE_MESSAGE: &str = "There is no diary to delete for this date.";

pub async fn index() -> Redirect {
    Redirect::to(FORM_PATH)
}

pub async fn show_form(State(state): State<AppState>) -> Html<String> {
    let mut controller = state.controller.lock().await;
    controller.sync().await;
    let toasts = state.toasts.drain();
    Html(render_form_page(&FormView {
        form: controller.form(),
        can_delete: controller.can_delete(),
        error_message: controller.error_message(),
        toasts: &toasts,
        list_path: &state.list_path,
    }))
}

pub async fn get_form(State(state): State<AppState>) -> Json<FormSnapshotResponse> {
    let mut controller = state.controller.lock().await;
    controller.sync().await;
    Json(FormSnapshotResponse {
        form: controller.form().clone(),
        can_delete: controller.can_delete(),
        error_message: controller.error_message().map(str::to_string),
        toasts: state.toasts.drain(),
    })
}

pub async fn list_diaries(State(state): State<AppState>) -> Html<String> {
    let records = state.cache.snapshot().await;
    let toasts = state.toasts.drain();
    Html(render_list_page(&records, &toasts))
}

pub async fn previous_day(State(state): State<AppState>) -> Result<Redirect, AppError> {
    step_date(&state, -1).await
}

pub async fn next_day(State(state): State<AppState>) -> Result<Redirect, AppError> {
    step_date(&state, 1).await
}

pub async fn set_date(
    State(state): State<AppState>,
    Form(payload): Form<DateForm>,
) -> Redirect {
    state.controller.lock().await.set_date(payload.date).await;
    redirect_after(&state)
}

pub async fn submit(State(state): State<AppState>, Form(payload): Form<EntryForm>) -> Redirect {
    let mut controller = state.controller.lock().await;
    controller.set_mental_score(payload.mental_score);
    controller.set_content(payload.content);
    // failures are already reported as toasts
    let _ = controller.submit().await;
    drop(controller);
    redirect_after(&state)
}

pub async fn delete(State(state): State<AppState>, Form(payload): Form<DeleteForm>) -> Redirect {
    let confirmed = payload.confirmed();
    let result = state
        .controller
        .lock()
        .await
        .delete_diary(|_| confirmed)
        .await;
    // api failures already have their toast
    match result {
        Err(ControllerError::Cancelled) => state.toasts.error(None, CONFIRM_DELETE_MESSAGE),
        Err(ControllerError::NoRecord) => state.toasts.error(None, NOTHING_TO_DELETE_MESSAGE),
        _ => {}
    }
    redirect_after(&state)
}

async fn step_date(state: &AppState, delta_days: i64) -> Result<Redirect, AppError> {
    state.controller.lock().await.change_date(delta_days).await?;
    Ok(redirect_after(state))
}

fn redirect_after(state: &AppState) -> Redirect {
    match state.navigation.take() {
        Some(path) => Redirect::to(&path),
        None => Redirect::to(FORM_PATH),
    }
}
