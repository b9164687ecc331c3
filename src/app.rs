use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/diary", get(handlers::show_form).post(handlers::submit))
        .route("/diary/prev", post(handlers::previous_day))
        .route("/diary/next", post(handlers::next_day))
        .route("/diary/date", post(handlers::set_date))
        .route("/diary/delete", post(handlers::delete))
        .route("/diaries", get(handlers::list_diaries))
        .route("/api/form", get(handlers::get_form))
        .with_state(state)
}
