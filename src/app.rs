use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/habits", get(handlers::get_habits))
        .route("/api/history", get(handlers::get_history).put(handlers::put_history))
        .route("/api/day", get(handlers::get_today))
        .route("/api/day/note", put(handlers::put_note))
        .route("/api/day/note/draft", post(handlers::draft_note))
        .route("/api/day/habits", put(handlers::put_habits))
        .route("/api/day/habit", post(handlers::toggle_habit))
        .route("/api/days/:key", get(handlers::get_day))
        .route("/api/weekly", get(handlers::get_weekly))
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/countdown", get(handlers::get_countdown))
        .route("/api/events", get(handlers::events))
        .with_state(state)
}
