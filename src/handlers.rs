use crate::calendar::project_year;
use crate::countdown::remaining;
use crate::date_key::DateKey;
use crate::errors::{AppError, CoreError};
use crate::models::{
    CalendarQuery, CountdownResponse, DayRecord, DayResponse, HabitsRequest, HabitsResponse,
    HistoryMap, NoteRequest, StatusResponse, ToggleRequest, WeeklyResponse, YearProjection,
};
use crate::progress::{completion_percent, weekly_series};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        Html,
        sse::{Event, KeepAlive, Sse},
    },
};
use std::convert::Infallible;
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let context = state.current_day().await?;
    let store = state.store.lock().await;
    let percent = completion_percent(&context.record, store.habits());
    Ok(Html(render_index(
        context.key,
        store.habits().names(),
        &context.record,
        percent,
    )))
}

pub async fn get_habits(State(state): State<AppState>) -> Json<HabitsResponse> {
    let store = state.store.lock().await;
    Json(HabitsResponse {
        habits: store.habits().names().to_vec(),
    })
}

pub async fn get_history(State(state): State<AppState>) -> Json<HistoryMap> {
    Json(state.store.lock().await.history().clone())
}

pub async fn put_history(
    State(state): State<AppState>,
    Json(history): Json<HistoryMap>,
) -> Result<Json<StatusResponse>, AppError> {
    state.store.lock().await.replace_history(history).await?;
    Ok(Json(ok()))
}

pub async fn get_today(State(state): State<AppState>) -> Result<Json<DayResponse>, AppError> {
    let context = state.current_day().await?;
    Ok(Json(to_response(&state, context.key, context.record).await))
}

pub async fn get_day(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<DayResponse>, AppError> {
    let key: DateKey = raw.parse()?;
    let record = state.store.lock().await.get_or_create(&key).await?;
    Ok(Json(to_response(&state, key, record).await))
}

pub async fn put_note(
    State(state): State<AppState>,
    Json(payload): Json<NoteRequest>,
) -> Result<Json<DayResponse>, AppError> {
    let key = resolve_date(&state, payload.date).await?;
    let record = state.store.lock().await.set_note(&key, payload.note).await?;
    Ok(Json(to_response(&state, key, record).await))
}

pub async fn draft_note(
    State(state): State<AppState>,
    Json(payload): Json<NoteRequest>,
) -> Result<(StatusCode, Json<StatusResponse>), AppError> {
    let key = resolve_date(&state, payload.date).await?;
    state.autosaver.lock().await.submit(key, payload.note).await;
    Ok((
        StatusCode::ACCEPTED,
        Json(StatusResponse {
            status: "pending".to_string(),
        }),
    ))
}

pub async fn put_habits(
    State(state): State<AppState>,
    Json(payload): Json<HabitsRequest>,
) -> Result<Json<DayResponse>, AppError> {
    let key = resolve_date(&state, payload.date).await?;
    let record = state.store.lock().await.set_habits(&key, payload.habits).await?;
    Ok(Json(to_response(&state, key, record).await))
}

pub async fn toggle_habit(
    State(state): State<AppState>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<DayResponse>, AppError> {
    let key = resolve_date(&state, payload.date).await?;
    let record = state
        .store
        .lock()
        .await
        .toggle_habit(&key, payload.index, payload.value)
        .await?;
    Ok(Json(to_response(&state, key, record).await))
}

pub async fn get_weekly(State(state): State<AppState>) -> Json<WeeklyResponse> {
    let anchor = state.current_key().await;
    let store = state.store.lock().await;
    Json(WeeklyResponse {
        days: weekly_series(store.history(), anchor),
    })
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<YearProjection>, AppError> {
    let today = state.current_key().await;
    let year = query.year.unwrap_or_else(|| today.year());
    let store = state.store.lock().await;
    Ok(Json(project_year(store.history(), year, today)?))
}

pub async fn get_countdown(State(state): State<AppState>) -> Json<CountdownResponse> {
    Json(CountdownResponse {
        target: state.countdown_target.format("%Y-%m-%dT%H:%M:%S").to_string(),
        remaining: remaining(state.clock.now(), state.countdown_target),
    })
}

pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.notifier.subscribe()).filter_map(|event| {
        // lagged receivers skip what they missed
        let event = event.ok()?;
        Event::default().event(event.name()).json_data(&event).ok().map(Ok)
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Body dates go through the same parser as path keys.
async fn resolve_date(state: &AppState, date: Option<String>) -> Result<DateKey, CoreError> {
    match date {
        Some(raw) => raw.parse(),
        None => Ok(state.current_key().await),
    }
}

async fn to_response(state: &AppState, date: DateKey, record: DayRecord) -> DayResponse {
    let percent = completion_percent(&record, state.store.lock().await.habits());
    DayResponse {
        date,
        note: record.note,
        habits: record.habits,
        percent,
    }
}

fn ok() -> StatusResponse {
    StatusResponse {
        status: "ok".to_string(),
    }
}
