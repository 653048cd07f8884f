//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::{
    state::{ActionOutcome, AppState, SessionError},
    timer::{catalog, PresetDefinition},
};
use super::{
    requests::{AdjustRequest, ManualRequest, SplitRequest},
    responses::{HealthResponse, StatusResponse, TimerResponse},
};

/// Map a session failure onto an HTTP status, logging it on the way
fn reject(action: &str, e: SessionError) -> StatusCode {
    match e {
        SessionError::NoTimerSelected => {
            warn!("{} called with no timer selected", action);
            StatusCode::CONFLICT
        }
        SessionError::UnknownPreset(id) => {
            warn!("{} called with unknown preset '{}'", action, id);
            StatusCode::NOT_FOUND
        }
        SessionError::Lock(e) => {
            error!("Failed to {}: {}", action, e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Turn an action outcome into a response, noting when it was refused
fn respond(outcome: ActionOutcome, done: &str, refused: &str) -> Json<TimerResponse> {
    if outcome.applied {
        Json(TimerResponse::ok(done.to_string(), outcome.snapshot))
    } else {
        Json(TimerResponse::ignored(refused.to_string(), outcome.snapshot))
    }
}

/// Handle GET /presets - List the preset catalog
pub async fn presets_handler() -> Json<&'static [PresetDefinition]> {
    Json(catalog())
}

/// Handle POST /timer/preset/:id - Select a catalog preset
pub async fn select_preset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TimerResponse>, StatusCode> {
    let snapshot = state.select_preset(&id).map_err(|e| reject("select preset", e))?;
    info!("Preset '{}' selected", id);
    Ok(Json(TimerResponse::ok(format!("Preset {} selected", id), snapshot)))
}

/// Handle POST /timer/manual - Select a mode by hand
pub async fn select_manual_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ManualRequest>,
) -> Result<Json<TimerResponse>, StatusCode> {
    let snapshot = state
        .select_manual(request.mode, request.duration_seconds)
        .map_err(|e| reject("select manual mode", e))?;
    Ok(Json(TimerResponse::ok(format!("{} timer selected", request.mode), snapshot)))
}

/// Handle POST /timer/start - Start the selected timer
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, StatusCode> {
    let outcome = state.start().map_err(|e| reject("start timer", e))?;
    Ok(respond(outcome, "Timer started", "Timer already running"))
}

/// Handle POST /timer/pause - Toggle pause on a running timer
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, StatusCode> {
    let outcome = state.pause_or_resume().map_err(|e| reject("pause timer", e))?;
    let done = if outcome.snapshot.state.is_paused { "Timer paused" } else { "Timer resumed" };
    Ok(respond(outcome, done, "Timer is not running"))
}

/// Handle POST /timer/reset - Restore the selected timer to its initial state
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, StatusCode> {
    let outcome = state.reset().map_err(|e| reject("reset timer", e))?;
    Ok(respond(outcome, "Timer reset", "Timer reset"))
}

/// Handle POST /timer/adjust - Add or remove time on a stopped countdown
pub async fn adjust_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AdjustRequest>,
) -> Result<Json<TimerResponse>, StatusCode> {
    let outcome = state
        .adjust_by(request.delta_seconds)
        .map_err(|e| reject("adjust timer", e))?;
    Ok(respond(
        outcome,
        &format!("Timer adjusted by {}s", request.delta_seconds),
        "Adjustments need a stopped, non-stopwatch timer",
    ))
}

/// Handle POST /timer/split - Log a stopwatch split
pub async fn split_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SplitRequest>,
) -> Result<Json<TimerResponse>, StatusCode> {
    let (split, snapshot) = state.record_split(request.label).map_err(|e| reject("record split", e))?;
    Ok(Json(match split {
        Some(split) => TimerResponse::ok("Split recorded".to_string(), snapshot).with_split(split),
        None => TimerResponse::ignored("Splits are only kept by the stopwatch".to_string(), snapshot),
    }))
}

/// Handle GET /timer - Current timer snapshot
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, StatusCode> {
    let snapshot = state
        .get_snapshot()
        .map_err(|e| reject("read timer", e))?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(TimerResponse::ok("Current timer".to_string(), snapshot)))
}

/// Handle DELETE /timer - Discard the selected timer
pub async fn discard_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerResponse>, StatusCode> {
    let discarded = state.discard().map_err(|e| reject("discard timer", e))?;
    let message = if discarded { "Timer discarded" } else { "No timer selected" };
    Ok(Json(TimerResponse::new(
        if discarded { "ok" } else { "ignored" }.to_string(),
        message.to_string(),
        None,
    )))
}

/// Handle GET /timer/events - Stream timer cues as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe_events();
    let events = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => match Event::default().event("timer").json_data(event) {
                    Ok(sse) => return Some((Ok::<_, Infallible>(sse), rx)),
                    Err(e) => warn!("Failed to encode timer event: {}", e),
                },
                Err(RecvError::Lagged(skipped)) => warn!("Event stream lagged, skipped {} events", skipped),
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /status - Return server and timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = state.get_snapshot().map_err(|e| reject("read status", e))?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
