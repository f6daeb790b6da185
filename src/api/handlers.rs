//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Json},
};
use tracing::{error, info, warn};

use crate::{
    error::{Severity, TrackerError, TrackerResult},
    services::{open_in_browser, render_history, write_history},
    state::{AppState, StatusSnapshot},
    tracking::Outcome,
};
use super::responses::{ActivityRequest, ApiResponse, ContextRequest, HealthResponse};

type CommandResponse = Result<(StatusCode, Json<ApiResponse>), StatusCode>;

fn snapshot(state: &AppState) -> Result<StatusSnapshot, StatusCode> {
    state.status().map_err(|e| {
        error!("Failed to read tracker status: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

fn status_code_for(err: &TrackerError) -> StatusCode {
    match err {
        TrackerError::NoActiveContext
        | TrackerError::AlreadyTracking(_)
        | TrackerError::NotTracking
        | TrackerError::NotPaused => StatusCode::CONFLICT,
        TrackerError::UnknownProject(_) => StatusCode::NOT_FOUND,
        TrackerError::InvalidConfigurationInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TrackerError::PersistenceRead { .. }
        | TrackerError::PersistenceWrite { .. }
        | TrackerError::StateLock(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Turn a tracker error into a notification. Lock failures have no state to
/// report and become a bare 500.
fn error_response(state: &AppState, err: TrackerError) -> CommandResponse {
    if matches!(err, TrackerError::StateLock(_)) {
        error!("{}", err);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let code = status_code_for(&err);
    let tracking = snapshot(state)?;
    let response = match err.severity() {
        Severity::Warning => {
            warn!("{}", err);
            ApiResponse::warning(err.to_string(), tracking)
        }
        Severity::Error => {
            error!("{}", err);
            ApiResponse::error(err.to_string(), tracking)
        }
    };
    Ok((code, Json(response)))
}

fn transition_response(state: &AppState, result: TrackerResult<Outcome>) -> CommandResponse {
    match result {
        Ok(outcome) => {
            let response = ApiResponse::ok(outcome.message(), snapshot(state)?)
                .with_transitions(vec![outcome]);
            Ok((StatusCode::OK, Json(response)))
        }
        Err(e) => error_response(state, e),
    }
}

/// Handle POST /start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> CommandResponse {
    transition_response(&state, state.start())
}

/// Handle POST /stop
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> CommandResponse {
    transition_response(&state, state.stop())
}

/// Handle POST /toggle
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> CommandResponse {
    transition_response(&state, state.toggle())
}

/// Handle POST /reset - zero the current project's total
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> CommandResponse {
    transition_response(&state, state.reset())
}

/// Handle POST /activity - any sign that the user is working
pub async fn activity_handler(
    State(state): State<Arc<AppState>>,
    body: Option<Json<ActivityRequest>>,
) -> CommandResponse {
    let source = body.map(|Json(req)| req.source).unwrap_or_default();

    match state.record_activity(source) {
        Ok(Some(outcome)) => {
            let response = ApiResponse::ok(outcome.message(), snapshot(&state)?)
                .with_transitions(vec![outcome]);
            Ok((StatusCode::OK, Json(response)))
        }
        Ok(None) => Ok((
            StatusCode::OK,
            Json(ApiResponse::ok("Activity recorded".to_string(), snapshot(&state)?)),
        )),
        Err(e) => error_response(&state, e),
    }
}

/// Handle POST /context - the open project changed
pub async fn context_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ContextRequest>,
) -> CommandResponse {
    let project = req.project.filter(|p| !p.trim().is_empty());

    match state.change_context(project.clone()) {
        Ok(outcomes) => {
            let message = match &project {
                Some(p) => format!("Current project is now \"{}\".", p),
                None => "No open projects.".to_string(),
            };
            let response = ApiResponse::ok(message, snapshot(&state)?).with_transitions(outcomes);
            Ok((StatusCode::OK, Json(response)))
        }
        Err(e) => error_response(&state, e),
    }
}

/// Handle POST /auto-start/toggle
pub async fn toggle_auto_start_handler(State(state): State<Arc<AppState>>) -> CommandResponse {
    match state.toggle_auto_start() {
        Ok(enabled) => {
            let message = if enabled {
                "Auto start enabled"
            } else {
                "Auto start disabled"
            };
            info!("{}", message);
            Ok((
                StatusCode::OK,
                Json(ApiResponse::ok(message.to_string(), snapshot(&state)?)),
            ))
        }
        Err(e) => error_response(&state, e),
    }
}

/// Handle POST /config/inactivity - body is the minutes value as typed
pub async fn configure_inactivity_handler(
    State(state): State<Arc<AppState>>,
    body: String,
) -> CommandResponse {
    match state.configure_inactivity(&body) {
        Ok(minutes) => Ok((
            StatusCode::OK,
            Json(ApiResponse::ok(
                format!("Inactivity timeout set to {} minutes", minutes),
                snapshot(&state)?,
            )),
        )),
        Err(e) => error_response(&state, e),
    }
}

/// Handle POST /history - write the history page and optionally open it
pub async fn show_history_handler(State(state): State<Arc<AppState>>) -> CommandResponse {
    let records = match state.records() {
        Ok(records) => records,
        Err(e) => return error_response(&state, e),
    };

    let Some(path) = state.history_path().map(|p| p.to_path_buf()) else {
        return Ok((
            StatusCode::OK,
            Json(ApiResponse::ok(
                format!("{} projects tracked", records.len()),
                snapshot(&state)?,
            )),
        ));
    };

    if let Err(e) = write_history(&path, &records) {
        error!("Failed to write history page: {}", e);
        return Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(
                format!("Failed to write history page: {}", e),
                snapshot(&state)?,
            )),
        ));
    }

    if state.open_history_in_browser() {
        if let Err(e) = open_in_browser(&path).await {
            warn!("Could not open history page: {}", e);
            return Ok((
                StatusCode::OK,
                Json(ApiResponse::warning(
                    format!("History written to {} but could not be opened: {}", path.display(), e),
                    snapshot(&state)?,
                )),
            ));
        }
    }

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            format!("History written to {}", path.display()),
            snapshot(&state)?,
        )),
    ))
}

/// Handle GET /history - the rendered history page
pub async fn history_page_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>, StatusCode> {
    match state.records() {
        Ok(records) => Ok(Html(render_history(&records))),
        Err(e) => {
            error!("Failed to read project records: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return current tracker status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusSnapshot>, StatusCode> {
    snapshot(&state).map(Json)
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
