//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::{error, info};

use super::responses::{ApiResponse, HealthResponse, MinutesRequest, StatusResponse, VolumeRequest};
use crate::{
    error::{DriverError, Rejection},
    state::{parse_minutes, AppState},
    tasks::{session_driver::CommandReply, Action},
};

/// Turn a driver reply into an HTTP response
fn respond(
    state: &AppState,
    label: &str,
    message: &str,
    reply: Result<CommandReply, DriverError>,
) -> Response {
    match reply {
        Ok(Ok(session)) => Json(ApiResponse::ok(message, session)).into_response(),
        Ok(Err(rejection)) => rejected(state, &rejection),
        Err(e) => {
            error!("{} failed: {}", label, e);
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

fn rejected(state: &AppState, rejection: &Rejection) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::rejected(rejection, state.session.snapshot())),
    )
        .into_response()
}

/// Read a minutes field the way a number input would.
///
/// Unparseable input while the session runs is reported as a running-session
/// rejection, since any write is refused then.
fn minutes_from(state: &AppState, raw: &serde_json::Value) -> Result<i64, Rejection> {
    let parsed = match raw {
        serde_json::Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| Rejection::NotNumeric(n.to_string())),
        serde_json::Value::String(s) => parse_minutes(s),
        other => Err(Rejection::NotNumeric(other.to_string())),
    };

    parsed.map_err(|e| {
        if state.session.snapshot().running {
            Rejection::SessionRunning
        } else {
            e
        }
    })
}

/// Read a volume field. Only whole numbers make it to the range check.
fn volume_from(raw: &serde_json::Value) -> Result<i64, Rejection> {
    match raw {
        serde_json::Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| Rejection::NotNumeric(n.to_string())),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| Rejection::NotNumeric(s.clone())),
        other => Err(Rejection::NotNumeric(other.to_string())),
    }
}

/// Handle POST /session/start-pause - Toggle the countdown
pub async fn start_pause_handler(State(state): State<Arc<AppState>>) -> Response {
    let reply = state.perform("start-pause", Action::StartPause).await;
    if let Ok(Ok(session)) = &reply {
        info!("Start/pause called - session running: {}", session.running);
    }
    respond(&state, "start-pause", "Session toggled", reply)
}

/// Handle POST /session/reset - Stop and refill the current phase
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Response {
    let reply = state.perform("reset", Action::Reset).await;
    respond(&state, "reset", "Session reset", reply)
}

/// Handle PUT /session/work - Change the Work duration
pub async fn work_minutes_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MinutesRequest>,
) -> Response {
    let minutes = match minutes_from(&state, &body.minutes) {
        Ok(minutes) => minutes,
        Err(rejection) => return rejected(&state, &rejection),
    };
    let reply = state.perform("work-minutes", Action::SetWorkMinutes(minutes)).await;
    respond(&state, "work-minutes", "Work duration updated", reply)
}

/// Handle PUT /session/rest - Change the Rest duration
pub async fn rest_minutes_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MinutesRequest>,
) -> Response {
    let minutes = match minutes_from(&state, &body.minutes) {
        Ok(minutes) => minutes,
        Err(rejection) => return rejected(&state, &rejection),
    };
    let reply = state.perform("rest-minutes", Action::SetRestMinutes(minutes)).await;
    respond(&state, "rest-minutes", "Rest duration updated", reply)
}

/// Handle POST /session/audio/toggle - Flip the ambient audio intent
pub async fn toggle_audio_handler(State(state): State<Arc<AppState>>) -> Response {
    let reply = state.perform("toggle-audio", Action::ToggleAudio).await;
    respond(&state, "toggle-audio", "Ambient audio toggled", reply)
}

/// Handle PUT /session/audio/volume - Change the ambient volume
pub async fn volume_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VolumeRequest>,
) -> Response {
    let volume = match volume_from(&body.volume) {
        Ok(volume) => volume,
        Err(rejection) => return rejected(&state, &rejection),
    };
    let reply = state.perform("volume", Action::SetVolume(volume)).await;
    respond(&state, "volume", "Volume updated", reply)
}

/// Handle POST /logout - Discard the session
pub async fn logout_handler(State(state): State<Arc<AppState>>) -> Response {
    let reply = state.perform("logout", Action::Discard).await;
    if reply.is_ok() {
        info!("Logout called - session discarded");
    }
    respond(&state, "logout", "Session discarded", reply)
}

/// Handle GET /session - Return the current session and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        session: state.session.snapshot(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
