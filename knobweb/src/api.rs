//! REST endpoints for the now-playing dashboard
//!
//! Handlers stay thin: the aggregator owns the merge and the cache, the
//! handlers translate its answers into HTTP.

use crate::knobserver_ext::NowPlayingState;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use knobconfig::encryption::get_password;
use knobstatus::{NowPlaying, ScheduleSlot, SlotKind, format_hour};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

// ============ Error handling ============

struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

/// One schedule row as the dashboard renders it
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ScheduleEntry {
    pub start_hour: u8,
    pub end_hour: u8,
    pub start_fmt: String,
    pub end_fmt: String,
    pub station: String,
    pub kind: String,
}

impl From<&ScheduleSlot> for ScheduleEntry {
    fn from(slot: &ScheduleSlot) -> Self {
        Self {
            start_hour: slot.start_hour,
            end_hour: slot.end_hour,
            start_fmt: format_hour(slot.start_hour),
            end_fmt: format_hour(slot.end_hour),
            station: slot.station.clone(),
            kind: match slot.kind {
                SlotKind::Show => "show".to_string(),
                SlotKind::Random => "random".to_string(),
            },
        }
    }
}

/// Request body for the station switch endpoint
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SetStationRequest {
    pub name: String,
}

/// Response for the station switch endpoint
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SetStationResponse {
    pub station: String,
}

/// Connection details for DJs going live
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DjInfo {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

/// Stream info for the listen card
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StreamInfo {
    pub url: String,
}

/// Builds the now-playing API router
pub fn create_router(state: NowPlayingState) -> Router {
    Router::new()
        .route("/now-playing", get(get_now_playing))
        .route("/stations", get(get_stations))
        .route("/schedule", get(get_schedule))
        .route("/station", post(set_station))
        .route("/stream", get(get_stream))
        .route("/dj", get(get_dj_info))
        .with_state(state)
}

/// Returns the current now-playing snapshot
///
/// Never fails: when an upstream is down the snapshot carries
/// `*_connected: false` and the affected fields are null.
#[utoipa::path(
    get,
    path = "/now-playing",
    responses(
        (status = 200, description = "Current now-playing snapshot", body = NowPlaying)
    ),
    tag = "nowplaying"
)]
pub(crate) async fn get_now_playing(State(state): State<NowPlayingState>) -> Json<NowPlaying> {
    Json(state.aggregator.get_now_playing().await)
}

/// Lists the switchable stations
#[utoipa::path(
    get,
    path = "/stations",
    responses(
        (status = 200, description = "Stations known to the schedule", body = Vec<String>)
    ),
    tag = "nowplaying"
)]
async fn get_stations(State(state): State<NowPlayingState>) -> Json<Vec<String>> {
    Json(state.aggregator.stations())
}

/// Returns the broadcast schedule
#[utoipa::path(
    get,
    path = "/schedule",
    responses(
        (status = 200, description = "Configured schedule slots", body = Vec<ScheduleEntry>)
    ),
    tag = "nowplaying"
)]
async fn get_schedule(State(state): State<NowPlayingState>) -> Json<Vec<ScheduleEntry>> {
    let entries = state
        .aggregator
        .schedule()
        .slots()
        .iter()
        .map(ScheduleEntry::from)
        .collect();
    Json(entries)
}

/// Switches the live station
#[utoipa::path(
    post,
    path = "/station",
    request_body = SetStationRequest,
    responses(
        (status = 200, description = "Station switched", body = SetStationResponse),
        (status = 404, description = "Station not in the schedule"),
        (status = 502, description = "Liquidsoap unreachable")
    ),
    tag = "nowplaying"
)]
async fn set_station(
    State(state): State<NowPlayingState>,
    Json(payload): Json<SetStationRequest>,
) -> Result<Json<SetStationResponse>, AppError> {
    let known = state.aggregator.stations();
    if !known.iter().any(|s| s == &payload.name) {
        return Err(AppError::not_found(format!(
            "Unknown station: {}",
            payload.name
        )));
    }

    state
        .aggregator
        .set_station(&payload.name)
        .await
        .map_err(|e| AppError::bad_gateway(e.to_string()))?;

    Ok(Json(SetStationResponse {
        station: payload.name,
    }))
}

/// Returns the public stream URL
#[utoipa::path(
    get,
    path = "/stream",
    responses(
        (status = 200, description = "Public stream URL", body = StreamInfo)
    ),
    tag = "nowplaying"
)]
async fn get_stream(State(state): State<NowPlayingState>) -> Json<StreamInfo> {
    Json(StreamInfo {
        url: state.public_stream_url.clone(),
    })
}

/// Returns the DJ connection details
///
/// The password is stored encrypted in the configuration and decrypted
/// here. This endpoint is meant for the LAN dashboard only.
#[utoipa::path(
    get,
    path = "/dj",
    responses(
        (status = 200, description = "DJ connection details", body = DjInfo),
        (status = 500, description = "DJ section missing from configuration")
    ),
    tag = "nowplaying"
)]
async fn get_dj_info() -> Result<Json<DjInfo>, AppError> {
    let config = knobconfig::get_config();

    let host = match config.get_value(&["dj", "host"]) {
        Ok(Value::String(s)) if !s.is_empty() => s,
        _ => return Err(AppError::internal("dj.host is not configured")),
    };
    let port = match config.get_value(&["dj", "port"]) {
        Ok(Value::Number(n)) => n.as_u64().unwrap_or(8005) as u16,
        _ => 8005,
    };
    let user = match config.get_value(&["dj", "user"]) {
        Ok(Value::String(s)) if !s.is_empty() => s,
        _ => "source".to_string(),
    };
    let password = match config.get_value(&["dj", "password"]) {
        Ok(Value::String(s)) if !s.is_empty() => {
            get_password(&s).map_err(|e| AppError::internal(e.to_string()))?
        }
        _ => return Err(AppError::internal("dj.password is not configured")),
    };

    Ok(Json(DjInfo {
        host,
        port,
        user,
        password,
    }))
}

/// OpenAPI document for the now-playing API
#[derive(utoipa::OpenApi)]
#[openapi(
    paths(
        get_now_playing,
        get_stations,
        get_schedule,
        set_station,
        get_stream,
        get_dj_info,
    ),
    components(
        schemas(
            NowPlaying,
            ScheduleEntry,
            SetStationRequest,
            SetStationResponse,
            StreamInfo,
            DjInfo
        )
    ),
    tags(
        (name = "nowplaying", description = "Now-playing status and station control")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use knobstatus::SlotKind;

    #[test]
    fn schedule_entry_formats_hours() {
        let slot = ScheduleSlot::new(22, 2, "Noisefloor", SlotKind::Random);
        let entry = ScheduleEntry::from(&slot);

        assert_eq!(entry.start_fmt, "10pm");
        assert_eq!(entry.end_fmt, "2am");
        assert_eq!(entry.station, "Noisefloor");
        assert_eq!(entry.kind, "random");
    }

    #[test]
    fn schedule_entry_full_day_slot() {
        let slot = ScheduleSlot::new(0, 24, "AUTODJ", SlotKind::Show);
        let entry = ScheduleEntry::from(&slot);

        assert_eq!(entry.start_fmt, "12am");
        assert_eq!(entry.end_fmt, "12am");
        assert_eq!(entry.kind, "show");
    }

    #[test]
    fn app_error_serializes_message() {
        let err = AppError::not_found("Unknown station: KEXP");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
