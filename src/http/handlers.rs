use super::state::AppState;
use crate::notify::{ErrorResponse, NotifyAck};
use crate::prejoin::TranslationSettings;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use tracing::{error, info, warn};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDetailsQuery {
    pub room_name: Option<String>,
    pub participant_name: Option<String>,
    pub metadata: Option<String>,
    pub region: Option<String>,
}

/// Lenient view of a notification so each missing field gets its own error
#[derive(Debug, Deserialize)]
pub struct NotifyBody {
    pub action: Option<String>,
    pub username: Option<String>,
    pub settings: Option<TranslationSettings>,
}

fn error_response(status: StatusCode, error: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/connection-details
/// Issue a participant token for a room
pub async fn connection_details(
    State(state): State<AppState>,
    Query(query): Query<ConnectionDetailsQuery>,
) -> Response {
    let (Some(room), Some(participant)) = (
        query.room_name.filter(|r| !r.is_empty()),
        query.participant_name.filter(|p| !p.is_empty()),
    ) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing required parameters");
    };

    if let Some(region) = &query.region {
        info!("Connection details requested for region {}", region);
    }

    match state
        .issuer
        .issue(&room, &participant, query.metadata.as_deref())
    {
        Ok(details) => {
            info!("Issued credentials for {} in room {}", participant, room);
            (
                StatusCode::OK,
                [(header::CACHE_CONTROL, "no-store")],
                Json(details),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to sign participant token: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// POST /api/notify-bot
/// Relay a translation start/stop to the translation backend
pub async fn notify_bot(
    State(state): State<AppState>,
    payload: Result<Json<NotifyBody>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(e) => {
            warn!("Rejected notify request: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    let (Some(action), Some(username)) = (
        body.action.filter(|a| !a.is_empty()),
        body.username.filter(|u| !u.is_empty()),
    ) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing required fields");
    };

    match action.as_str() {
        "start_translation" => {
            let Some(settings) = body.settings else {
                return error_response(StatusCode::BAD_REQUEST, "Missing translation settings");
            };

            info!(
                "Starting translation for {} ({} -> {}, {:?} voice)",
                username, settings.input_lang, settings.output_lang, settings.gender
            );

            // No backend process is attached yet; stand in for its startup time
            if !state.start_delay.is_zero() {
                tokio::time::sleep(state.start_delay).await;
            }

            ack("Translation started")
        }
        "stop_translation" => {
            info!("Stopping translation for {}", username);
            ack("Translation stopped")
        }
        other => {
            warn!("Unknown notify action: {}", other);
            error_response(StatusCode::BAD_REQUEST, "Invalid action")
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn ack(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(NotifyAck {
            success: true,
            message: message.to_string(),
        }),
    )
        .into_response()
}
