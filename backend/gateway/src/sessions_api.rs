//! Session endpoints: create, inspect, detect, export, end.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use platelog_core::{
    detect_plate, export_xlsx, DetectionOutcome, DetectionRecord, ImageUpload, EXPORT_FILE_NAME,
    XLSX_MIME,
};
use platelog_logging::{EventLogger, SessionEvent};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::server::GatewayState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub records: Vec<DetectionRecord>,
}

/// `POST /api/sessions`
pub async fn create_session(State(state): State<GatewayState>) -> (StatusCode, Json<Value>) {
    let session_id = state.sessions.create().await;
    EventLogger::log_event(&session_id, SessionEvent::Started);
    (StatusCode::CREATED, Json(json!({ "sessionId": session_id })))
}

/// `GET /api/sessions/{id}`: records in log order.
pub async fn get_session(
    State(state): State<GatewayState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let log = state.sessions.get(&session_id).await?;
    let records = log.lock().await.records().to_vec();
    Ok(Json(SessionView { session_id, records }))
}

/// `DELETE /api/sessions/{id}`: ends the session and drops its log.
pub async fn end_session(
    State(state): State<GatewayState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let records = state.sessions.remove(&session_id).await?;
    EventLogger::log_event(&session_id, SessionEvent::Ended { records });
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/sessions/{id}/detect`: the body is the raw image.
pub async fn detect(
    State(state): State<GatewayState>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<DetectionOutcome>, ApiError> {
    let log = state.sessions.get(&session_id).await?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let image = ImageUpload::new(body.to_vec(), content_type)?;

    let mut log = log.lock().await;
    match detect_plate(state.provider.as_ref(), &mut log, &image).await {
        Ok(outcome) => {
            let event = match &outcome {
                DetectionOutcome::Detected { record } => SessionEvent::Detected {
                    record_id: record.id().to_string(),
                    plate_text: record.plate_text().to_string(),
                },
                DetectionOutcome::NoPlate => SessionEvent::NoPlate,
            };
            EventLogger::log_event(&session_id, event);
            Ok(Json(outcome))
        }
        Err(e) => {
            EventLogger::log_event(&session_id, SessionEvent::Failed { error_msg: e.to_string() });
            Err(e.into())
        }
    }
}

/// `GET /api/sessions/{id}/export`: the log as `matriculas.xlsx`.
pub async fn export(
    State(state): State<GatewayState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let log = state.sessions.get(&session_id).await?;
    let (bytes, rows) = {
        let log = log.lock().await;
        (export_xlsx(&log)?, log.len())
    };
    info!(session = %session_id, rows, "Serving export");
    EventLogger::log_event(&session_id, SessionEvent::Exported { rows });

    let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
