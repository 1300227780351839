use super::state::AppState;
use crate::media::{needs_repair, repair_file_metadata};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::{error, info, warn};

/// Operations the proxy is willing to forward
const OPERATIONS: &[&str] = &["transcribe", "transcribe-verbose", "translate"];

/// Failure envelope returned for every non-success outcome
#[derive(Debug, Serialize)]
pub struct FailureEnvelope {
    pub success: bool,
    pub error: String,
}

impl FailureEnvelope {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

fn failure(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(FailureEnvelope::new(error))).into_response()
}

/// POST /api/voice-to-text/:operation
/// Normalize a multipart upload and forward it to the transcription backend
pub async fn forward_upload(
    State(state): State<AppState>,
    Path(operation): Path<String>,
    multipart: Multipart,
) -> Response {
    if !OPERATIONS.contains(&operation.as_str()) {
        return failure(
            StatusCode::NOT_FOUND,
            format!("Unknown operation: {operation}"),
        );
    }

    let form = match rebuild_form(&state, multipart).await {
        Ok(form) => form,
        Err(message) => {
            error!("Failed to read upload: {}", message);
            return failure(StatusCode::INTERNAL_SERVER_ERROR, message);
        }
    };

    let url = format!("{}/api/voice-to-text/{}", state.backend_base_url, operation);
    info!("Forwarding {} upload to {}", operation, url);

    // No manual content-type header: reqwest generates the multipart boundary.
    let response = match state.http.post(&url).multipart(form).send().await {
        Ok(response) => response,
        Err(err) => {
            error!("Backend request failed: {}", err);
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to connect to backend. Please ensure the backend server is running.",
            );
        }
    };

    relay_response(response).await
}

/// Rebuild the incoming multipart form, repairing file metadata.
///
/// Every field is buffered fully; this route is deliberately not a streaming
/// passthrough. Non-file fields are copied through unchanged.
async fn rebuild_form(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<reqwest::multipart::Form, String> {
    let mut form = reqwest::multipart::Form::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Invalid multipart request: {e}"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        // A filename or content type marks a binary file field
        if file_name.is_some() || content_type.is_some() {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| format!("Failed to read field {name}: {e}"))?;

            let reported = content_type.as_deref().unwrap_or("");
            let original_name = file_name.as_deref().unwrap_or("");
            let (mime_type, out_name) =
                repair_file_metadata(reported, original_name, state.default_format);

            if needs_repair(reported) || out_name != original_name {
                warn!(
                    "Repaired upload field {}: type {:?} -> {}, name {:?} -> {}",
                    name, reported, mime_type, original_name, out_name
                );
            }

            let part = reqwest::multipart::Part::bytes(bytes.to_vec())
                .file_name(out_name)
                .mime_str(&mime_type)
                .map_err(|e| format!("Invalid content type for field {name}: {e}"))?;
            form = form.part(name, part);
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| format!("Failed to read field {name}: {e}"))?;
            form = form.text(name, value);
        }
    }

    Ok(form)
}

/// Translate the backend response, preserving its status code verbatim.
///
/// The body is read exactly once; what it contains decides the shape that goes
/// back to the caller.
async fn relay_response(response: reqwest::Response) -> Response {
    let status =
        StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let status_text = status
        .canonical_reason()
        .unwrap_or("unknown status")
        .to_string();

    let is_json = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false);

    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            error!("Failed to read backend response: {}", err);
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to connect to backend. Please ensure the backend server is running.",
            );
        }
    };

    if !is_json {
        // Plain-text upstream failure (e.g. a gateway page); relay the raw body
        let message = if body.is_empty() {
            format!("Backend error: {status_text}")
        } else {
            body
        };
        return failure(status, message);
    }

    let value: serde_json::Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(err) => {
            error!("Backend sent undecodable JSON: {}", err);
            return failure(
                status,
                format!("Backend returned invalid response ({})", status.as_u16()),
            );
        }
    };

    if !status.is_success() {
        // 429 quota errors and friends: keep the code, extract the message
        let message = ["error", "message", "detail"]
            .iter()
            .find_map(|key| value.get(key).and_then(|v| v.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Backend error: {status_text}"));
        return failure(status, message);
    }

    (status, Json(value)).into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
