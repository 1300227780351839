use super::error::TranscribeError;
use crate::media::{AudioFormat, AudioPayload};
use crate::transcript::TranscriptionResult;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Transcription operations the backend exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscribeMode {
    /// Plain transcription
    Transcribe,
    /// Transcription with segments and duration
    TranscribeVerbose,
    /// Translation to English; ignores any language hint
    Translate,
}

impl TranscribeMode {
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            TranscribeMode::Transcribe => "/api/voice-to-text/transcribe",
            TranscribeMode::TranscribeVerbose => "/api/voice-to-text/transcribe-verbose",
            TranscribeMode::Translate => "/api/voice-to-text/translate",
        }
    }
}

/// JSON envelope every transcription endpoint responds with
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TranscriptionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Client for the voice-to-text HTTP API
pub struct TranscriptionClient {
    http: reqwest::Client,
    base_url: String,
    default_format: AudioFormat,
}

impl TranscriptionClient {
    pub fn new(base_url: impl Into<String>, default_format: AudioFormat) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            default_format,
        })
    }

    /// Upload a finalized recording and return the transcription.
    ///
    /// The payload is re-normalized first (idempotent, so payloads straight
    /// from the recorder pass through untouched). `language` is sent only for
    /// transcription modes and only when it is a concrete code, never `auto`.
    pub async fn submit(
        &self,
        payload: AudioPayload,
        mode: TranscribeMode,
        language: Option<&str>,
    ) -> Result<TranscriptionResult, TranscribeError> {
        let payload =
            AudioPayload::normalized(payload.bytes, &payload.mime_type, self.default_format);

        debug!(
            "Uploading {} bytes as {} ({})",
            payload.bytes.len(),
            payload.file_name,
            payload.mime_type
        );

        let part = reqwest::multipart::Part::bytes(payload.bytes)
            .file_name(payload.file_name.clone())
            .mime_str(&payload.mime_type)
            .map_err(|e| TranscribeError::Application(format!("Invalid audio type: {e}")))?;

        // No explicit content-type header: reqwest generates the multipart
        // boundary itself.
        let mut form = reqwest::multipart::Form::new().part("audio", part);
        if mode != TranscribeMode::Translate {
            if let Some(lang) = language.filter(|l| !l.is_empty() && *l != "auto") {
                form = form.text("language", lang.to_string());
            }
        }

        let url = format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            mode.endpoint_path()
        );

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(TranscribeError::Network)?;

        let status = response.status();
        let body = response.text().await.map_err(TranscribeError::Network)?;

        if !status.is_success() {
            // Prefer the JSON error body; fall back to the status text
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            return Err(TranscribeError::from_response(status.as_u16(), message));
        }

        let envelope: ApiEnvelope = serde_json::from_str(&body)
            .map_err(|e| TranscribeError::Parse(e.to_string()))?;

        match envelope {
            ApiEnvelope {
                success: true,
                data: Some(result),
                ..
            } => {
                info!(
                    "Transcription complete: {} chars{}",
                    result.text.len(),
                    result
                        .language
                        .as_deref()
                        .map(|l| format!(" ({l})"))
                        .unwrap_or_default()
                );
                Ok(result)
            }
            ApiEnvelope { error, .. } => Err(TranscribeError::Application(
                error.unwrap_or_else(|| "Transcription failed".to_string()),
            )),
        }
    }
}
