use crate::media::AudioFormat;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Origin of the real transcription backend (no trailing slash)
    pub backend_base_url: String,

    /// Container assumed when an upload carries no usable type hint
    pub default_format: AudioFormat,

    /// Pooled client for upstream forwarding
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(backend_base_url: impl Into<String>, default_format: AudioFormat) -> Self {
        let backend_base_url = backend_base_url.into();
        Self {
            backend_base_url: backend_base_url.trim_end_matches('/').to_string(),
            default_format,
            http: reqwest::Client::new(),
        }
    }
}
