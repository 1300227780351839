use thiserror::Error;

/// Failure classes for a transcription attempt.
///
/// The HTTP status that produced a classified failure is preserved so a 429
/// stays distinguishable from a 500 end-to-end. Nothing is retried; every
/// failure is terminal for the attempt.
#[derive(Debug, Error)]
pub enum TranscribeError {
    /// Connection or transport failure before a response arrived
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// HTTP 401
    #[error("authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// HTTP 429, or an error message mentioning quota/rate limits
    #[error("quota exceeded ({status}): {message}")]
    Quota { status: u16, message: String },

    /// HTTP 5xx or any other unrecognized non-2xx response
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Response body was not the expected JSON shape
    #[error("invalid response body: {0}")]
    Parse(String),

    /// HTTP 2xx but the envelope reported failure
    #[error("{0}")]
    Application(String),
}

impl TranscribeError {
    /// Classify a non-2xx response by status code and extracted message
    pub fn from_response(status: u16, message: String) -> Self {
        let lowered = message.to_ascii_lowercase();
        if status == 401 {
            TranscribeError::Auth { status, message }
        } else if status == 429 || lowered.contains("quota") || lowered.contains("rate limit") {
            TranscribeError::Quota { status, message }
        } else {
            TranscribeError::Server { status, message }
        }
    }

    /// Original HTTP status, where one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            TranscribeError::Auth { status, .. }
            | TranscribeError::Quota { status, .. }
            | TranscribeError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// One human-readable sentence suitable for direct display
    pub fn user_message(&self) -> String {
        match self {
            TranscribeError::Network(_) => {
                "Cannot connect to server. Please ensure the backend is running and check your network connection.".to_string()
            }
            TranscribeError::Quota { .. } => {
                "API quota or rate limit exceeded. Please check your transcription plan and billing details, or try again later.".to_string()
            }
            TranscribeError::Auth { .. } => {
                "Authentication failed. Please check your transcription API key credentials.".to_string()
            }
            TranscribeError::Server { .. } => {
                "Server error occurred. Please try again or check if the backend service is running properly.".to_string()
            }
            TranscribeError::Parse(_) => {
                "Failed to transcribe audio. Please try again.".to_string()
            }
            TranscribeError::Application(message) => message.clone(),
        }
    }
}
