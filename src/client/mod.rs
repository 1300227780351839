//! HTTP client for the transcription endpoints
//!
//! Normalizes finalized audio into a multipart upload, selects the endpoint by
//! mode, and maps HTTP/JSON outcomes into the `TranscribeError` taxonomy.

mod error;
mod transcribe;

pub use error::TranscribeError;
pub use transcribe::{ApiEnvelope, TranscribeMode, TranscriptionClient};
