pub mod capture;
pub mod client;
pub mod config;
pub mod http;
pub mod media;
pub mod transcript;

pub use capture::{
    format_clock, CaptureBackend, CaptureError, CaptureEvent, CaptureOptions, Recorder,
    RecorderCommand, RecorderState,
};
pub use client::{ApiEnvelope, TranscribeError, TranscribeMode, TranscriptionClient};
pub use config::Config;
pub use http::{create_router, AppState};
pub use media::{AudioFormat, AudioPayload};
pub use transcript::{Segment, TimeSpan, TranscriptionResult};
