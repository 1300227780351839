//! Microphone capture and the recording state machine
//!
//! This module provides the `Recorder` abstraction that manages:
//! - Device acquisition through a pluggable `CaptureBackend`
//! - Capture format probing (opus-in-webm preferred, then webm/mp4/wav)
//! - Chunk buffering in arrival order and the elapsed-time ticker
//! - Finalizing a session into a normalized `AudioPayload`

mod backend;
mod recorder;

pub use backend::{CaptureBackend, CaptureError, CaptureEvent, CaptureOptions, CHUNK_INTERVAL_MS};
pub use recorder::{format_clock, Recorder, RecorderCommand, RecorderState};
