use super::backend::{CaptureBackend, CaptureError, CaptureEvent, CaptureOptions};
use crate::client::{TranscribeError, TranscribeMode, TranscriptionClient};
use crate::media::{AudioFormat, AudioPayload};
use crate::transcript::TranscriptionResult;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Capture encodings probed in preference order. The trailing empty string is
/// the platform default, assumed to produce webm.
const FORMAT_PREFERENCES: &[&str] = &[
    "audio/webm;codecs=opus",
    "audio/webm",
    "audio/mp4",
    "audio/wav",
    "",
];

/// Recorder lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    Processing,
}

/// Commands the keyboard shortcut can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderCommand {
    Start,
    Stop,
}

/// Transient per-recording state, created on start and torn down on finalize
struct Session {
    id: String,
    mime_type: String,
    events: mpsc::Receiver<CaptureEvent>,
    chunks: Vec<Vec<u8>>,
    elapsed_secs: Arc<AtomicU64>,
    timer: JoinHandle<()>,
}

/// The recording state machine: owns device access through a `CaptureBackend`,
/// buffers chunks in arrival order, and finalizes into an `AudioPayload`.
///
/// Only one session may be active at a time; a start request while recording or
/// processing is rejected, not queued.
pub struct Recorder<B: CaptureBackend> {
    backend: B,
    options: CaptureOptions,
    default_format: AudioFormat,
    state: RecorderState,
    session: Option<Session>,
}

impl<B: CaptureBackend> Recorder<B> {
    pub fn new(backend: B, options: CaptureOptions, default_format: AudioFormat) -> Self {
        Self {
            backend,
            options,
            default_format,
            state: RecorderState::Idle,
            session: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Seconds elapsed in the active session (0 when idle)
    pub fn elapsed_seconds(&self) -> u64 {
        self.session
            .as_ref()
            .map(|s| s.elapsed_secs.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.id.as_str())
    }

    /// Map the space-bar shortcut to a command for the current state.
    ///
    /// Suppressed while focus is in a text-editing control, and while a
    /// finished recording is still processing.
    pub fn command_for_shortcut(&self, editing_text: bool) -> Option<RecorderCommand> {
        if editing_text {
            return None;
        }
        match self.state {
            RecorderState::Idle => Some(RecorderCommand::Start),
            RecorderState::Recording => Some(RecorderCommand::Stop),
            RecorderState::Processing => None,
        }
    }

    /// Probe the backend for the best-supported capture encoding
    fn select_mime_type(&self) -> &'static str {
        FORMAT_PREFERENCES
            .iter()
            .copied()
            .find(|mime| self.backend.supports(mime))
            .unwrap_or("")
    }

    /// Start a new recording session.
    ///
    /// On any failure the state stays `Idle` and no session is created.
    pub async fn start(&mut self) -> Result<(), CaptureError> {
        if self.state != RecorderState::Idle {
            return Err(CaptureError::StartFailure(
                "a recording session is already active".to_string(),
            ));
        }

        let mime_type = self.select_mime_type();
        info!(
            "Starting recording on {} (encoding: {})",
            self.backend.name(),
            if mime_type.is_empty() { "platform default" } else { mime_type }
        );

        let events = self.backend.start(mime_type, &self.options).await?;

        // 1-second ticker for the on-screen timer
        let elapsed_secs = Arc::new(AtomicU64::new(0));
        let tick_counter = Arc::clone(&elapsed_secs);
        let timer = tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
            interval.tick().await; // first tick fires immediately
            loop {
                interval.tick().await;
                tick_counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        self.session = Some(Session {
            id: format!("rec-{}", uuid::Uuid::new_v4()),
            mime_type: mime_type.to_string(),
            events,
            chunks: Vec::new(),
            elapsed_secs,
            timer,
        });
        self.state = RecorderState::Recording;

        Ok(())
    }

    /// Drain currently-available capture events into the chunk buffer.
    ///
    /// Returns a device error message if the stream reported one; the caller
    /// should respond by stopping the session.
    pub fn pump(&mut self) -> Option<String> {
        let session = self.session.as_mut()?;
        let mut device_error = None;

        while let Ok(event) = session.events.try_recv() {
            match event {
                CaptureEvent::Data(chunk) => {
                    if !chunk.is_empty() {
                        session.chunks.push(chunk);
                    }
                }
                CaptureEvent::Stopped => {}
                CaptureEvent::Error(msg) => {
                    warn!("Capture device error: {}", msg);
                    device_error = Some(msg);
                }
            }
        }

        device_error
    }

    /// Stop the active recording and finalize the buffered chunks.
    ///
    /// Transitions `Recording -> Processing`. The backend is stopped first so
    /// no chunk can arrive after finalize begins; the event channel is then
    /// drained to exhaustion before the payload is assembled.
    pub async fn stop(&mut self) -> Result<AudioPayload, CaptureError> {
        let Some(mut session) = self.session.take() else {
            return Err(CaptureError::StartFailure(
                "no recording in progress".to_string(),
            ));
        };

        self.state = RecorderState::Processing;

        // Release the device; this flushes pending chunks and closes the channel
        self.backend.stop().await;
        session.timer.abort();

        // Collect everything the device delivered before it stopped
        while let Some(event) = session.events.recv().await {
            match event {
                CaptureEvent::Data(chunk) => {
                    if !chunk.is_empty() {
                        session.chunks.push(chunk);
                    }
                }
                CaptureEvent::Stopped => {}
                CaptureEvent::Error(msg) => warn!("Capture device error at stop: {}", msg),
            }
        }

        let total: usize = session.chunks.iter().map(Vec::len).sum();
        let mut bytes = Vec::with_capacity(total);
        for chunk in &session.chunks {
            bytes.extend_from_slice(chunk);
        }

        info!(
            "Session {} finalized: {} chunks, {} bytes",
            session.id,
            session.chunks.len(),
            total
        );

        Ok(AudioPayload::normalized(
            bytes,
            &session.mime_type,
            self.default_format,
        ))
    }

    /// Return to `Idle` after a transcription attempt has settled
    pub fn finish(&mut self) {
        self.session = None;
        self.state = RecorderState::Idle;
    }

    /// Stop the session, submit the finalized audio, and return to `Idle`.
    ///
    /// The state is never left in `Processing`: success and every error path
    /// alike end with the recorder idle and the device released.
    pub async fn stop_and_transcribe(
        &mut self,
        client: &TranscriptionClient,
        mode: TranscribeMode,
        language: Option<&str>,
    ) -> Result<TranscriptionResult, TranscribeError> {
        let payload = match self.stop().await {
            Ok(payload) => payload,
            Err(err) => {
                self.finish();
                return Err(TranscribeError::Application(err.to_string()));
            }
        };

        let result = client.submit(payload, mode, language).await;
        self.finish();
        result
    }
}

/// Render elapsed seconds as `MM:SS` for the recording timer
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
