use thiserror::Error;
use tokio::sync::mpsc;

/// Default time-slice between chunk deliveries, in milliseconds
pub const CHUNK_INTERVAL_MS: u64 = 100;

/// Errors surfaced while acquiring or running a capture device
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Microphone permission denied. Please allow microphone access and try again.")]
    PermissionDenied,

    #[error("No microphone found. Please connect a microphone and try again.")]
    DeviceNotFound,

    #[error("Failed to start recording: {0}")]
    StartFailure(String),
}

/// Constraints requested when acquiring the input stream
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
    /// Time-slice between chunk deliveries, in milliseconds
    pub chunk_interval_ms: u64,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
            chunk_interval_ms: CHUNK_INTERVAL_MS,
        }
    }
}

/// Events delivered by an active capture stream.
///
/// Each event carries its payload explicitly; the state machine consumes them
/// from a channel rather than closing over device callbacks.
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    /// A time-sliced chunk of encoded audio
    Data(Vec<u8>),
    /// The device stopped cleanly; no further `Data` events will follow
    Stopped,
    /// The device failed mid-recording
    Error(String),
}

/// Audio capture backend trait
///
/// Implementations own the platform device. The recorder only sees the event
/// channel, the supported-format probe, and start/stop.
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Whether the backend can encode into the given MIME type.
    ///
    /// An empty string means "platform default" and must always be accepted.
    fn supports(&self, mime_type: &str) -> bool;

    /// Acquire the device and start capturing with the selected encoding.
    ///
    /// Returns a channel receiver delivering `CaptureEvent`s in order. The
    /// stream ends with `Stopped` (clean) or `Error` (device failure).
    async fn start(
        &mut self,
        mime_type: &str,
        options: &CaptureOptions,
    ) -> Result<mpsc::Receiver<CaptureEvent>, CaptureError>;

    /// Stop capturing and release the underlying device tracks.
    ///
    /// Must flush pending chunks and close the event channel. Safe to call
    /// when not capturing.
    async fn stop(&mut self);

    /// Backend name for logging
    fn name(&self) -> &str;
}
