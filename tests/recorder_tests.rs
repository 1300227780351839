// Integration tests for the recording state machine
//
// A scripted capture backend stands in for the platform device so the tests
// can exercise chunk ordering, the drain-before-finalize guarantee, busy
// rejection, and the never-stuck-in-processing rule.

use anyhow::Result;
use axum::{response::Json, routing::post, Router};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use voxnote::{
    format_clock, AudioFormat, CaptureBackend, CaptureError, CaptureEvent, CaptureOptions,
    Recorder, RecorderCommand, RecorderState, TranscribeError, TranscribeMode,
    TranscriptionClient,
};

/// Capture backend that replays a script instead of touching a device
struct ScriptedBackend {
    supported: Vec<&'static str>,
    early_chunks: Vec<Vec<u8>>,
    /// Delivered during stop, before the channel closes: models a chunk
    /// callback still in flight when the user hits stop
    late_chunk: Option<Vec<u8>>,
    start_error: Option<CaptureError>,
    error_event: Option<String>,
    tx: Option<mpsc::Sender<CaptureEvent>>,
    released: Arc<AtomicBool>,
}

impl ScriptedBackend {
    fn new(early_chunks: Vec<Vec<u8>>) -> Self {
        Self {
            supported: vec!["audio/webm;codecs=opus", "audio/webm"],
            early_chunks,
            late_chunk: None,
            start_error: None,
            error_event: None,
            tx: None,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    fn released_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

#[async_trait::async_trait]
impl CaptureBackend for ScriptedBackend {
    fn supports(&self, mime_type: &str) -> bool {
        mime_type.is_empty() || self.supported.contains(&mime_type)
    }

    async fn start(
        &mut self,
        _mime_type: &str,
        _options: &CaptureOptions,
    ) -> Result<mpsc::Receiver<CaptureEvent>, CaptureError> {
        if let Some(err) = self.start_error.take() {
            return Err(err);
        }

        let (tx, rx) = mpsc::channel(64);
        for chunk in &self.early_chunks {
            tx.send(CaptureEvent::Data(chunk.clone())).await.ok();
        }
        if let Some(msg) = self.error_event.take() {
            tx.send(CaptureEvent::Error(msg)).await.ok();
        }
        self.tx = Some(tx);
        Ok(rx)
    }

    async fn stop(&mut self) {
        if let Some(tx) = self.tx.take() {
            if let Some(chunk) = self.late_chunk.take() {
                tx.send(CaptureEvent::Data(chunk)).await.ok();
            }
            tx.send(CaptureEvent::Stopped).await.ok();
        }
        self.released.store(true, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn recorder_with(backend: ScriptedBackend) -> Recorder<ScriptedBackend> {
    Recorder::new(backend, CaptureOptions::default(), AudioFormat::Webm)
}

#[tokio::test]
async fn test_chunks_are_assembled_in_arrival_order() -> Result<()> {
    let mut backend = ScriptedBackend::new(vec![b"ab".to_vec(), b"cd".to_vec()]);
    backend.late_chunk = Some(b"ef".to_vec());
    let released = backend.released_flag();

    let mut recorder = recorder_with(backend);
    recorder.start().await?;
    assert_eq!(recorder.state(), RecorderState::Recording);
    assert!(recorder.session_id().is_some());

    let payload = recorder.stop().await?;

    // The late chunk was still pending when stop began; finalize must wait
    // for it, and ordering must match arrival order.
    assert_eq!(payload.bytes, b"abcdef".to_vec());
    // The probe picked opus-in-webm; the specific type is kept, the filename
    // carries the matching container extension.
    assert_eq!(payload.mime_type, "audio/webm;codecs=opus");
    assert_eq!(payload.file_name, "recording.webm");

    assert_eq!(recorder.state(), RecorderState::Processing);
    assert!(released.load(Ordering::SeqCst), "device tracks released");

    recorder.finish();
    assert_eq!(recorder.state(), RecorderState::Idle);

    Ok(())
}

#[tokio::test]
async fn test_second_start_is_rejected_not_queued() -> Result<()> {
    let mut recorder = recorder_with(ScriptedBackend::new(vec![b"x".to_vec()]));
    recorder.start().await?;

    // Busy while recording
    let err = recorder.start().await.unwrap_err();
    assert!(matches!(err, CaptureError::StartFailure(_)));

    // Busy while processing
    let _payload = recorder.stop().await?;
    assert_eq!(recorder.state(), RecorderState::Processing);
    let err = recorder.start().await.unwrap_err();
    assert!(matches!(err, CaptureError::StartFailure(_)));

    // Free again once the attempt settles
    recorder.finish();
    recorder.start().await?;
    assert_eq!(recorder.state(), RecorderState::Recording);

    Ok(())
}

#[tokio::test]
async fn test_acquisition_failure_reverts_to_idle() {
    let mut backend = ScriptedBackend::new(vec![]);
    backend.start_error = Some(CaptureError::PermissionDenied);

    let mut recorder = recorder_with(backend);
    let err = recorder.start().await.unwrap_err();
    assert!(matches!(err, CaptureError::PermissionDenied));
    assert_eq!(recorder.state(), RecorderState::Idle);
    assert!(recorder.session_id().is_none(), "no session on failure");

    // The message is directly displayable
    assert!(err.to_string().contains("permission denied"));
}

#[tokio::test]
async fn test_device_not_found_is_distinguishable() {
    let mut backend = ScriptedBackend::new(vec![]);
    backend.start_error = Some(CaptureError::DeviceNotFound);

    let mut recorder = recorder_with(backend);
    let err = recorder.start().await.unwrap_err();
    assert!(matches!(err, CaptureError::DeviceNotFound));
    assert_eq!(recorder.state(), RecorderState::Idle);
}

#[tokio::test]
async fn test_device_error_surfaces_through_pump_and_still_finalizes() -> Result<()> {
    let mut backend = ScriptedBackend::new(vec![b"ok".to_vec()]);
    backend.error_event = Some("device unplugged".to_string());

    let mut recorder = recorder_with(backend);
    recorder.start().await?;

    let device_error = recorder.pump();
    assert_eq!(device_error.as_deref(), Some("device unplugged"));

    // The stop path still produces whatever was captured
    let payload = recorder.stop().await?;
    assert_eq!(payload.bytes, b"ok".to_vec());

    Ok(())
}

#[tokio::test]
async fn test_stop_without_recording_is_an_error() {
    let mut recorder = recorder_with(ScriptedBackend::new(vec![]));
    let err = recorder.stop().await.unwrap_err();
    assert!(matches!(err, CaptureError::StartFailure(_)));
    assert_eq!(recorder.state(), RecorderState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_elapsed_seconds_tick_while_recording() -> Result<()> {
    let mut recorder = recorder_with(ScriptedBackend::new(vec![]));
    recorder.start().await?;
    assert_eq!(recorder.elapsed_seconds(), 0);

    // Let the timer task register its interval before moving the clock
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
    tokio::time::advance(std::time::Duration::from_secs(3)).await;
    // Let the timer task process its due ticks
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }

    assert_eq!(recorder.elapsed_seconds(), 3);
    assert_eq!(format_clock(recorder.elapsed_seconds()), "00:03");

    recorder.stop().await?;
    recorder.finish();
    assert_eq!(recorder.elapsed_seconds(), 0, "reset once idle");

    Ok(())
}

#[tokio::test]
async fn test_shortcut_mapping_follows_state() -> Result<()> {
    let mut recorder = recorder_with(ScriptedBackend::new(vec![]));

    assert_eq!(
        recorder.command_for_shortcut(false),
        Some(RecorderCommand::Start)
    );
    // Suppressed while typing in a text control
    assert_eq!(recorder.command_for_shortcut(true), None);

    recorder.start().await?;
    assert_eq!(
        recorder.command_for_shortcut(false),
        Some(RecorderCommand::Stop)
    );

    recorder.stop().await?;
    assert_eq!(recorder.command_for_shortcut(false), None);

    Ok(())
}

/// Spawn a stub transcription backend and return its base URL
async fn spawn_backend(router: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn test_successful_transcription_returns_to_idle() -> Result<()> {
    let router = Router::new().route(
        "/api/voice-to-text/transcribe",
        post(|| async {
            Json(serde_json::json!({
                "success": true,
                "data": { "text": "hello from the booth", "language": "en" }
            }))
        }),
    );
    let base_url = spawn_backend(router).await?;
    let client = TranscriptionClient::new(&base_url, AudioFormat::Webm)?;

    let mut recorder = recorder_with(ScriptedBackend::new(vec![b"audio".to_vec()]));
    recorder.start().await?;

    let result = recorder
        .stop_and_transcribe(&client, TranscribeMode::Transcribe, Some("auto"))
        .await?;

    assert_eq!(result.text, "hello from the booth");
    assert_eq!(recorder.state(), RecorderState::Idle);

    Ok(())
}

#[tokio::test]
async fn test_failed_transcription_still_returns_to_idle() -> Result<()> {
    let router = Router::new().route(
        "/api/voice-to-text/transcribe",
        post(|| async {
            (
                axum::http::StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({ "success": false, "error": "quota exceeded" })),
            )
        }),
    );
    let base_url = spawn_backend(router).await?;
    let client = TranscriptionClient::new(&base_url, AudioFormat::Webm)?;

    let mut recorder = recorder_with(ScriptedBackend::new(vec![b"audio".to_vec()]));
    recorder.start().await?;

    let err = recorder
        .stop_and_transcribe(&client, TranscribeMode::Transcribe, None)
        .await
        .unwrap_err();

    assert!(matches!(err, TranscribeError::Quota { status: 429, .. }));
    assert!(err.user_message().contains("quota or rate limit"));
    // The UI must never stay stuck in processing after a settled attempt
    assert_eq!(recorder.state(), RecorderState::Idle);

    Ok(())
}
