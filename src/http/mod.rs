//! Upload-normalizing proxy for the transcription backend
//!
//! This module exposes the internal voice-to-text route the browser talks to:
//! - POST /api/voice-to-text/:operation - repair upload metadata and forward
//! - GET /health - health check
//!
//! File fields frequently arrive with a missing or generic content type; each
//! one is buffered in full, repaired through the shared media contract, and
//! re-sent. Upstream status codes and error bodies pass through verbatim.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
