//! Transcription result model and presenter helpers

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A time-aligned transcript segment (verbose mode)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: u32,
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds
    pub end: f64,
    pub text: String,
}

/// Legacy timestamp entry: same shape as [`Segment`] minus the id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Result returned by the transcription endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub text: String,

    /// Detected (or requested) language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Task the backend performed (verbose mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,

    /// Audio duration in seconds (verbose mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    /// Time-aligned segments (verbose mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<Segment>>,

    /// Legacy timestamps field from older backends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<Vec<TimeSpan>>,
}

impl TranscriptionResult {
    /// Time-aligned view for rendering.
    ///
    /// `segments` takes precedence per index over the legacy `timestamps`
    /// field; legacy entries get their index as a synthesized id.
    pub fn merged_segments(&self) -> Vec<Segment> {
        let segments = self.segments.as_deref().unwrap_or(&[]);
        let timestamps = self.timestamps.as_deref().unwrap_or(&[]);

        let len = if self.segments.is_some() {
            segments.len()
        } else {
            timestamps.len()
        };

        (0..len)
            .filter_map(|idx| {
                segments.get(idx).cloned().or_else(|| {
                    timestamps.get(idx).map(|span| Segment {
                        id: idx as u32,
                        start: span.start,
                        end: span.end,
                        text: span.text.clone(),
                    })
                })
            })
            .collect()
    }

    pub fn has_segments(&self) -> bool {
        !self.merged_segments().is_empty()
    }

    /// Bare transcript text, as handed to the clipboard by the copy action
    pub fn plain_text(&self) -> &str {
        &self.text
    }

    /// Timestamped name for the download action
    pub fn download_file_name(&self) -> String {
        format!("transcription-{}.txt", Utc::now().to_rfc3339())
    }

    /// Write the transcript text to a file (the download action)
    pub fn write_download(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, &self.text)?;
        Ok(())
    }
}
