//! Shared MIME/extension contract for captured audio.
//!
//! Browsers and capture backends routinely hand over blobs with a missing or
//! generic content type. Every path that constructs or re-wraps audio (client
//! capture, proxy reconstruction) goes through this module so that the payload's
//! MIME type and filename extension always match.

use serde::{Deserialize, Serialize};

/// Generic placeholder type some clients attach to binary uploads
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Audio container formats the transcription backend accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Webm,
    Mp4,
    Wav,
    Ogg,
}

impl AudioFormat {
    /// Canonical MIME type for this container
    pub fn mime(&self) -> &'static str {
        match self {
            AudioFormat::Webm => "audio/webm",
            AudioFormat::Mp4 => "audio/mp4",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Ogg => "audio/ogg",
        }
    }

    /// Filename extension consistent with [`Self::mime`]
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Webm => "webm",
            AudioFormat::Mp4 => "mp4",
            AudioFormat::Wav => "wav",
            AudioFormat::Ogg => "ogg",
        }
    }

    /// Map a reported MIME type to a container.
    ///
    /// Substring matching on purpose: capture backends report types like
    /// `audio/webm;codecs=opus`, and m4a files travel as the mp4 container.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.to_ascii_lowercase();
        if mime.contains("webm") {
            Some(AudioFormat::Webm)
        } else if mime.contains("mp4") || mime.contains("m4a") {
            Some(AudioFormat::Mp4)
        } else if mime.contains("wav") {
            Some(AudioFormat::Wav)
        } else if mime.contains("ogg") {
            Some(AudioFormat::Ogg)
        } else {
            None
        }
    }

    /// Map a filename to a container by its extension
    pub fn from_file_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if name.ends_with(".webm") {
            Some(AudioFormat::Webm)
        } else if name.ends_with(".mp4") || name.ends_with(".m4a") {
            Some(AudioFormat::Mp4)
        } else if name.ends_with(".wav") {
            Some(AudioFormat::Wav)
        } else if name.ends_with(".ogg") {
            Some(AudioFormat::Ogg)
        } else {
            None
        }
    }
}

/// Whether a reported content type needs repair (missing or generic)
pub fn needs_repair(mime: &str) -> bool {
    mime.is_empty() || mime == OCTET_STREAM
}

/// Finalized audio ready for upload. Invariant: `mime_type` and the extension
/// of `file_name` are always mutually consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

impl AudioPayload {
    /// Build a payload from raw bytes and a reported MIME type, repairing the
    /// type and deriving a consistent `recording.<ext>` filename.
    ///
    /// `default_format` is used when the type is missing/generic and carries no
    /// recognizable container hint. Applying this to an already-normalized
    /// payload is a no-op.
    pub fn normalized(bytes: Vec<u8>, reported_mime: &str, default_format: AudioFormat) -> Self {
        let format = AudioFormat::from_mime(reported_mime).unwrap_or(default_format);

        // Keep a specific reported type as-is (it may carry codec parameters);
        // only substitute when the type is missing or the generic placeholder.
        let mime_type = if needs_repair(reported_mime) {
            format.mime().to_string()
        } else {
            reported_mime.to_string()
        };

        Self {
            bytes,
            mime_type,
            file_name: format!("recording.{}", format.extension()),
        }
    }

    /// Container this payload is tagged with
    pub fn format(&self) -> AudioFormat {
        // The constructor guarantees a recognizable type; webm is the documented
        // fallback for anything exotic that slipped through.
        AudioFormat::from_mime(&self.mime_type).unwrap_or(AudioFormat::Webm)
    }

    /// Filename extension, always present by construction
    pub fn extension(&self) -> &'static str {
        self.format().extension()
    }
}

/// Repair a multipart file field's metadata before it is forwarded upstream.
///
/// Returns the corrected `(mime_type, file_name)` pair. The type is only
/// substituted when the reported one is missing or generic; the filename gets a
/// consistent extension, synthesized as `recording.<ext>` when absent.
pub fn repair_file_metadata(
    reported_mime: &str,
    file_name: &str,
    default_format: AudioFormat,
) -> (String, String) {
    let mime_type = if needs_repair(reported_mime) {
        // Infer from the filename, falling back to the configured default
        AudioFormat::from_file_name(file_name)
            .unwrap_or(default_format)
            .mime()
            .to_string()
    } else {
        reported_mime.to_string()
    };

    let format = AudioFormat::from_mime(&mime_type).unwrap_or(default_format);
    let file_name = if file_name.is_empty() || !file_name.contains('.') {
        format!("recording.{}", format.extension())
    } else {
        file_name.to_string()
    };

    (mime_type, file_name)
}
