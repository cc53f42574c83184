//! voxpipe - Speech pipeline service core
//!
//! Text-to-speech synthesis, voice conversion toward a target speaker
//! model, and diarized transcription, composed per request.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod conversion;
pub mod defaults;
pub mod diarization;
pub mod error;
pub mod models;
pub mod service;
pub mod synthesis;
pub mod transcription;

// Core data types
pub use audio::Waveform;
pub use conversion::{AudioChunk, ConversionParameters, ExportFormat, PitchContour, PitchMethod};
pub use diarization::{LabeledSegment, MergedTranscript, SpeakerTurn};
pub use transcription::{Transcript, TranscriptSegment, WordSpan};

// Collaborator boundaries (engine → process → merge)
pub use conversion::{MockConverter, VoiceConverter};
pub use diarization::{Diarizer, MockDiarizer};
pub use synthesis::{MockSynthesizer, SpeechSynthesizer, SynthesisRequest};
pub use transcription::{MockRecognizer, SpeechRecognizer};

// Service facade
pub use service::{SpeechRequest, SpeechResponse, SpeechService, TranscriptionRequest, TranscriptionResponse};

// Error handling
pub use error::{Result, VoxpipeError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
