//! Error types for voxpipe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoxpipeError {
    // Request validation errors — caught at the boundary, never reach a stage
    #[error("Invalid text: {message}")]
    InvalidText { message: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidParameter { field: String, message: String },

    // Resource resolution errors
    #[error("TTS voice not found: {voice}")]
    VoiceNotFound { voice: String },

    #[error("Voice model not found: {path}")]
    ModelNotFound { path: String },

    #[error("Retrieval index not found: {path}")]
    IndexNotFound { path: String },

    // Collaborator failures
    #[error("Speech synthesis failed: {message}")]
    SynthesisFailed { message: String },

    #[error("Voice conversion failed: {message}")]
    ConversionFailed { message: String },

    #[error("Unsupported audio format: {message}")]
    UnsupportedFormat { message: String },

    #[error("Audio is empty or silent")]
    EmptyAudio,

    #[error("Transcription failed: {message}")]
    TranscriptionFailed { message: String },

    // Caught inside the diarization merge stage and degraded, never
    // propagated as a request failure.
    #[error("Diarization failed: {message}")]
    DiarizationFailed { message: String },

    // Encoding errors
    #[error("Audio encoding failed: {message}")]
    EncodingFailed { message: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VoxpipeError {
    /// True for errors that belong to the request-validation class.
    ///
    /// These are rejected before any stage runs; a stage receiving one of
    /// them indicates a bug in the boundary layer.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            VoxpipeError::InvalidText { .. } | VoxpipeError::InvalidParameter { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VoxpipeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn invalid_parameter_display() {
        let error = VoxpipeError::InvalidParameter {
            field: "index_rate".to_string(),
            message: "must be between 0.0 and 1.0".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid value for index_rate: must be between 0.0 and 1.0"
        );
    }

    #[test]
    fn voice_not_found_display() {
        let error = VoxpipeError::VoiceNotFound {
            voice: "en-US-GuyNeural".to_string(),
        };
        assert_eq!(error.to_string(), "TTS voice not found: en-US-GuyNeural");
    }

    #[test]
    fn model_not_found_display() {
        let error = VoxpipeError::ModelNotFound {
            path: "voices/lula/lula.pth".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Voice model not found: voices/lula/lula.pth"
        );
    }

    #[test]
    fn index_not_found_display() {
        let error = VoxpipeError::IndexNotFound {
            path: "voices/lula/missing.index".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Retrieval index not found: voices/lula/missing.index"
        );
    }

    #[test]
    fn synthesis_failed_display() {
        let error = VoxpipeError::SynthesisFailed {
            message: "engine exited with status 1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Speech synthesis failed: engine exited with status 1"
        );
    }

    #[test]
    fn empty_audio_display() {
        assert_eq!(
            VoxpipeError::EmptyAudio.to_string(),
            "Audio is empty or silent"
        );
    }

    #[test]
    fn validation_class_covers_text_and_parameters() {
        assert!(
            VoxpipeError::InvalidText {
                message: "empty".to_string()
            }
            .is_validation()
        );
        assert!(
            VoxpipeError::InvalidParameter {
                field: "pitch".to_string(),
                message: "out of range".to_string()
            }
            .is_validation()
        );
        assert!(
            !VoxpipeError::ModelNotFound {
                path: "x".to_string()
            }
            .is_validation()
        );
        assert!(!VoxpipeError::EmptyAudio.is_validation());
    }

    #[test]
    fn from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: VoxpipeError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn error_source_chain_io() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: VoxpipeError = io_error.into();
        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<VoxpipeError>();
        assert_sync::<VoxpipeError>();
    }
}
