//! Speech-recognition collaborator boundary.

use crate::audio::Waveform;
use crate::defaults;
use crate::error::{Result, VoxpipeError};
use crate::transcription::segment::{Transcript, TranscriptSegment};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recognizer model size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ModelSize {
    Tiny,
    #[default]
    Base,
    Small,
    Medium,
    Large,
    LargeV3,
    Turbo,
}

impl ModelSize {
    /// Conventional model file name for this size.
    pub fn file_name(&self) -> String {
        format!("ggml-{}.bin", self)
    }
}

impl fmt::Display for ModelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
            ModelSize::LargeV3 => "large-v3",
            ModelSize::Turbo => "turbo",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ModelSize {
    type Err = VoxpipeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tiny" => Ok(ModelSize::Tiny),
            "base" => Ok(ModelSize::Base),
            "small" => Ok(ModelSize::Small),
            "medium" => Ok(ModelSize::Medium),
            "large" => Ok(ModelSize::Large),
            "large-v3" => Ok(ModelSize::LargeV3),
            "turbo" => Ok(ModelSize::Turbo),
            other => Err(VoxpipeError::InvalidParameter {
                field: "model_size".to_string(),
                message: format!("unknown model size: {}", other),
            }),
        }
    }
}

/// Options for one transcription call.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscribeOptions {
    /// Language hint, or the auto-detect sentinel.
    pub language: String,
    pub model_size: ModelSize,
    /// Populate word-level sub-segments.
    pub word_timestamps: bool,
}

impl Default for TranscribeOptions {
    fn default() -> Self {
        Self {
            language: defaults::AUTO_LANGUAGE.to_string(),
            model_size: ModelSize::default(),
            word_timestamps: false,
        }
    }
}

/// Trait for speech-to-text engines.
///
/// Implementations are synchronous; the service facade moves calls onto a
/// blocking thread.
pub trait SpeechRecognizer: Send + Sync {
    /// Transcribe a waveform into ordered, non-overlapping segments.
    fn transcribe(&self, audio: &Waveform, options: &TranscribeOptions) -> Result<Transcript>;

    /// Name of the loaded model.
    fn model_name(&self) -> &str;
}

/// Mock recognizer for testing.
pub struct MockRecognizer {
    segments: Vec<TranscriptSegment>,
    language: String,
    should_fail: bool,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self {
            segments: vec![TranscriptSegment::new(0.0, 1.0, "mock transcription")],
            language: "en".to_string(),
            should_fail: false,
        }
    }

    /// Configure the segments returned by transcribe.
    pub fn with_segments(mut self, segments: Vec<TranscriptSegment>) -> Self {
        self.segments = segments;
        self
    }

    /// Configure the detected language.
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    /// Configure the mock to fail on transcribe.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Default for MockRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechRecognizer for MockRecognizer {
    fn transcribe(&self, audio: &Waveform, options: &TranscribeOptions) -> Result<Transcript> {
        if self.should_fail {
            return Err(VoxpipeError::TranscriptionFailed {
                message: "mock transcription failure".to_string(),
            });
        }
        if audio.is_silent(defaults::SILENCE_THRESHOLD / 10.0) {
            return Err(VoxpipeError::EmptyAudio);
        }

        let segments = self
            .segments
            .iter()
            .cloned()
            .map(|seg| {
                if options.word_timestamps && seg.words.is_empty() {
                    seg.with_proportional_words()
                } else {
                    seg
                }
            })
            .collect::<Vec<_>>();

        let duration = segments.last().map(|s| s.end).unwrap_or(0.0);
        let language = if options.language == defaults::AUTO_LANGUAGE {
            self.language.clone()
        } else {
            options.language.clone()
        };

        Ok(Transcript {
            segments,
            language,
            duration,
        })
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
