//! Synthesis request validation and the TTS collaborator boundary.

use crate::audio::Waveform;
use crate::defaults;
use crate::error::{Result, VoxpipeError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// A validated text-to-speech request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    /// Voice short-name, e.g. `en-US-GuyNeural`.
    pub voice: String,
    /// Speaking-rate adjustment as a signed percentage.
    pub rate: i32,
}

impl SynthesisRequest {
    /// Build a request, cleaning the text and enforcing bounds.
    ///
    /// Control characters (except newlines and tabs) are stripped before
    /// length checking; a request that fails here never reaches a stage.
    pub fn new(text: &str, voice: &str, rate: i32) -> Result<Self> {
        let cleaned = clean_text(text);
        if cleaned.is_empty() {
            return Err(VoxpipeError::InvalidText {
                message: "text is empty after cleanup".to_string(),
            });
        }
        let code_points = cleaned.chars().count();
        if code_points > defaults::MAX_TEXT_CODE_POINTS {
            return Err(VoxpipeError::InvalidText {
                message: format!(
                    "text is {} code points, maximum is {}",
                    code_points,
                    defaults::MAX_TEXT_CODE_POINTS
                ),
            });
        }
        if rate < defaults::RATE_MIN || rate > defaults::RATE_MAX {
            return Err(VoxpipeError::InvalidParameter {
                field: "rate".to_string(),
                message: format!(
                    "must be between {} and {}, got {}",
                    defaults::RATE_MIN,
                    defaults::RATE_MAX,
                    rate
                ),
            });
        }
        if voice.trim().is_empty() {
            return Err(VoxpipeError::InvalidParameter {
                field: "voice".to_string(),
                message: "voice must not be empty".to_string(),
            });
        }
        Ok(Self {
            text: cleaned,
            voice: voice.to_string(),
            rate,
        })
    }
}

/// Strip control characters from request text.
///
/// Newlines and tabs survive; carriage returns normalize to newlines.
pub fn clean_text(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    normalized
        .chars()
        .filter(|&c| c == '\n' || c == '\t' || !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Metadata for one TTS voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceInfo {
    /// Stable identifier, e.g. `pt-BR-FranciscaNeural`.
    pub short_name: String,
    pub locale: String,
    pub gender: String,
}

impl VoiceInfo {
    /// Language part of the locale (`pt` for `pt-BR`).
    pub fn language(&self) -> &str {
        self.locale.split('-').next().unwrap_or(&self.locale)
    }
}

/// Trait for text-to-speech engines.
///
/// One attempt per request: failure is surfaced verbatim, never converted
/// to an empty waveform, and nothing is written to disk at this stage.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize speech for a validated request.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Waveform>;

    /// Live catalog of available voices.
    async fn voices(&self) -> Result<Vec<VoiceInfo>>;
}

/// Mock synthesizer for testing.
pub struct MockSynthesizer {
    voices: Vec<VoiceInfo>,
    duration_secs: f32,
    should_fail: bool,
    requests: Mutex<Vec<SynthesisRequest>>,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self {
            voices: vec![
                VoiceInfo {
                    short_name: "en-US-GuyNeural".to_string(),
                    locale: "en-US".to_string(),
                    gender: "Male".to_string(),
                },
                VoiceInfo {
                    short_name: "pt-BR-FranciscaNeural".to_string(),
                    locale: "pt-BR".to_string(),
                    gender: "Female".to_string(),
                },
            ],
            duration_secs: 1.0,
            should_fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Configure the duration of synthesized audio.
    pub fn with_duration_secs(mut self, secs: f32) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Configure the mock to fail on synthesize.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Replace the voice catalog.
    pub fn with_voices(mut self, voices: Vec<VoiceInfo>) -> Self {
        self.voices = voices;
        self
    }

    /// Requests seen so far.
    pub fn recorded_requests(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Waveform> {
        if self.should_fail {
            return Err(VoxpipeError::SynthesisFailed {
                message: "mock synthesis failure".to_string(),
            });
        }
        if !self.voices.iter().any(|v| v.short_name == request.voice) {
            return Err(VoxpipeError::VoiceNotFound {
                voice: request.voice.clone(),
            });
        }
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        // A quiet 220Hz tone stands in for speech
        let n = (self.duration_secs * defaults::SAMPLE_RATE as f32) as usize;
        let samples = (0..n)
            .map(|i| {
                let t = i as f32 / defaults::SAMPLE_RATE as f32;
                (t * 220.0 * std::f32::consts::TAU).sin() * 0.3
            })
            .collect();
        Ok(Waveform::new(samples, defaults::SAMPLE_RATE))
    }

    async fn voices(&self) -> Result<Vec<VoiceInfo>> {
        Ok(self.voices.clone())
    }
}
