//! Diarization collaborator boundary.

use crate::audio::Waveform;
use crate::error::{Result, VoxpipeError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A speaker-attributed interval of the audio timeline.
///
/// Labels are opaque and stable within one request only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerTurn {
    pub start: f64,
    pub end: f64,
    pub speaker: String,
}

impl SpeakerTurn {
    pub fn new(start: f64, end: f64, speaker: impl Into<String>) -> Self {
        Self {
            start,
            end,
            speaker: speaker.into(),
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Trait for speaker-diarization engines.
///
/// `is_available` is a capability check consulted before invocation —
/// an unavailable diarizer degrades the request instead of failing it.
/// Runtime failures from `diarize` degrade the same way.
#[async_trait]
pub trait Diarizer: Send + Sync {
    /// Whether the backend can run at all (credentials, model presence).
    fn is_available(&self) -> bool;

    /// Partition the audio timeline into speaker turns, ordered by start.
    async fn diarize(&self, audio: &Waveform) -> Result<Vec<SpeakerTurn>>;
}

/// Stand-in diarizer for deployments without a configured backend.
///
/// Always reports unavailable, so every diarization-enabled request
/// degrades to the single-speaker result instead of failing.
pub struct UnconfiguredDiarizer;

#[async_trait]
impl Diarizer for UnconfiguredDiarizer {
    fn is_available(&self) -> bool {
        false
    }

    async fn diarize(&self, _audio: &Waveform) -> Result<Vec<SpeakerTurn>> {
        Err(VoxpipeError::DiarizationFailed {
            message: "no diarization backend configured".to_string(),
        })
    }
}

/// Mock diarizer for testing.
pub struct MockDiarizer {
    turns: Vec<SpeakerTurn>,
    available: bool,
    should_fail: bool,
}

impl MockDiarizer {
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            available: true,
            should_fail: false,
        }
    }

    /// Configure the turns returned by diarize.
    pub fn with_turns(mut self, turns: Vec<SpeakerTurn>) -> Self {
        self.turns = turns;
        self
    }

    /// Mark the backend unavailable (e.g. missing credential).
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Configure the mock to fail on diarize.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Default for MockDiarizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Diarizer for MockDiarizer {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn diarize(&self, _audio: &Waveform) -> Result<Vec<SpeakerTurn>> {
        if self.should_fail {
            return Err(VoxpipeError::DiarizationFailed {
                message: "mock diarization failure".to_string(),
            });
        }
        Ok(self.turns.clone())
    }
}
