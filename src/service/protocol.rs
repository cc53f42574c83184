//! JSON request/response types for the service boundary.
//!
//! Transport is owned by the routing layer; these types define the shape.
//! Every response carries an explicit success flag and message — callers
//! never infer success from payload presence.

use crate::conversion::params::{ConversionParameters, ExportFormat};
use crate::diarization::merge::LabeledSegment;
use crate::models::ModelEntry;
use crate::synthesis::engine::VoiceInfo;
use crate::transcription::recognizer::ModelSize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Synthesis-plus-conversion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    /// TTS voice short-name.
    pub voice: String,
    /// Speaking-rate adjustment as a signed percentage.
    #[serde(default)]
    pub rate: i32,
    /// Conversion parameters, flattened into the request body.
    #[serde(flatten)]
    pub params: ConversionParameters,
    /// Return the audio inline as base64 instead of a stored file.
    #[serde(default)]
    pub return_inline: bool,
    /// Output file name; generated when absent.
    #[serde(default)]
    pub output_name: Option<String>,
}

/// Synthesis-plus-conversion response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ExportFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_kb: Option<f64>,
}

impl SpeechResponse {
    /// Failure response carrying the error message verbatim.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            output_file: None,
            output_path: None,
            audio_base64: None,
            format: None,
            duration_seconds: None,
            size_kb: None,
        }
    }
}

/// Transcription request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionRequest {
    /// Path to the uploaded audio (the routing layer owns the upload).
    pub audio: PathBuf,
    /// Language hint; auto-detect when absent.
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub enable_diarization: bool,
    #[serde(default)]
    pub word_timestamps: bool,
    /// Recognizer model size; the service default applies when absent.
    #[serde(default)]
    pub model_size: Option<ModelSize>,
}

/// Transcription response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub success: bool,
    pub message: String,
    pub text: String,
    pub language: String,
    /// Total audio duration in seconds.
    pub duration: f64,
    /// Distinct speaker labels in order of first appearance.
    pub speakers: Vec<String>,
    pub segments: Vec<LabeledSegment>,
}

impl TranscriptionResponse {
    /// Failure response carrying the error message verbatim.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            text: String::new(),
            language: String::new(),
            duration: 0.0,
            speakers: Vec::new(),
            segments: Vec::new(),
        }
    }
}

/// Voice-catalog response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoicesResponse {
    pub success: bool,
    pub message: String,
    pub voices: Vec<VoiceInfo>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_filter: Option<String>,
}

/// One discovered voice-conversion model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub name: String,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_path: Option<PathBuf>,
}

impl From<ModelEntry> for ModelSummary {
    fn from(entry: ModelEntry) -> Self {
        Self {
            name: entry.name,
            path: entry.path,
            index_path: entry.index_path,
        }
    }
}

/// Model-catalog response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub success: bool,
    pub message: String,
    pub models: Vec<ModelSummary>,
    pub total: usize,
}

/// Retrieval-index lookup response for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelIndexResponse {
    pub success: bool,
    pub message: String,
    pub model_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_path: Option<PathBuf>,
}

/// Speaker-id listing response for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerIdsResponse {
    pub success: bool,
    pub message: String,
    pub speaker_ids: Vec<u32>,
    pub total: usize,
}
