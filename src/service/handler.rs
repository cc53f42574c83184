//! Composition root for the two request paths.
//!
//! Owns the collaborators behind `Arc`s, validates at the boundary, runs
//! synthesis → conversion and transcription → diarization merge, and
//! converts every error into a `success=false` response carrying the
//! message verbatim. No partial payload is ever returned as if complete.

use crate::audio::{codec, wav};
use crate::config::Config;
use crate::conversion::stage::convert_waveform;
use crate::conversion::converter::VoiceConverter;
use crate::diarization::diarizer::Diarizer;
use crate::diarization::merge::label_segments;
use crate::error::{Result, VoxpipeError};
use crate::models::{ModelCache, ModelHandle, ModelRegistry};
use crate::service::protocol::{
    ModelIndexResponse, ModelsResponse, SpeakerIdsResponse, SpeechRequest, SpeechResponse,
    TranscriptionRequest, TranscriptionResponse, VoicesResponse,
};
use crate::synthesis::engine::{SpeechSynthesizer, SynthesisRequest};
use crate::transcription::recognizer::{SpeechRecognizer, TranscribeOptions};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// The speech service: two independent request paths over shared
/// read-only collaborators.
pub struct SpeechService {
    config: Config,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    converter: Arc<dyn VoiceConverter>,
    recognizer: Arc<dyn SpeechRecognizer>,
    diarizer: Arc<dyn Diarizer>,
    registry: ModelRegistry,
    model_cache: ModelCache<ModelHandle>,
}

impl SpeechService {
    pub fn new(
        config: Config,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        converter: Arc<dyn VoiceConverter>,
        recognizer: Arc<dyn SpeechRecognizer>,
        diarizer: Arc<dyn Diarizer>,
    ) -> Self {
        let registry = ModelRegistry::new(config.models_dir());
        Self {
            config,
            synthesizer,
            converter,
            recognizer,
            diarizer,
            registry,
            model_cache: ModelCache::new(),
        }
    }

    /// TTS path: synthesize, convert, encode, store or inline.
    pub async fn speak(&self, request: &SpeechRequest) -> SpeechResponse {
        match self.speak_inner(request).await {
            Ok(response) => response,
            Err(e) => SpeechResponse::failure(e.to_string()),
        }
    }

    async fn speak_inner(&self, request: &SpeechRequest) -> Result<SpeechResponse> {
        // Boundary validation: nothing below runs on an invalid request.
        let synthesis_request = SynthesisRequest::new(&request.text, &request.voice, request.rate)?;
        request.params.validate()?;

        // Resolve the model and its retrieval index.
        let entry = self.registry.resolve(&request.params.model_ref)?;
        let index_path = self
            .registry
            .resolve_index(&entry.path, request.params.index_ref.as_deref())?;

        let cache_key = ModelHandle::cache_key(&entry.path, index_path.as_deref());
        let handle = self.model_cache.get_or_load(&cache_key, || {
            Ok(ModelHandle {
                name: entry.name.clone(),
                path: entry.path.clone(),
                index_path: index_path.clone(),
            })
        })?;

        // Synthesis: single attempt, failure surfaced verbatim.
        let raw = self.synthesizer.synthesize(&synthesis_request).await?;

        // Conversion is CPU-bound; run it off the async executor. The raw
        // waveform is consumed here — nothing retains it.
        let params = request.params.clone();
        let converter = Arc::clone(&self.converter);
        let converted = tokio::task::spawn_blocking(move || {
            convert_waveform(raw, &params, &handle, converter.as_ref())
        })
        .await
        .map_err(|e| VoxpipeError::ConversionFailed {
            message: format!("conversion task failed: {}", e),
        })??;

        // Encode and store; the reference returned is stable regardless of
        // whether the payload also goes inline.
        let format = request.params.export_format;
        let file_name = output_file_name(request.output_name.as_deref(), format.extension());
        let output_dir = self.config.output_dir();
        std::fs::create_dir_all(&output_dir)?;
        let output_path = output_dir.join(&file_name);

        let duration_seconds = converted.duration_secs();
        codec::encode_waveform(&converted, format, &output_path)?;
        let size_kb = std::fs::metadata(&output_path)
            .map(|m| m.len() as f64 / 1024.0)
            .ok();

        let mut response = SpeechResponse {
            success: true,
            message: "audio generated".to_string(),
            output_file: Some(file_name),
            output_path: Some(output_path.display().to_string()),
            audio_base64: None,
            format: Some(format),
            duration_seconds: Some(duration_seconds),
            size_kb,
        };

        if request.return_inline {
            let bytes = std::fs::read(&output_path)?;
            response.audio_base64 = Some(BASE64.encode(bytes));
            // Inline delivery removes the stored copy
            std::fs::remove_file(&output_path)?;
            response.output_path = None;
            response.output_file = None;
        }

        Ok(response)
    }

    /// Transcription path: recognize, then merge with speaker turns.
    pub async fn transcribe(&self, request: &TranscriptionRequest) -> TranscriptionResponse {
        match self.transcribe_inner(request).await {
            Ok(response) => response,
            Err(e) => TranscriptionResponse::failure(e.to_string()),
        }
    }

    async fn transcribe_inner(
        &self,
        request: &TranscriptionRequest,
    ) -> Result<TranscriptionResponse> {
        let audio = wav::read_wav_file(&request.audio)?;
        if audio.samples.is_empty() {
            return Err(VoxpipeError::EmptyAudio);
        }

        let options = TranscribeOptions {
            language: request
                .language
                .clone()
                .unwrap_or_else(|| crate::defaults::AUTO_LANGUAGE.to_string()),
            model_size: request
                .model_size
                .unwrap_or(self.config.transcription.model_size),
            word_timestamps: request.word_timestamps,
        };

        let recognizer = Arc::clone(&self.recognizer);
        let recognizer_audio = audio.clone();
        let transcript = tokio::task::spawn_blocking(move || {
            recognizer.transcribe(&recognizer_audio, &options)
        })
        .await
        .map_err(|e| VoxpipeError::TranscriptionFailed {
            message: format!("transcription task failed: {}", e),
        })??;

        // Diarization degrades, never fails the request: the capability
        // check runs before invocation, and runtime failures fall back to
        // the no-turns case.
        let mut skip_note = None;
        let turns = if request.enable_diarization {
            if self.diarizer.is_available() {
                match self.diarizer.diarize(&audio).await {
                    Ok(turns) => turns,
                    Err(e) => {
                        skip_note = Some(format!("diarization skipped: {}", e));
                        Vec::new()
                    }
                }
            } else {
                skip_note = Some("diarization skipped: backend unavailable".to_string());
                Vec::new()
            }
        } else {
            Vec::new()
        };

        let merged = label_segments(&transcript.segments, &turns);

        let message = match &skip_note {
            Some(note) => format!("transcription completed; {}", note),
            None => "transcription completed".to_string(),
        };

        Ok(TranscriptionResponse {
            success: true,
            message,
            text: transcript.text(),
            language: transcript.language,
            duration: transcript.duration,
            speakers: merged.speakers,
            segments: merged.segments,
        })
    }

    /// Live voice catalog, optionally filtered by locale prefix.
    pub async fn list_voices(&self, language: Option<&str>) -> VoicesResponse {
        match self.synthesizer.voices().await {
            Ok(mut voices) => {
                if let Some(filter) = language {
                    let needle = filter.to_lowercase();
                    voices.retain(|v| v.locale.to_lowercase().starts_with(&needle));
                }
                VoicesResponse {
                    success: true,
                    message: "voices listed".to_string(),
                    total: voices.len(),
                    voices,
                    language_filter: language.map(|s| s.to_string()),
                }
            }
            Err(e) => VoicesResponse {
                success: false,
                message: e.to_string(),
                voices: Vec::new(),
                total: 0,
                language_filter: language.map(|s| s.to_string()),
            },
        }
    }

    /// Live model catalog.
    pub fn list_models(&self) -> ModelsResponse {
        match self.registry.list() {
            Ok(models) => ModelsResponse {
                success: true,
                message: "models listed".to_string(),
                total: models.len(),
                models: models.into_iter().map(Into::into).collect(),
            },
            Err(e) => ModelsResponse {
                success: false,
                message: e.to_string(),
                models: Vec::new(),
                total: 0,
            },
        }
    }

    /// Co-located retrieval index for a model, if any.
    pub fn model_index(&self, model_ref: &str) -> ModelIndexResponse {
        match self.registry.resolve(model_ref) {
            Ok(entry) => {
                let message = match &entry.index_path {
                    Some(index) => format!("index found: {}", index.display()),
                    None => "no index file found for this model".to_string(),
                };
                ModelIndexResponse {
                    success: true,
                    message,
                    model_path: entry.path,
                    index_path: entry.index_path,
                }
            }
            Err(e) => ModelIndexResponse {
                success: false,
                message: e.to_string(),
                model_path: PathBuf::from(model_ref),
                index_path: None,
            },
        }
    }

    /// Speaker indexes available in a model.
    pub fn model_speakers(&self, model_ref: &str) -> SpeakerIdsResponse {
        match self.registry.resolve(model_ref) {
            Ok(entry) => {
                let speaker_ids = self.registry.speaker_ids(&entry);
                SpeakerIdsResponse {
                    success: true,
                    message: "speakers listed".to_string(),
                    total: speaker_ids.len(),
                    speaker_ids,
                }
            }
            Err(e) => SpeakerIdsResponse {
                success: false,
                message: e.to_string(),
                speaker_ids: Vec::new(),
                total: 0,
            },
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Output file name: explicit name (extension appended when missing) or a
/// timestamped default.
fn output_file_name(explicit: Option<&str>, extension: &str) -> String {
    match explicit {
        Some(name) if name.rsplit('.').next() == Some(extension) => name.to_string(),
        Some(name) => format!("{}.{}", name, extension),
        None => {
            let millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0);
            format!("tts_{}.{}", millis, extension)
        }
    }
}
