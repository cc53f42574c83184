//! Voice-conversion collaborator boundary.
//!
//! The numerical internals of pitch extraction and timbre conversion live
//! behind this trait; the conversion stage owns ordering, chunking, and
//! contour transforms.

use crate::conversion::params::{EmbedderModel, PitchMethod};
use crate::conversion::pitch::PitchContour;
use crate::defaults::CONTOUR_HOP_MS;
use crate::error::{Result, VoxpipeError};
use crate::models::ModelHandle;
use std::sync::Mutex;

/// Settings handed to the timbre-conversion call.
///
/// `index_rate` is the effective ratio: the stage zeroes it when no
/// retrieval index is in effect, so implementations never see a positive
/// ratio without an index.
#[derive(Debug, Clone, PartialEq)]
pub struct TimbreSettings {
    pub index_rate: f32,
    pub volume_envelope: f32,
    pub protect: f32,
    pub speaker_id: u32,
    pub embedder: EmbedderModel,
}

/// Trait for voice-conversion engines.
///
/// Implementations must be safe for concurrent read-only use; one handle
/// serves every in-flight request.
pub trait VoiceConverter: Send + Sync {
    /// Extract a pitch contour from audio using the selected method.
    fn extract_pitch(
        &self,
        samples: &[f32],
        sample_rate: u32,
        method: PitchMethod,
    ) -> Result<PitchContour>;

    /// Convert the timbre of `samples` toward the target model, following
    /// the (already transformed) pitch contour.
    fn convert(
        &self,
        samples: &[f32],
        sample_rate: u32,
        contour: &PitchContour,
        model: &ModelHandle,
        settings: &TimbreSettings,
    ) -> Result<Vec<f32>>;
}

/// No-op conversion backend.
///
/// Used when no engine is configured: pitch extraction reports a flat
/// contour and timbre conversion passes audio through unchanged, so the
/// rest of the pipeline (chunking, contour transforms, reassembly,
/// encoding) stays exercisable.
pub struct PassthroughConverter;

impl VoiceConverter for PassthroughConverter {
    fn extract_pitch(
        &self,
        samples: &[f32],
        sample_rate: u32,
        _method: PitchMethod,
    ) -> Result<PitchContour> {
        Ok(PitchContour::new(vec![
            220.0;
            contour_frames(samples.len(), sample_rate)
        ]))
    }

    fn convert(
        &self,
        samples: &[f32],
        _sample_rate: u32,
        _contour: &PitchContour,
        _model: &ModelHandle,
        _settings: &TimbreSettings,
    ) -> Result<Vec<f32>> {
        Ok(samples.to_vec())
    }
}

/// Contour frame count for a buffer at the standard hop.
fn contour_frames(samples_len: usize, sample_rate: u32) -> usize {
    let hop = (sample_rate * CONTOUR_HOP_MS / 1000).max(1) as usize;
    samples_len.div_ceil(hop)
}

/// Mock converter for testing.
///
/// Passes audio through unchanged (making duration properties observable
/// end-to-end) and records the settings of every conversion call.
pub struct MockConverter {
    base_hz: f32,
    should_fail: bool,
    calls: Mutex<Vec<TimbreSettings>>,
}

impl MockConverter {
    pub fn new() -> Self {
        Self {
            base_hz: 220.0,
            should_fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Configure the constant frequency reported by pitch extraction.
    pub fn with_base_hz(mut self, hz: f32) -> Self {
        self.base_hz = hz;
        self
    }

    /// Configure the mock to fail on convert.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Settings seen by every `convert` call so far.
    pub fn recorded_settings(&self) -> Vec<TimbreSettings> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceConverter for MockConverter {
    fn extract_pitch(
        &self,
        samples: &[f32],
        sample_rate: u32,
        _method: PitchMethod,
    ) -> Result<PitchContour> {
        Ok(PitchContour::new(vec![
            self.base_hz;
            contour_frames(samples.len(), sample_rate)
        ]))
    }

    fn convert(
        &self,
        samples: &[f32],
        _sample_rate: u32,
        _contour: &PitchContour,
        _model: &ModelHandle,
        settings: &TimbreSettings,
    ) -> Result<Vec<f32>> {
        if self.should_fail {
            return Err(VoxpipeError::ConversionFailed {
                message: "mock conversion failure".to_string(),
            });
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(settings.clone());
        }
        Ok(samples.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn handle() -> ModelHandle {
        ModelHandle {
            name: "test".to_string(),
            path: PathBuf::from("test.pth"),
            index_path: None,
        }
    }

    fn settings() -> TimbreSettings {
        TimbreSettings {
            index_rate: 0.0,
            volume_envelope: 1.0,
            protect: 0.5,
            speaker_id: 0,
            embedder: EmbedderModel::Contentvec,
        }
    }

    #[test]
    fn mock_extracts_one_frame_per_hop() {
        let converter = MockConverter::new();
        // 16000 samples at 16kHz with a 10ms hop → 100 frames
        let contour = converter
            .extract_pitch(&vec![0.0; 16000], 16000, PitchMethod::Rmvpe)
            .unwrap();
        assert_eq!(contour.hz.len(), 100);
        assert_eq!(contour.hz[0], 220.0);
    }

    #[test]
    fn mock_convert_is_identity() {
        let converter = MockConverter::new();
        let samples = vec![0.1, -0.2, 0.3];
        let contour = PitchContour::new(vec![220.0]);
        let out = converter
            .convert(&samples, 16000, &contour, &handle(), &settings())
            .unwrap();
        assert_eq!(out, samples);
    }

    #[test]
    fn mock_records_settings() {
        let converter = MockConverter::new();
        let contour = PitchContour::new(vec![220.0]);
        let mut s = settings();
        s.index_rate = 0.75;
        converter
            .convert(&[0.0], 16000, &contour, &handle(), &s)
            .unwrap();

        let recorded = converter.recorded_settings();
        assert_eq!(recorded.len(), 1);
        assert!((recorded[0].index_rate - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn mock_failure_is_conversion_failed() {
        let converter = MockConverter::new().with_failure();
        let contour = PitchContour::new(vec![220.0]);
        let err = converter
            .convert(&[0.0], 16000, &contour, &handle(), &settings())
            .unwrap_err();
        assert!(matches!(err, VoxpipeError::ConversionFailed { .. }));
    }

    #[test]
    fn trait_is_object_safe() {
        let converter: Box<dyn VoiceConverter> = Box::new(MockConverter::new());
        let contour = converter
            .extract_pitch(&[0.0; 160], 16000, PitchMethod::Fcpe)
            .unwrap();
        assert_eq!(contour.hz.len(), 1);
    }

    #[test]
    fn passthrough_is_identity() {
        let converter = PassthroughConverter;
        let samples = vec![0.2, -0.4];
        let contour = converter
            .extract_pitch(&samples, 16000, PitchMethod::Rmvpe)
            .unwrap();
        let out = converter
            .convert(&samples, 16000, &contour, &handle(), &settings())
            .unwrap();
        assert_eq!(out, samples);
    }
}
