//! Voice-conversion parameter set and its closed enumerations.
//!
//! Every enumerated string parameter is a tagged enum validated at the
//! request boundary; unknown values fail deserialization instead of being
//! silently defaulted.

use crate::defaults;
use crate::error::{Result, VoxpipeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Pitch-extraction method for the conversion collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PitchMethod {
    Crepe,
    CrepeTiny,
    #[default]
    Rmvpe,
    Fcpe,
}

impl fmt::Display for PitchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PitchMethod::Crepe => "crepe",
            PitchMethod::CrepeTiny => "crepe-tiny",
            PitchMethod::Rmvpe => "rmvpe",
            PitchMethod::Fcpe => "fcpe",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for PitchMethod {
    type Err = VoxpipeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "crepe" => Ok(PitchMethod::Crepe),
            "crepe-tiny" => Ok(PitchMethod::CrepeTiny),
            "rmvpe" => Ok(PitchMethod::Rmvpe),
            "fcpe" => Ok(PitchMethod::Fcpe),
            other => Err(VoxpipeError::InvalidParameter {
                field: "f0_method".to_string(),
                message: format!("unknown pitch-extraction method: {}", other),
            }),
        }
    }
}

/// Output codec for converted audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Wav,
    Mp3,
    Flac,
    Ogg,
    M4a,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Wav => "wav",
            ExportFormat::Mp3 => "mp3",
            ExportFormat::Flac => "flac",
            ExportFormat::Ogg => "ogg",
            ExportFormat::M4a => "m4a",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = VoxpipeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "wav" => Ok(ExportFormat::Wav),
            "mp3" => Ok(ExportFormat::Mp3),
            "flac" => Ok(ExportFormat::Flac),
            "ogg" => Ok(ExportFormat::Ogg),
            "m4a" => Ok(ExportFormat::M4a),
            other => Err(VoxpipeError::InvalidParameter {
                field: "export_format".to_string(),
                message: format!("unknown export format: {}", other),
            }),
        }
    }
}

/// Feature-embedder model used by the conversion collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EmbedderModel {
    #[default]
    Contentvec,
    Spin,
    SpinV2,
    ChineseHubertBase,
    JapaneseHubertBase,
    KoreanHubertBase,
    Custom,
}

/// Parameters controlling one voice-conversion pass.
///
/// Field defaults mirror the service's public API defaults. `validate()`
/// rejects any ranged field outside its declared bounds; nothing is
/// silently clamped or reinterpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionParameters {
    /// Voice-model reference (path or registry name).
    pub model_ref: String,
    /// Explicit retrieval-index path. When absent, a co-located index is
    /// auto-discovered; when nothing is found, retrieval is disabled.
    pub index_ref: Option<PathBuf>,
    /// Explicit pitch shift in semitones.
    pub pitch: i32,
    /// Retrieval influence ratio; 0.0 ignores the index entirely.
    pub index_rate: f32,
    /// Blend between output and source loudness envelopes.
    pub volume_envelope: f32,
    /// Unvoiced-consonant protection strength.
    pub protect: f32,
    /// Pitch-extraction method.
    pub f0_method: PitchMethod,
    /// Split the waveform into chunks before conversion.
    pub split_audio: bool,
    /// Snap the pitch contour toward musical pitch classes.
    pub f0_autotune: bool,
    /// Autotune interpolation strength; 0.0 = no snap, 1.0 = full snap.
    pub f0_autotune_strength: f32,
    /// Rescale the contour median to `proposed_pitch_threshold` before the
    /// explicit shift.
    pub proposed_pitch: bool,
    /// Target median frequency in Hz for proposed-pitch rescaling.
    pub proposed_pitch_threshold: f32,
    /// Run the denoise/declick pass after conversion.
    pub clean_audio: bool,
    /// Cleanup aggressiveness.
    pub clean_strength: f32,
    /// Output codec.
    pub export_format: ExportFormat,
    /// Feature embedder.
    pub embedder_model: EmbedderModel,
    /// Custom embedder path, required when `embedder_model` is `Custom`.
    pub embedder_model_custom: Option<PathBuf>,
    /// Speaker index inside the target model.
    pub sid: u32,
}

impl Default for ConversionParameters {
    fn default() -> Self {
        Self {
            model_ref: String::new(),
            index_ref: None,
            pitch: 0,
            index_rate: 0.75,
            volume_envelope: 1.0,
            protect: 0.5,
            f0_method: PitchMethod::Rmvpe,
            split_audio: false,
            f0_autotune: false,
            f0_autotune_strength: 1.0,
            proposed_pitch: false,
            proposed_pitch_threshold: 155.0,
            clean_audio: false,
            clean_strength: 0.5,
            export_format: ExportFormat::Wav,
            embedder_model: EmbedderModel::Contentvec,
            embedder_model_custom: None,
            sid: 0,
        }
    }
}

impl ConversionParameters {
    /// Rejects any field outside its declared range.
    pub fn validate(&self) -> Result<()> {
        if self.model_ref.trim().is_empty() {
            return Err(VoxpipeError::InvalidParameter {
                field: "model_ref".to_string(),
                message: "model reference must not be empty".to_string(),
            });
        }
        check_range_i32("pitch", self.pitch, defaults::PITCH_MIN, defaults::PITCH_MAX)?;
        check_range_f32("index_rate", self.index_rate, 0.0, 1.0)?;
        check_range_f32("volume_envelope", self.volume_envelope, 0.0, 1.0)?;
        check_range_f32("protect", self.protect, 0.0, defaults::PROTECT_MAX)?;
        check_range_f32("f0_autotune_strength", self.f0_autotune_strength, 0.0, 1.0)?;
        check_range_f32(
            "proposed_pitch_threshold",
            self.proposed_pitch_threshold,
            defaults::PROPOSED_PITCH_HZ_MIN,
            defaults::PROPOSED_PITCH_HZ_MAX,
        )?;
        check_range_f32("clean_strength", self.clean_strength, 0.0, 1.0)?;
        if self.embedder_model == EmbedderModel::Custom && self.embedder_model_custom.is_none() {
            return Err(VoxpipeError::InvalidParameter {
                field: "embedder_model_custom".to_string(),
                message: "required when embedder_model is custom".to_string(),
            });
        }
        Ok(())
    }
}

fn check_range_i32(field: &str, value: i32, min: i32, max: i32) -> Result<()> {
    if value < min || value > max {
        return Err(VoxpipeError::InvalidParameter {
            field: field.to_string(),
            message: format!("must be between {} and {}, got {}", min, max, value),
        });
    }
    Ok(())
}

fn check_range_f32(field: &str, value: f32, min: f32, max: f32) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(VoxpipeError::InvalidParameter {
            field: field.to_string(),
            message: format!("must be between {} and {}, got {}", min, max, value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_params() -> ConversionParameters {
        ConversionParameters {
            model_ref: "voices/test/test.pth".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_match_api_defaults() {
        let p = ConversionParameters::default();
        assert_eq!(p.pitch, 0);
        assert!((p.index_rate - 0.75).abs() < f32::EPSILON);
        assert!((p.volume_envelope - 1.0).abs() < f32::EPSILON);
        assert!((p.protect - 0.5).abs() < f32::EPSILON);
        assert_eq!(p.f0_method, PitchMethod::Rmvpe);
        assert!(!p.split_audio);
        assert!((p.proposed_pitch_threshold - 155.0).abs() < f32::EPSILON);
        assert_eq!(p.export_format, ExportFormat::Wav);
        assert_eq!(p.embedder_model, EmbedderModel::Contentvec);
        assert_eq!(p.sid, 0);
    }

    #[test]
    fn valid_defaults_pass_validation() {
        assert!(valid_params().validate().is_ok());
    }

    #[test]
    fn empty_model_ref_is_rejected() {
        let p = ConversionParameters::default();
        let err = p.validate().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn pitch_out_of_range_is_rejected() {
        let mut p = valid_params();
        p.pitch = 25;
        let err = p.validate().unwrap_err();
        match err {
            VoxpipeError::InvalidParameter { field, .. } => assert_eq!(field, "pitch"),
            other => panic!("Expected InvalidParameter, got {:?}", other),
        }

        p.pitch = -25;
        assert!(p.validate().is_err());

        p.pitch = -24;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn index_rate_bounds() {
        let mut p = valid_params();
        p.index_rate = 1.01;
        assert!(p.validate().is_err());
        p.index_rate = -0.01;
        assert!(p.validate().is_err());
        p.index_rate = 0.0;
        assert!(p.validate().is_ok());
        p.index_rate = 1.0;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn protect_upper_bound_is_half() {
        let mut p = valid_params();
        p.protect = 0.5;
        assert!(p.validate().is_ok());
        p.protect = 0.51;
        assert!(p.validate().is_err());
    }

    #[test]
    fn proposed_pitch_threshold_bounds() {
        let mut p = valid_params();
        p.proposed_pitch_threshold = 49.9;
        assert!(p.validate().is_err());
        p.proposed_pitch_threshold = 1200.1;
        assert!(p.validate().is_err());
        p.proposed_pitch_threshold = 155.0;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn nan_ratio_is_rejected() {
        let mut p = valid_params();
        p.index_rate = f32::NAN;
        assert!(p.validate().is_err());
    }

    #[test]
    fn custom_embedder_requires_path() {
        let mut p = valid_params();
        p.embedder_model = EmbedderModel::Custom;
        assert!(p.validate().is_err());

        p.embedder_model_custom = Some(PathBuf::from("embedders/custom.pt"));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn pitch_method_parses_known_values() {
        assert_eq!("rmvpe".parse::<PitchMethod>().unwrap(), PitchMethod::Rmvpe);
        assert_eq!(
            "crepe-tiny".parse::<PitchMethod>().unwrap(),
            PitchMethod::CrepeTiny
        );
        assert!("harvest".parse::<PitchMethod>().is_err());
    }

    #[test]
    fn export_format_parses_case_insensitively() {
        assert_eq!("OGG".parse::<ExportFormat>().unwrap(), ExportFormat::Ogg);
        assert_eq!("wav".parse::<ExportFormat>().unwrap(), ExportFormat::Wav);
        assert!("aiff".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn unknown_enum_value_fails_deserialization() {
        let json = r#"{"model_ref": "m.pth", "f0_method": "harvest"}"#;
        let result: std::result::Result<ConversionParameters, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn serde_roundtrip_preserves_fields() {
        let mut p = valid_params();
        p.pitch = -3;
        p.split_audio = true;
        p.export_format = ExportFormat::Ogg;
        p.embedder_model = EmbedderModel::SpinV2;

        let json = serde_json::to_string(&p).unwrap();
        let back: ConversionParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn enum_serialization_uses_lowercase_names() {
        let json = serde_json::to_string(&ExportFormat::M4a).unwrap();
        assert_eq!(json, r#""m4a""#);
        let json = serde_json::to_string(&PitchMethod::CrepeTiny).unwrap();
        assert_eq!(json, r#""crepe-tiny""#);
        let json = serde_json::to_string(&EmbedderModel::ChineseHubertBase).unwrap();
        assert_eq!(json, r#""chinese-hubert-base""#);
    }
}
