use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::transcription::recognizer::ModelSize;

/// Root service configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub transcription: TranscriptionConfig,
    pub diarization: DiarizationConfig,
}

/// Filesystem layout for generated audio and voice models
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory where synthesized/converted audio is written.
    pub output_dir: Option<PathBuf>,
    /// Directory scanned for voice-conversion models and indexes.
    pub models_dir: Option<PathBuf>,
}

/// Speech-recognition configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Recognizer model size used when a request does not specify one.
    pub model_size: ModelSize,
    /// Load the recognizer at startup instead of on first use.
    pub preload: bool,
}

/// Diarization collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiarizationConfig {
    /// Auth token for the diarization backend. Without it diarization is
    /// unavailable and transcription degrades to a single speaker.
    pub auth_token: Option<String>,
    /// Load the diarization model at startup (only if a token is set).
    pub preload: bool,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            models_dir: None,
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model_size: ModelSize::Base,
            preload: true,
        }
    }
}

impl Default for DiarizationConfig {
    fn default() -> Self {
        Self {
            auth_token: None,
            preload: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing; invalid TOML is an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - VOXPIPE_OUTPUT_DIR → paths.output_dir
    /// - VOXPIPE_MODELS_DIR → paths.models_dir
    /// - VOXPIPE_MODEL_SIZE → transcription.model_size
    /// - VOXPIPE_DIARIZATION_TOKEN → diarization.auth_token
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("VOXPIPE_OUTPUT_DIR")
            && !dir.is_empty()
        {
            self.paths.output_dir = Some(PathBuf::from(dir));
        }

        if let Ok(dir) = std::env::var("VOXPIPE_MODELS_DIR")
            && !dir.is_empty()
        {
            self.paths.models_dir = Some(PathBuf::from(dir));
        }

        if let Ok(size) = std::env::var("VOXPIPE_MODEL_SIZE")
            && let Ok(parsed) = size.parse::<ModelSize>()
        {
            self.transcription.model_size = parsed;
        }

        if let Ok(token) = std::env::var("VOXPIPE_DIARIZATION_TOKEN")
            && !token.is_empty()
        {
            self.diarization.auth_token = Some(token);
        }

        self
    }

    /// True when a diarization token is configured and non-blank.
    pub fn has_diarization_token(&self) -> bool {
        self.diarization
            .auth_token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    /// True when diarization should be loaded at startup.
    pub fn should_preload_diarization(&self) -> bool {
        self.diarization.preload && self.has_diarization_token()
    }

    /// Resolved output directory (config value or platform data dir).
    pub fn output_dir(&self) -> PathBuf {
        self.paths.output_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("voxpipe")
                .join("audios")
        })
    }

    /// Resolved models directory (config value or platform data dir).
    pub fn models_dir(&self) -> PathBuf {
        self.paths.models_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("voxpipe")
                .join("models")
        })
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/voxpipe/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voxpipe")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_has_no_token() {
        let config = Config::default();
        assert!(!config.has_diarization_token());
        assert!(!config.should_preload_diarization());
        assert_eq!(config.transcription.model_size, ModelSize::Base);
        assert!(config.transcription.preload);
    }

    #[test]
    fn blank_token_does_not_count() {
        let config = Config {
            diarization: DiarizationConfig {
                auth_token: Some("   ".to_string()),
                preload: true,
            },
            ..Default::default()
        };
        assert!(!config.has_diarization_token());
    }

    #[test]
    fn token_enables_preload() {
        let config = Config {
            diarization: DiarizationConfig {
                auth_token: Some("hf_token".to_string()),
                preload: true,
            },
            ..Default::default()
        };
        assert!(config.has_diarization_token());
        assert!(config.should_preload_diarization());
    }

    #[test]
    fn preload_disabled_wins_over_token() {
        let config = Config {
            diarization: DiarizationConfig {
                auth_token: Some("hf_token".to_string()),
                preload: false,
            },
            ..Default::default()
        };
        assert!(!config.should_preload_diarization());
    }

    #[test]
    fn load_parses_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[transcription]\nmodel_size = \"turbo\"\n\n[paths]\noutput_dir = \"/tmp/out\""
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.transcription.model_size, ModelSize::Turbo);
        assert_eq!(config.paths.output_dir, Some(PathBuf::from("/tmp/out")));
        // Unset sections fall back to defaults
        assert!(config.diarization.auth_token.is_none());
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not [ valid toml").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn load_or_default_returns_defaults_for_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/voxpipe.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn output_dir_prefers_configured_value() {
        let config = Config {
            paths: PathsConfig {
                output_dir: Some(PathBuf::from("/srv/audio")),
                models_dir: None,
            },
            ..Default::default()
        };
        assert_eq!(config.output_dir(), PathBuf::from("/srv/audio"));
    }
}
