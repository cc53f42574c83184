//! Edge TTS engine driven through the `edge-tts` command-line tool.
//!
//! The engine renders to a temporary file that is decoded and deleted
//! before returning; the stage contract of "no disk writes" holds for
//! everything the caller can observe.

use crate::audio::Waveform;
use crate::audio::wav::read_wav_file;
use crate::error::{Result, VoxpipeError};
use crate::synthesis::engine::{SpeechSynthesizer, SynthesisRequest, VoiceInfo};
use async_trait::async_trait;
use tokio::process::Command;

/// TTS engine backed by the `edge-tts` CLI.
pub struct EdgeSynthesizer {
    /// Binary to invoke, normally `edge-tts`.
    binary: String,
}

impl EdgeSynthesizer {
    pub fn new() -> Self {
        Self {
            binary: "edge-tts".to_string(),
        }
    }

    /// Override the engine binary (for wrappers or pinned installs).
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    fn rate_argument(rate: i32) -> String {
        if rate >= 0 {
            format!("+{}%", rate)
        } else {
            format!("{}%", rate)
        }
    }
}

impl Default for EdgeSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for EdgeSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Waveform> {
        // The engine always renders mp3; a second hop through ffmpeg yields
        // the WAV we can decode.
        let media = tempfile::Builder::new()
            .prefix("voxpipe_tts_")
            .suffix(".mp3")
            .tempfile()
            .map_err(|e| VoxpipeError::SynthesisFailed {
                message: format!("Failed to create staging file: {}", e),
            })?;
        let decoded = tempfile::Builder::new()
            .prefix("voxpipe_tts_")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| VoxpipeError::SynthesisFailed {
                message: format!("Failed to create staging file: {}", e),
            })?;

        let output = Command::new(&self.binary)
            .arg("--voice")
            .arg(&request.voice)
            .arg("--rate")
            .arg(Self::rate_argument(request.rate))
            .arg("--text")
            .arg(&request.text)
            .arg("--write-media")
            .arg(media.path())
            .output()
            .await
            .map_err(|e| VoxpipeError::SynthesisFailed {
                message: format!("Failed to spawn {}: {}", self.binary, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // The engine reports unknown voices on stderr; map them to the
            // resource error instead of a generic engine failure.
            if stderr.contains("voice") && stderr.contains("not") {
                return Err(VoxpipeError::VoiceNotFound {
                    voice: request.voice.clone(),
                });
            }
            return Err(VoxpipeError::SynthesisFailed {
                message: format!(
                    "{} exited with {}: {}",
                    self.binary,
                    output.status,
                    stderr.trim()
                ),
            });
        }

        let ffmpeg = Command::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(media.path())
            .arg("-ac")
            .arg("1")
            .arg(decoded.path())
            .output()
            .await
            .map_err(|e| VoxpipeError::SynthesisFailed {
                message: format!("Failed to spawn ffmpeg: {}", e),
            })?;
        if !ffmpeg.status.success() {
            let stderr = String::from_utf8_lossy(&ffmpeg.stderr);
            return Err(VoxpipeError::SynthesisFailed {
                message: format!(
                    "ffmpeg exited with {}: {}",
                    ffmpeg.status,
                    stderr.lines().last().unwrap_or("")
                ),
            });
        }

        let wave = read_wav_file(decoded.path())?;
        if wave.samples.is_empty() {
            return Err(VoxpipeError::SynthesisFailed {
                message: "engine produced no audio".to_string(),
            });
        }
        Ok(wave.to_processing_rate())
    }

    async fn voices(&self) -> Result<Vec<VoiceInfo>> {
        let output = Command::new(&self.binary)
            .arg("--list-voices")
            .output()
            .await
            .map_err(|e| VoxpipeError::SynthesisFailed {
                message: format!("Failed to spawn {}: {}", self.binary, e),
            })?;

        if !output.status.success() {
            return Err(VoxpipeError::SynthesisFailed {
                message: format!("{} --list-voices exited with {}", self.binary, output.status),
            });
        }

        Ok(parse_voice_listing(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parse the tabular `edge-tts --list-voices` output.
///
/// The listing is `Name  Gender  ...` rows after a header; names look like
/// `en-US-GuyNeural`, so the locale is recoverable from the name itself.
fn parse_voice_listing(listing: &str) -> Vec<VoiceInfo> {
    listing
        .lines()
        .skip_while(|line| !line.starts_with("Name"))
        .skip(2) // header + separator
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let short_name = fields.next()?.to_string();
            let gender = fields.next().unwrap_or("").to_string();
            let locale = short_name
                .rsplit_once('-')
                .map(|(prefix, _)| prefix.to_string())
                .unwrap_or_default();
            if locale.is_empty() {
                return None;
            }
            Some(VoiceInfo {
                short_name,
                locale,
                gender,
            })
        })
        .collect()
}
