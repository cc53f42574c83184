//! Output-codec encoding for converted audio.
//!
//! WAV is written natively; every other export format is produced by an
//! `ffmpeg` child process from a temporary WAV handoff file.

use crate::audio::Waveform;
use crate::audio::wav::write_wav_file;
use crate::conversion::params::ExportFormat;
use crate::error::{Result, VoxpipeError};
use std::path::Path;
use std::process::Command;

/// Encode a waveform to `path` in the requested format.
///
/// The target file's extension is not consulted; `format` alone decides
/// the codec.
pub fn encode_waveform(waveform: &Waveform, format: ExportFormat, path: &Path) -> Result<()> {
    match format {
        ExportFormat::Wav => write_wav_file(waveform, path),
        _ => encode_via_ffmpeg(waveform, format, path),
    }
}

fn encode_via_ffmpeg(waveform: &Waveform, format: ExportFormat, path: &Path) -> Result<()> {
    let staging = tempfile::Builder::new()
        .prefix("voxpipe_encode_")
        .suffix(".wav")
        .tempfile()
        .map_err(|e| VoxpipeError::EncodingFailed {
            message: format!("Failed to create staging file: {}", e),
        })?;

    write_wav_file(waveform, staging.path())?;

    let output = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(staging.path())
        .args(codec_args(format))
        .arg(path)
        .output()
        .map_err(|e| VoxpipeError::EncodingFailed {
            message: format!("Failed to spawn ffmpeg: {}", e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VoxpipeError::EncodingFailed {
            message: format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.lines().last().unwrap_or("")
            ),
        });
    }

    Ok(())
}

/// Codec flags per export format.
fn codec_args(format: ExportFormat) -> &'static [&'static str] {
    match format {
        ExportFormat::Wav => &[],
        ExportFormat::Mp3 => &["-codec:a", "libmp3lame", "-qscale:a", "2"],
        ExportFormat::Flac => &["-codec:a", "flac"],
        ExportFormat::Ogg => &["-codec:a", "libvorbis", "-qscale:a", "5"],
        ExportFormat::M4a => &["-codec:a", "aac", "-b:a", "192k"],
    }
}
