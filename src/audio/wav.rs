//! WAV decode/encode for uploaded and generated audio.

use crate::audio::waveform::{Waveform, downmix};
use crate::error::{Result, VoxpipeError};
use std::io::Read;
use std::path::Path;

/// Decode WAV data from any reader into a mono waveform.
///
/// Supports 16-bit/24-bit/32-bit integer and 32-bit float sample formats
/// at arbitrary rates and channel counts; multi-channel input is downmixed.
pub fn read_wav(reader: Box<dyn Read + Send>) -> Result<Waveform> {
    let mut wav_reader =
        hound::WavReader::new(reader).map_err(|e| VoxpipeError::UnsupportedFormat {
            message: format!("Failed to parse WAV data: {}", e),
        })?;

    let spec = wav_reader.spec();

    let raw: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => wav_reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| VoxpipeError::UnsupportedFormat {
                message: format!("Failed to read WAV samples: {}", e),
            })?,
        hound::SampleFormat::Int => {
            let scale = match spec.bits_per_sample {
                16 => 1.0 / 32768.0,
                24 => 1.0 / 8_388_608.0,
                32 => 1.0 / 2_147_483_648.0,
                bits => {
                    return Err(VoxpipeError::UnsupportedFormat {
                        message: format!("Unsupported WAV bit depth: {}", bits),
                    });
                }
            };
            wav_reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| VoxpipeError::UnsupportedFormat {
                    message: format!("Failed to read WAV samples: {}", e),
                })?
        }
    };

    let mono = downmix(&raw, spec.channels);

    Ok(Waveform {
        samples: mono,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Decode a WAV file from disk.
pub fn read_wav_file(path: &Path) -> Result<Waveform> {
    let file = std::fs::File::open(path)?;
    read_wav(Box::new(file))
}

/// Encode a waveform to a 16-bit PCM WAV file.
pub fn write_wav_file(waveform: &Waveform, path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer =
        hound::WavWriter::create(path, spec).map_err(|e| VoxpipeError::EncodingFailed {
            message: format!("Failed to create WAV file: {}", e),
        })?;

    for &sample in &waveform.samples {
        let clamped = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        writer
            .write_sample(clamped)
            .map_err(|e| VoxpipeError::EncodingFailed {
                message: format!("Failed to write WAV sample: {}", e),
            })?;
    }

    writer.finalize().map_err(|e| VoxpipeError::EncodingFailed {
        message: format!("Failed to finalize WAV file: {}", e),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn wav_bytes(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn read_mono_16bit_wav() {
        let data = wav_bytes(&[0, 16384, -16384, 32767], 16000, 1);
        let wave = read_wav(Box::new(Cursor::new(data))).unwrap();

        assert_eq!(wave.sample_rate, 16000);
        assert_eq!(wave.channels, 1);
        assert_eq!(wave.samples.len(), 4);
        assert!((wave.samples[1] - 0.5).abs() < 0.001);
        assert!((wave.samples[2] + 0.5).abs() < 0.001);
    }

    #[test]
    fn read_stereo_wav_downmixes() {
        // L=16384, R=0 for each frame → mono 0.25
        let data = wav_bytes(&[16384, 0, 16384, 0], 44100, 2);
        let wave = read_wav(Box::new(Cursor::new(data))).unwrap();

        assert_eq!(wave.sample_rate, 44100);
        assert_eq!(wave.channels, 2);
        assert_eq!(wave.samples.len(), 2);
        assert!((wave.samples[0] - 0.25).abs() < 0.001);
    }

    #[test]
    fn read_garbage_is_unsupported_format() {
        let result = read_wav(Box::new(Cursor::new(b"not a wav file".to_vec())));
        assert!(matches!(
            result,
            Err(VoxpipeError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn write_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        let wave = Waveform::new(vec![0.0, 0.5, -0.5, 0.25], 16000);
        write_wav_file(&wave, &path).unwrap();

        let back = read_wav_file(&path).unwrap();
        assert_eq!(back.sample_rate, 16000);
        assert_eq!(back.samples.len(), 4);
        assert!((back.samples[1] - 0.5).abs() < 0.001);
    }

    #[test]
    fn write_clamps_out_of_range_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipped.wav");

        let wave = Waveform::new(vec![2.0, -2.0], 16000);
        write_wav_file(&wave, &path).unwrap();

        let back = read_wav_file(&path).unwrap();
        assert!(back.samples[0] <= 1.0);
        assert!(back.samples[1] >= -1.0);
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let result = read_wav_file(Path::new("/nonexistent/audio.wav"));
        assert!(matches!(result, Err(VoxpipeError::Io(_))));
    }
}
