//! Owned audio buffer shared between the pipeline stages.

use crate::defaults::SAMPLE_RATE;

/// An owned, immutable-once-produced audio buffer.
///
/// Samples are mono f32 in [-1.0, 1.0]. Multi-channel input is downmixed
/// on decode; `channels` records the original channel count for callers
/// that care about provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Waveform {
    /// Creates a mono waveform at the given sample rate.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
        }
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Root-mean-square level over the whole buffer.
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.samples.iter().map(|s| s * s).sum();
        (sum / self.samples.len() as f32).sqrt()
    }

    /// True when the buffer holds no samples or nothing above the threshold.
    pub fn is_silent(&self, threshold: f32) -> bool {
        self.samples.is_empty() || self.rms() < threshold
    }

    /// Returns a copy resampled to the internal processing rate.
    ///
    /// No-op clone when the buffer already matches.
    pub fn to_processing_rate(&self) -> Waveform {
        if self.sample_rate == SAMPLE_RATE {
            return self.clone();
        }
        Waveform::new(
            resample(&self.samples, self.sample_rate, SAMPLE_RATE),
            SAMPLE_RATE,
        )
    }
}

/// Simple linear interpolation resampling.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let src_pos = i as f64 * ratio;
            let idx = src_pos as usize;
            let frac = (src_pos - idx as f64) as f32;
            let a = samples[idx.min(samples.len() - 1)];
            let b = samples[(idx + 1).min(samples.len() - 1)];
            a + (b - a) * frac
        })
        .collect()
}

/// Downmix interleaved multi-channel samples to mono by averaging.
pub fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let n = channels as usize;
    samples
        .chunks_exact(n)
        .map(|frame| frame.iter().sum::<f32>() / n as f32)
        .collect()
}
