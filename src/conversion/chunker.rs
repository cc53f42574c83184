//! Waveform splitter for the optional split-audio conversion path.
//!
//! Boundaries prefer silence inside a search window around the chunk
//! target; when no silence is found the cut falls at the target itself,
//! bounding worst-case chunk size. Adjacent chunks share a crossfade-sized
//! overlap so reassembly reproduces the original duration.

use crate::audio::Waveform;
use crate::defaults;

/// A contiguous sub-range of a waveform plus its original offset.
///
/// `offset` (in samples of the source waveform) is the sole reassembly
/// key. `overlap` counts the leading samples shared with the previous
/// chunk; it is 0 for the first chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    pub samples: Vec<f32>,
    pub offset: usize,
    pub overlap: usize,
}

/// Configuration for the splitter.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Target chunk duration in samples.
    pub target_samples: usize,
    /// Half-width of the silence search window in samples.
    pub search_samples: usize,
    /// Shared overlap between adjacent chunks in samples.
    pub overlap_samples: usize,
    /// RMS level below which a frame counts as silence.
    pub silence_threshold: f32,
    /// Frame size for silence scoring in samples.
    pub frame_samples: usize,
}

impl SplitConfig {
    /// Default policy for the given sample rate.
    pub fn for_sample_rate(sample_rate: u32) -> Self {
        let rate = sample_rate as f32;
        Self {
            target_samples: (defaults::CHUNK_TARGET_SECS * rate) as usize,
            search_samples: (defaults::CHUNK_SEARCH_SECS * rate) as usize,
            overlap_samples: (defaults::CROSSFADE_MS * sample_rate / 1000) as usize,
            silence_threshold: defaults::SILENCE_THRESHOLD,
            frame_samples: (sample_rate / 50) as usize, // 20ms frames
        }
    }
}

/// Split a waveform into overlapping chunks at silence-preferring
/// boundaries.
///
/// Always returns at least one chunk; a waveform no longer than one
/// target-plus-window is returned whole.
pub fn split(waveform: &Waveform, config: &SplitConfig) -> Vec<AudioChunk> {
    let samples = &waveform.samples;
    let total = samples.len();

    if total == 0 {
        return vec![AudioChunk {
            samples: Vec::new(),
            offset: 0,
            overlap: 0,
        }];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let remaining = total - start;
        // The tail fits in one chunk — emit and stop.
        if remaining <= config.target_samples + config.search_samples {
            let overlap = if chunks.is_empty() {
                0
            } else {
                config.overlap_samples.min(start)
            };
            let begin = start - overlap;
            chunks.push(AudioChunk {
                samples: samples[begin..total].to_vec(),
                offset: begin,
                overlap,
            });
            break;
        }

        let target = start + config.target_samples;
        let boundary = find_silence_boundary(samples, target, config).unwrap_or(target);

        let overlap = if chunks.is_empty() {
            0
        } else {
            config.overlap_samples.min(start)
        };
        let begin = start - overlap;
        chunks.push(AudioChunk {
            samples: samples[begin..boundary].to_vec(),
            offset: begin,
            overlap,
        });

        start = boundary;
    }

    chunks
}

/// Search the window around `target` for the quietest frame below the
/// silence threshold and return its center, or None when the window holds
/// no silence.
fn find_silence_boundary(samples: &[f32], target: usize, config: &SplitConfig) -> Option<usize> {
    let lo = target.saturating_sub(config.search_samples);
    let hi = (target + config.search_samples).min(samples.len());
    if lo >= hi || config.frame_samples == 0 {
        return None;
    }

    let mut best: Option<(f32, usize)> = None;
    let mut pos = lo;
    while pos + config.frame_samples <= hi {
        let frame = &samples[pos..pos + config.frame_samples];
        let rms = frame_rms(frame);
        if rms < config.silence_threshold {
            let center = pos + config.frame_samples / 2;
            match best {
                Some((best_rms, _)) if best_rms <= rms => {}
                _ => best = Some((rms, center)),
            }
        }
        pos += config.frame_samples;
    }

    best.map(|(_, center)| center)
}

fn frame_rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum: f32 = frame.iter().map(|s| s * s).sum();
    (sum / frame.len() as f32).sqrt()
}
