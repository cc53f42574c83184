//! Reassembly of converted chunks into one waveform.
//!
//! Chunks are reordered to offset order before stitching; the shared
//! overlap between adjacent chunks is blended with a cosine crossfade, so
//! the stitched length equals the sum of the non-overlapped spans.

use crate::conversion::chunker::AudioChunk;

/// Stitch chunks back together in offset order.
///
/// Accepts chunks in any completion order. When a converted chunk came
/// back shorter than its declared overlap, the blend shrinks to what is
/// available rather than reading out of bounds.
pub fn stitch(mut chunks: Vec<AudioChunk>) -> Vec<f32> {
    chunks.sort_by_key(|c| c.offset);

    let mut out: Vec<f32> = Vec::new();
    for chunk in chunks {
        if out.is_empty() {
            out.extend_from_slice(&chunk.samples);
            continue;
        }

        let fade = chunk.overlap.min(out.len()).min(chunk.samples.len());
        let tail_start = out.len() - fade;
        for j in 0..fade {
            let fade_out = 0.5 * (1.0 + (std::f32::consts::PI * j as f32 / fade as f32).cos());
            let fade_in = 1.0 - fade_out;
            out[tail_start + j] = out[tail_start + j] * fade_out + chunk.samples[j] * fade_in;
        }
        out.extend_from_slice(&chunk.samples[fade..]);
    }

    out
}
