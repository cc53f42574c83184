//! The conversion stage: fixed-order orchestration of chunking, pitch
//! transforms, timbre conversion, cleanup, and reassembly.
//!
//! Processing order is not reorderable — later steps assume earlier
//! steps' invariants. Per-chunk work (pitch extraction through cleanup)
//! has no cross-chunk data dependency and runs in parallel; reassembly is
//! the synchronization point and restores offset order before crossfading.

use crate::audio::Waveform;
use crate::conversion::chunker::{self, AudioChunk, SplitConfig};
use crate::conversion::converter::{TimbreSettings, VoiceConverter};
use crate::conversion::params::ConversionParameters;
use crate::conversion::stitcher;
use crate::error::Result;
use crate::models::ModelHandle;
use crossbeam_channel::unbounded;

/// Run one voice-conversion pass.
///
/// Consumes the raw waveform; the converted result is a new waveform at
/// the same sample rate. `params` must have passed `validate()` at the
/// request boundary. The handle's `index_path` decides whether retrieval
/// is in effect: a requested ratio with no index degrades to ratio 0.
pub fn convert_waveform(
    waveform: Waveform,
    params: &ConversionParameters,
    model: &ModelHandle,
    converter: &dyn VoiceConverter,
) -> Result<Waveform> {
    let sample_rate = waveform.sample_rate;

    let effective_index_rate = if model.index_path.is_some() {
        params.index_rate
    } else {
        0.0
    };
    let settings = TimbreSettings {
        index_rate: effective_index_rate,
        volume_envelope: params.volume_envelope,
        protect: params.protect,
        speaker_id: params.sid,
        embedder: params.embedder_model.clone(),
    };

    let chunks = if params.split_audio {
        chunker::split(&waveform, &SplitConfig::for_sample_rate(sample_rate))
    } else {
        vec![AudioChunk {
            samples: waveform.samples,
            offset: 0,
            overlap: 0,
        }]
    };

    let converted = if chunks.len() > 1 {
        convert_chunks_parallel(chunks, sample_rate, params, model, converter, &settings)?
    } else {
        chunks
            .into_iter()
            .map(|c| convert_chunk(c, sample_rate, params, model, converter, &settings))
            .collect::<Result<Vec<_>>>()?
    };

    Ok(Waveform::new(stitcher::stitch(converted), sample_rate))
}

/// Steps 2–6 for a single chunk.
fn convert_chunk(
    chunk: AudioChunk,
    sample_rate: u32,
    params: &ConversionParameters,
    model: &ModelHandle,
    converter: &dyn VoiceConverter,
    settings: &TimbreSettings,
) -> Result<AudioChunk> {
    let mut contour = converter.extract_pitch(&chunk.samples, sample_rate, params.f0_method)?;

    // Proposed-pitch rescaling comes before the explicit shift; the shift
    // always applies after, never before.
    if params.proposed_pitch {
        contour.rescale_median_to(params.proposed_pitch_threshold);
    }
    contour.shift_semitones(params.pitch);
    if params.f0_autotune {
        contour.autotune(params.f0_autotune_strength);
    }

    let mut samples = converter.convert(&chunk.samples, sample_rate, &contour, model, settings)?;

    if params.clean_audio {
        apply_cleanup(&mut samples, params.clean_strength);
    }

    Ok(AudioChunk {
        samples,
        offset: chunk.offset,
        overlap: chunk.overlap,
    })
}

/// Fan chunks out to worker threads and collect completions in any order.
///
/// The stitcher re-sorts by offset, so completion order never reaches the
/// output. Errors are reported for the earliest-offset failing chunk to
/// keep failure deterministic.
fn convert_chunks_parallel(
    chunks: Vec<AudioChunk>,
    sample_rate: u32,
    params: &ConversionParameters,
    model: &ModelHandle,
    converter: &dyn VoiceConverter,
    settings: &TimbreSettings,
) -> Result<Vec<AudioChunk>> {
    let (tx, rx) = unbounded();
    let count = chunks.len();

    std::thread::scope(|scope| {
        for chunk in chunks {
            let tx = tx.clone();
            scope.spawn(move || {
                let offset = chunk.offset;
                let result = convert_chunk(chunk, sample_rate, params, model, converter, settings);
                // Receiver only disconnects if the scope is unwinding
                let _ = tx.send((offset, result));
            });
        }
    });
    drop(tx);

    let mut completions: Vec<(usize, Result<AudioChunk>)> = rx.iter().take(count).collect();
    completions.sort_by_key(|(offset, _)| *offset);

    let mut converted = Vec::with_capacity(count);
    for (_, result) in completions {
        converted.push(result?);
    }
    Ok(converted)
}

/// Denoise/declick pass, aggressiveness scaled by `strength`.
///
/// A gate pulls near-silent samples toward zero and a short moving
/// average smooths single-sample spikes; both effects scale linearly with
/// strength so 0.0 is a no-op.
fn apply_cleanup(samples: &mut [f32], strength: f32) {
    let strength = strength.clamp(0.0, 1.0);
    if strength == 0.0 || samples.len() < 3 {
        return;
    }

    let gate = 0.005 * strength;
    let blend = 0.5 * strength;

    let mut previous = samples[0];
    for i in 1..samples.len() - 1 {
        let current = samples[i];
        let smoothed = (previous + current + samples[i + 1]) / 3.0;
        let mut value = current * (1.0 - blend) + smoothed * blend;
        if value.abs() < gate {
            value *= 1.0 - strength;
        }
        samples[i] = value;
        previous = current;
    }
}
