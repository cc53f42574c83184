//! Default configuration constants for voxpipe.
//!
//! This module provides shared constants used across different stages
//! to ensure consistency and eliminate duplication.

/// Internal processing sample rate in Hz.
///
/// 16kHz mono is the contract between the synthesis, conversion, and
/// transcription stages; inputs at other rates are resampled on decode.
pub const SAMPLE_RATE: u32 = 16000;

/// Maximum text length for a synthesis request, in Unicode code points.
pub const MAX_TEXT_CODE_POINTS: usize = 5000;

/// Bounds for the TTS rate adjustment (signed percentage).
pub const RATE_MIN: i32 = -100;
pub const RATE_MAX: i32 = 100;

/// Bounds for the explicit pitch shift in semitones.
pub const PITCH_MIN: i32 = -24;
pub const PITCH_MAX: i32 = 24;

/// Bounds for the proposed-pitch frequency threshold in Hz.
pub const PROPOSED_PITCH_HZ_MIN: f32 = 50.0;
pub const PROPOSED_PITCH_HZ_MAX: f32 = 1200.0;

/// Upper bound for unvoiced-consonant protection.
pub const PROTECT_MAX: f32 = 0.5;

/// Default speaker label used when diarization yields no turns.
///
/// Matches the `SPEAKER_NN` convention of common diarization backends so
/// degraded and full results read the same to callers.
pub const DEFAULT_SPEAKER: &str = "SPEAKER_00";

/// Crossfade window at chunk boundaries, in milliseconds.
///
/// Chunks are split with this much shared overlap; reassembly fades across
/// it, so total duration is preserved through split/merge.
pub const CROSSFADE_MS: u32 = 50;

/// Target chunk duration for split-audio conversion, in seconds.
pub const CHUNK_TARGET_SECS: f32 = 10.0;

/// Half-width of the window searched for a silence boundary around the
/// chunk target, in seconds. If no silence is found inside the window the
/// chunk is cut at the target, bounding worst-case chunk size.
pub const CHUNK_SEARCH_SECS: f32 = 2.0;

/// RMS level below which a frame counts as silence during boundary search.
pub const SILENCE_THRESHOLD: f32 = 0.01;

/// Pitch-contour hop size in milliseconds.
pub const CONTOUR_HOP_MS: u32 = 10;

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Report the GPU backend compiled into this build.
///
/// Returns a human-readable name based on the compile-time feature flags.
/// Only one GPU backend can be active at a time; if none is enabled, returns "CPU".
pub fn gpu_backend() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA"
    } else if cfg!(feature = "vulkan") {
        "Vulkan"
    } else if cfg!(feature = "hipblas") {
        "HipBLAS (AMD)"
    } else if cfg!(feature = "openblas") {
        "OpenBLAS"
    } else {
        "CPU"
    }
}
