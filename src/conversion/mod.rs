//! Voice-conversion stage: parameters, chunking, pitch transforms,
//! collaborator boundary, and fixed-order orchestration.

pub mod chunker;
pub mod converter;
pub mod params;
pub mod pitch;
pub mod stage;
pub mod stitcher;

pub use chunker::AudioChunk;
pub use converter::{MockConverter, PassthroughConverter, TimbreSettings, VoiceConverter};
pub use params::{ConversionParameters, EmbedderModel, ExportFormat, PitchMethod};
pub use pitch::PitchContour;
pub use stage::convert_waveform;
