//! Text-to-speech synthesis stage.

#[cfg(feature = "edge")]
pub mod edge;
pub mod engine;

pub use engine::{MockSynthesizer, SpeechSynthesizer, SynthesisRequest, VoiceInfo, clean_text};
