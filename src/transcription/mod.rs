//! Transcription stage: segment types and the recognizer boundary.

pub mod recognizer;
pub mod segment;
pub mod whisper;

pub use recognizer::{MockRecognizer, ModelSize, SpeechRecognizer, TranscribeOptions};
pub use segment::{Transcript, TranscriptSegment, WordSpan};
