//! Speaker diarization: collaborator boundary and the transcript merge.

pub mod diarizer;
pub mod merge;

pub use diarizer::{Diarizer, MockDiarizer, SpeakerTurn, UnconfiguredDiarizer};
pub use merge::{LabeledSegment, MergedTranscript, label_segments};
