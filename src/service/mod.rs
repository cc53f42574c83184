//! Service facade: request/response protocol and the composition root.

pub mod handler;
pub mod protocol;

pub use handler::SpeechService;
pub use protocol::{
    ModelIndexResponse, ModelSummary, ModelsResponse, SpeakerIdsResponse, SpeechRequest,
    SpeechResponse, TranscriptionRequest, TranscriptionResponse, VoicesResponse,
};
