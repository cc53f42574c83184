//! Voice-model discovery and memoized model handles.

pub mod cache;
pub mod registry;

pub use cache::ModelCache;
pub use registry::{ModelEntry, ModelHandle, ModelRegistry};
