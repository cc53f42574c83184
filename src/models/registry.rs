//! Voice-conversion model discovery.
//!
//! Models are `.pth` files under the registry root (conventionally one
//! directory per voice). A retrieval index is matched by co-location: an
//! `.index` file sitting next to the model, preferring one that names the
//! model's stem.

use crate::error::{Result, VoxpipeError};
use std::path::{Path, PathBuf};

/// A discovered voice-conversion model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEntry {
    /// File stem of the model, used as its registry name.
    pub name: String,
    pub path: PathBuf,
    /// Co-located retrieval index, if one exists.
    pub index_path: Option<PathBuf>,
}

/// A resolved model/index pair ready for the conversion stage.
///
/// Published once into the model cache and shared read-only across
/// requests.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelHandle {
    pub name: String,
    pub path: PathBuf,
    /// Index actually in effect for this handle; None disables retrieval.
    pub index_path: Option<PathBuf>,
}

impl ModelHandle {
    /// Cache key for a model/index pair.
    pub fn cache_key(model_path: &Path, index_path: Option<&Path>) -> String {
        match index_path {
            Some(index) => format!("{}|{}", model_path.display(), index.display()),
            None => model_path.display().to_string(),
        }
    }
}

/// Scans a directory tree for voice models.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    root: PathBuf,
}

impl ModelRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List every model under the root (root itself plus one directory
    /// level, matching the conventional one-directory-per-voice layout).
    ///
    /// Reflects live filesystem state on every call; nothing is cached.
    pub fn list(&self) -> Result<Vec<ModelEntry>> {
        let mut entries = Vec::new();
        if !self.root.is_dir() {
            return Ok(entries);
        }

        let mut dirs = vec![self.root.clone()];
        if let Ok(read) = std::fs::read_dir(&self.root) {
            for entry in read.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    dirs.push(path);
                }
            }
        }

        for dir in dirs {
            for entry in std::fs::read_dir(&dir)?.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("pth") {
                    entries.push(ModelEntry {
                        name: file_stem(&path),
                        path: path.clone(),
                        index_path: match_index(&path),
                    });
                }
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Resolve a model reference to an existing model file.
    ///
    /// The reference may be a path (absolute, or relative to the registry
    /// root) or a bare registry name.
    pub fn resolve(&self, model_ref: &str) -> Result<ModelEntry> {
        let as_path = Path::new(model_ref);
        let candidate = if as_path.is_absolute() {
            as_path.to_path_buf()
        } else {
            self.root.join(as_path)
        };

        if candidate.is_file() {
            return Ok(ModelEntry {
                name: file_stem(&candidate),
                path: candidate.clone(),
                index_path: match_index(&candidate),
            });
        }

        // Fall back to a bare-name lookup over the scan
        if let Some(entry) = self.list()?.into_iter().find(|m| m.name == model_ref) {
            return Ok(entry);
        }

        Err(VoxpipeError::ModelNotFound {
            path: model_ref.to_string(),
        })
    }

    /// Resolve the retrieval index for a model.
    ///
    /// An explicit path that does not exist is an error. An omitted path
    /// falls back to co-location auto-discovery, and a discovery miss
    /// silently disables retrieval.
    pub fn resolve_index(
        &self,
        model_path: &Path,
        explicit: Option<&Path>,
    ) -> Result<Option<PathBuf>> {
        match explicit {
            Some(path) => {
                let candidate = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    self.root.join(path)
                };
                if candidate.is_file() {
                    Ok(Some(candidate))
                } else {
                    Err(VoxpipeError::IndexNotFound {
                        path: path.display().to_string(),
                    })
                }
            }
            None => Ok(match_index(model_path)),
        }
    }

    /// Speaker indexes available in a model.
    ///
    /// Multi-speaker metadata is owned by the conversion collaborator;
    /// the registry reports the always-present default speaker.
    pub fn speaker_ids(&self, _entry: &ModelEntry) -> Vec<u32> {
        vec![0]
    }
}

/// Find a co-located `.index` file for a model, preferring one that names
/// the model's stem.
pub fn match_index(model_path: &Path) -> Option<PathBuf> {
    let dir = model_path.parent()?;
    let stem = model_path.file_stem()?.to_string_lossy().to_string();

    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("index"))
        .collect();
    candidates.sort();

    candidates
        .iter()
        .find(|p| {
            p.file_stem()
                .map(|s| s.to_string_lossy().contains(&stem))
                .unwrap_or(false)
        })
        .cloned()
        .or_else(|| candidates.into_iter().next())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
