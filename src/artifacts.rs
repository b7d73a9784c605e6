// 📦 Artifact Loading - pre-fitted encoders, scaler and models from disk
//
// Files are read once at start. Each one is fingerprinted so a running
// process can report exactly which fitted objects it is serving.

use crate::error::{PredictError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENCODERS_FILE: &str = "label_encoders.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const KNN_FILE: &str = "knn_model.json";
pub const TREE_FILE: &str = "decision_tree_model.json";

// ============================================================================
// PATHS (configuration)
// ============================================================================

/// Where the four artifact files live
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    pub encoders: PathBuf,
    pub scaler: PathBuf,
    pub knn: PathBuf,
    pub decision_tree: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside one directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        ArtifactPaths {
            encoders: dir.join(ENCODERS_FILE),
            scaler: dir.join(SCALER_FILE),
            knn: dir.join(KNN_FILE),
            decision_tree: dir.join(TREE_FILE),
        }
    }
}

// ============================================================================
// MANIFEST
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub name: &'static str,
    pub path: PathBuf,
    pub sha256: String,
    pub bytes: usize,
}

/// What was loaded, and when
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactManifest {
    pub artifacts: Vec<ArtifactInfo>,
    pub loaded_at: DateTime<Utc>,
}

impl ArtifactManifest {
    pub fn new() -> Self {
        ArtifactManifest {
            artifacts: Vec::new(),
            loaded_at: Utc::now(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ArtifactInfo> {
        self.artifacts.iter().find(|a| a.name == name)
    }
}

impl Default for ArtifactManifest {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// READING
// ============================================================================

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Read and parse one JSON artifact, recording it in the manifest
pub fn read_artifact<T: DeserializeOwned>(
    name: &'static str,
    path: &Path,
    manifest: &mut ArtifactManifest,
) -> Result<T> {
    let bytes = fs::read(path).map_err(|source| PredictError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_slice(&bytes).map_err(|source| PredictError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let info = ArtifactInfo {
        name,
        path: path.to_path_buf(),
        sha256: sha256_hex(&bytes),
        bytes: bytes.len(),
    };
    tracing::info!(
        artifact = name,
        path = %info.path.display(),
        sha256 = %info.sha256,
        bytes = info.bytes,
        "loaded artifact"
    );
    manifest.artifacts.push(info);

    Ok(value)
}

// ============================================================================
// TESTS
// ============================================================================
