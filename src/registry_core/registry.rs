//! Persisted program registry document
//!
//! The registry is a single JSON file holding the curated `programs` mapping,
//! the `pending_review` queue, and run metadata. It is read at the start of a
//! run and overwritten wholesale at the end; the document is pretty-printed
//! so operators can diff it between runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use super::aggregator::ProgramStats;

#[derive(Debug)]
pub enum RegistryError {
    /// The registry file does not exist. Fatal precondition: this tool
    /// never creates a registry from scratch.
    Missing(PathBuf),
    Io(std::io::Error),
    /// The document does not match the registry schema
    Schema(serde_json::Error),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Missing(path) => {
                write!(f, "registry not found at {}", path.display())
            }
            RegistryError::Io(e) => write!(f, "registry I/O error: {}", e),
            RegistryError::Schema(e) => write!(f, "unrecognized registry schema: {}", e),
        }
    }
}

impl std::error::Error for RegistryError {}

/// A curated entry in the `programs` mapping.
///
/// Only `count` is ever written by this tool. Every other curated key
/// (name, category, notes, ...) is carried through the flattened map and
/// survives the round trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramEntry {
    #[serde(default)]
    pub count: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An entry awaiting manual classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEntry {
    #[serde(rename = "programId")]
    pub program_id: String,
    pub count: u64,
    pub sources: Vec<String>,
    pub sample_tx: Option<String>,
    pub solscan_url: String,
    pub status: String,
    pub detected_at: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PendingEntry {
    /// Build a fresh pending entry from this run's aggregated stats
    pub fn from_stats(program_id: &str, stats: &ProgramStats, detected_at: DateTime<Utc>) -> Self {
        Self {
            program_id: program_id.to_string(),
            count: stats.count,
            sources: stats.sources.iter().cloned().collect(),
            sample_tx: stats.sample_tx.clone(),
            solscan_url: format!("https://solscan.io/account/{}", program_id),
            status: "pending_review".to_string(),
            detected_at: detected_at.to_rfc3339(),
            extra: serde_json::Map::new(),
        }
    }
}

/// The full registry document.
///
/// `programs` and `pending_review` are required on load; the derived
/// metadata fields default so a minimal curated seed file is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    pub programs: BTreeMap<String, ProgramEntry>,
    pub pending_review: Vec<PendingEntry>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub total_programs: usize,
    #[serde(default)]
    pub verified_count: usize,
    #[serde(default)]
    pub pending_count: usize,
}

impl Registry {
    /// Load the registry from disk, validating the document shape.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RegistryError::Missing(path.to_path_buf()));
        }

        let json = fs::read_to_string(path).map_err(RegistryError::Io)?;
        let registry = serde_json::from_str(&json).map_err(RegistryError::Schema)?;
        Ok(registry)
    }

    /// Persist the registry wholesale, pretty-printed.
    ///
    /// Writes to a sibling temp file and renames over the target, so a crash
    /// mid-write leaves the previous document intact.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RegistryError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(RegistryError::Schema)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(RegistryError::Io)?;
        fs::rename(&tmp, path).map_err(RegistryError::Io)?;

        Ok(())
    }

    /// The universe of already-known identifiers: curated keys plus every
    /// pending entry. An id is "new" iff absent from both.
    pub fn known_program_ids(&self) -> HashSet<String> {
        let mut ids: HashSet<String> = self.programs.keys().cloned().collect();
        ids.extend(self.pending_review.iter().map(|p| p.program_id.clone()));
        ids
    }
}
