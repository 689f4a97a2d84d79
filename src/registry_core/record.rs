//! Transaction record parsing from stored event rows

use serde::Deserialize;
use std::collections::BTreeSet;

fn unknown_tag() -> String {
    "UNKNOWN".to_string()
}

/// One parsed event row from the `mint_event` table.
///
/// Rows are serialized transaction snapshots written by the capture side.
/// Fields the capture side omitted get neutral defaults; a row that is not
/// a JSON object of this shape fails to parse and is dropped whole.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRecord {
    #[serde(default = "unknown_tag")]
    pub source: String,
    #[serde(rename = "type", default = "unknown_tag")]
    pub tx_type: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

/// A single instruction within a transaction. Only the program id matters
/// here; every other instruction key is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Instruction {
    #[serde(rename = "programId")]
    pub program_id: Option<String>,
}

impl TransactionRecord {
    /// Parse a record from one raw `raw_json` column value
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Distinct program ids referenced by this record's instructions.
    ///
    /// A program referenced by several instructions of the same transaction
    /// appears once, so one event contributes at most 1 to any program count.
    pub fn program_ids(&self) -> BTreeSet<&str> {
        self.instructions
            .iter()
            .filter_map(|ix| ix.program_id.as_deref())
            .collect()
    }
}
