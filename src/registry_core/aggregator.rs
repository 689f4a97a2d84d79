//! Per-program usage aggregation over the event scan
//!
//! Folds parsed transaction records into a mapping from program id to
//! accumulated statistics. The fold is commutative and associative across
//! records, so results do not depend on the order rows come out of the
//! database.

use super::event_reader::EventReader;
use super::record::TransactionRecord;
use std::collections::{BTreeSet, HashMap};

/// Accumulated statistics for one program id within a single run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramStats {
    /// Events referencing this program. One event contributes at most 1,
    /// however many of its instructions target the program.
    pub count: u64,
    pub sources: BTreeSet<String>,
    pub types: BTreeSet<String>,
    /// First non-empty signature observed. First-seen-wins, never replaced.
    pub sample_tx: Option<String>,
    /// Min/max timestamp bounds. `None` means no event folded yet, so a
    /// genuine timestamp of 0 is still a valid bound.
    pub first_seen: Option<i64>,
    pub last_seen: Option<i64>,
}

/// Mapping from program id to accumulated stats, plus the processed counter
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProgramAggregate {
    stats: HashMap<String, ProgramStats>,
    events_folded: u64,
}

impl ProgramAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one parsed record into the aggregate.
    ///
    /// Program ids are deduplicated within the record before counting.
    pub fn fold(&mut self, record: &TransactionRecord) {
        for pid in record.program_ids() {
            let stats = self.stats.entry(pid.to_string()).or_default();

            stats.count += 1;
            stats.sources.insert(record.source.clone());
            stats.types.insert(record.tx_type.clone());

            if stats.sample_tx.is_none() && !record.signature.is_empty() {
                stats.sample_tx = Some(record.signature.clone());
            }

            stats.first_seen = Some(match stats.first_seen {
                Some(seen) => seen.min(record.timestamp),
                None => record.timestamp,
            });
            stats.last_seen = Some(match stats.last_seen {
                Some(seen) => seen.max(record.timestamp),
                None => record.timestamp,
            });
        }

        self.events_folded += 1;
    }

    /// Number of records folded so far (parse failures never reach the fold)
    pub fn events_folded(&self) -> u64 {
        self.events_folded
    }

    /// Number of distinct program ids seen this run
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn get(&self, program_id: &str) -> Option<&ProgramStats> {
        self.stats.get(program_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ProgramStats)> {
        self.stats.iter()
    }
}

/// Scan the event store and fold every parseable row into a fresh aggregate.
///
/// Rows that fail to parse are dropped here, explicitly: they never touch
/// the aggregate and never abort the scan. Emits a progress line every
/// 10,000 processed events.
pub fn extract_program_stats(reader: &EventReader) -> Result<ProgramAggregate, rusqlite::Error> {
    let mut aggregate = ProgramAggregate::new();

    reader.scan(|raw| match TransactionRecord::from_json(raw) {
        Ok(record) => {
            aggregate.fold(&record);
            if aggregate.events_folded() % 10_000 == 0 {
                log::info!("   Processed {} events...", aggregate.events_folded());
            }
        }
        Err(_) => {
            // Malformed row: skip it whole, keep scanning
        }
    })?;

    Ok(aggregate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry_core::record::Instruction;

    fn make_record(
        source: &str,
        tx_type: &str,
        signature: &str,
        timestamp: i64,
        program_ids: &[&str],
    ) -> TransactionRecord {
        TransactionRecord {
            source: source.to_string(),
            tx_type: tx_type.to_string(),
            signature: signature.to_string(),
            timestamp,
            instructions: program_ids
                .iter()
                .map(|pid| Instruction {
                    program_id: Some(pid.to_string()),
                })
                .collect(),
        }
    }

    #[test]
    fn test_per_event_dedup() {
        let mut aggregate = ProgramAggregate::new();

        // Three instructions hitting the same program in one event
        aggregate.fold(&make_record("X", "MINT", "sig1", 100, &["P1", "P1", "P1"]));

        assert_eq!(aggregate.get("P1").unwrap().count, 1);
    }

    #[test]
    fn test_counts_across_events() {
        let mut aggregate = ProgramAggregate::new();

        aggregate.fold(&make_record("X", "MINT", "sig1", 100, &["P1", "P2"]));
        aggregate.fold(&make_record("Y", "SWAP", "sig2", 200, &["P1"]));
        aggregate.fold(&make_record("X", "MINT", "sig3", 300, &["P1"]));

        let p1 = aggregate.get("P1").unwrap();
        assert_eq!(p1.count, 3);
        assert_eq!(p1.sources.len(), 2);
        assert!(p1.sources.contains("X") && p1.sources.contains("Y"));
        assert!(p1.types.contains("MINT") && p1.types.contains("SWAP"));

        assert_eq!(aggregate.get("P2").unwrap().count, 1);
        assert_eq!(aggregate.len(), 2);
        assert_eq!(aggregate.events_folded(), 3);
    }

    #[test]
    fn test_sample_tx_first_nonempty_wins() {
        let mut aggregate = ProgramAggregate::new();

        aggregate.fold(&make_record("X", "MINT", "", 100, &["P1"]));
        aggregate.fold(&make_record("X", "MINT", "sig2", 200, &["P1"]));
        aggregate.fold(&make_record("X", "MINT", "sig3", 300, &["P1"]));

        assert_eq!(aggregate.get("P1").unwrap().sample_tx.as_deref(), Some("sig2"));
    }

    #[test]
    fn test_seen_bounds() {
        let mut aggregate = ProgramAggregate::new();

        aggregate.fold(&make_record("X", "MINT", "sig1", 500, &["P1"]));
        aggregate.fold(&make_record("X", "MINT", "sig2", 100, &["P1"]));
        aggregate.fold(&make_record("X", "MINT", "sig3", 900, &["P1"]));

        let p1 = aggregate.get("P1").unwrap();
        assert_eq!(p1.first_seen, Some(100));
        assert_eq!(p1.last_seen, Some(900));
    }

    #[test]
    fn test_zero_timestamp_is_a_valid_bound() {
        let mut aggregate = ProgramAggregate::new();

        aggregate.fold(&make_record("X", "MINT", "sig1", 0, &["P1"]));
        aggregate.fold(&make_record("X", "MINT", "sig2", 400, &["P1"]));

        let p1 = aggregate.get("P1").unwrap();
        assert_eq!(p1.first_seen, Some(0));
        assert_eq!(p1.last_seen, Some(400));
    }

    #[test]
    fn test_event_without_programs_still_counted_as_processed() {
        let mut aggregate = ProgramAggregate::new();

        aggregate.fold(&make_record("X", "MINT", "sig1", 100, &[]));

        assert!(aggregate.is_empty());
        assert_eq!(aggregate.events_folded(), 1);
    }
}
