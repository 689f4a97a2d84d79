//! Reconciliation of aggregated program stats into the persisted registry
//!
//! Classifies every program seen this run as verified, already pending, or
//! newly observed; refreshes counts; appends new pending entries; and
//! recomputes the derived metadata. Re-running against an unchanged event
//! database is idempotent: counts replay to the same totals and no new
//! entries appear.

use chrono::{DateTime, Utc};

use super::aggregator::ProgramAggregate;
use super::registry::{PendingEntry, Registry};

/// Merge this run's aggregate into the registry. Returns the number of
/// newly discovered programs; the (sorted) pending list lives on the
/// registry for the caller to hand to the notifier.
pub fn reconcile(
    registry: &mut Registry,
    aggregate: &ProgramAggregate,
    now: DateTime<Utc>,
) -> usize {
    let existing = registry.known_program_ids();

    let mut new_entries: Vec<PendingEntry> = Vec::new();

    for (pid, stats) in aggregate.iter() {
        if !existing.contains(pid.as_str()) {
            new_entries.push(PendingEntry::from_stats(pid, stats, now));
        } else if let Some(entry) = registry.programs.get_mut(pid) {
            // Counts are a full replace: a rescan of the same database
            // replays the same total, it is not additive across runs.
            entry.count = stats.count;
        } else if let Some(entry) = registry
            .pending_review
            .iter_mut()
            .find(|p| p.program_id == *pid)
        {
            entry.count = stats.count;
        }
    }

    let new_count = new_entries.len();
    if new_count > 0 {
        log::info!("🆕 Found {} new programs", new_count);
        // The aggregate map's iteration order is arbitrary; order the batch
        // so repeated runs produce identical documents.
        new_entries.sort_by(|a, b| b.count.cmp(&a.count).then(a.program_id.cmp(&b.program_id)));
        registry.pending_review.extend(new_entries);
    } else {
        log::info!("No new programs detected");
    }

    // Whole-list re-sort: refreshed counts can reorder old entries too.
    // Stable, so ties keep their prior order.
    registry.pending_review.sort_by(|a, b| b.count.cmp(&a.count));

    registry.version = now.format("%Y-%m-%d").to_string();
    registry.last_updated = now.to_rfc3339();
    registry.total_programs = aggregate.len();
    registry.verified_count = registry.programs.len();
    registry.pending_count = registry.pending_review.len();

    new_count
}
