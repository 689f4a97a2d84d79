//! Registry Core - Program Discovery and Reconciliation Engine
//!
//! This module provides the infrastructure for turning a raw event log into
//! an updated program registry: which on-chain programs the captured
//! transactions touched, how often, and which of them nobody has classified
//! yet.
//!
//! # Architecture
//!
//! ```text
//! SQLite Database → EventReader → ProgramAggregate (per-program stats)
//!     ↓
//! Reconciler (known vs new partition, count refresh)
//!     ↓
//! Registry (JSON read-modify-write, pending_review queue)
//!     ↓
//! Notifier → Telegram summary
//! ```

pub mod aggregator;
pub mod event_reader;
pub mod notifier;
pub mod reconciler;
pub mod record;
pub mod registry;

pub use aggregator::{extract_program_stats, ProgramAggregate, ProgramStats};
pub use event_reader::EventReader;
pub use notifier::{build_message, Notifier, TelegramNotifier};
pub use reconciler::reconcile;
pub use record::{Instruction, TransactionRecord};
pub use registry::{PendingEntry, ProgramEntry, Registry, RegistryError};
