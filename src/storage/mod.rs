//! Storage layer for change-audit
//!
//! The engine writes through the [`AuditStore`] port and never reaches for a
//! global store. Two adapters are provided: an append-only JSONL file store
//! and an in-memory store.

pub mod file_io;
pub mod jsonl;
pub mod memory;

pub use file_io::{read_json, read_json_required, write_json_atomic};
pub use jsonl::JsonlAuditStore;
pub use memory::MemoryAuditStore;

use crate::audit::AuditRecord;
use crate::error::AuditResult;

/// Append-only sink for audit records
///
/// One call per change event. Implementations write the batch as a unit
/// rather than record by record.
pub trait AuditStore: Send + Sync {
    /// Append all records to a collection, returning how many were written
    fn append_batch(&self, collection: &str, records: &[AuditRecord]) -> AuditResult<usize>;
}
