//! Audit trail derivation
//!
//! Turns change events into audit records, in one of two modes:
//!
//! - field diff: one [`FieldChangeRecord`] per changed leaf field, written to
//!   `<collection>_logs`
//! - snapshot: one [`SnapshotAuditRecord`] per event holding the raw pre- and
//!   post-images, written to a single fixed collection
//!
//! # Pipeline
//!
//! [`select_changes`] picks how to drive [`diff`] for the operation kind,
//! [`AuditEmitter`] annotates and persists the result. The snapshot path skips
//! the differ and goes straight to the store.
//!
//! # Example
//!
//! ```rust,ignore
//! use change_audit::audit::{diff, default_excluded_fields};
//! use serde_json::json;
//!
//! let old = json!({"Address": {"City": "A", "State": "X"}});
//! let new = json!({"Address": {"City": "B", "State": "X"}});
//! let excluded = default_excluded_fields();
//!
//! let changes: Vec<_> =
//!     diff(old.as_object(), new.as_object(), "", &excluded).collect();
//! assert_eq!(changes[0].path, "Address.City");
//! ```

mod diff;
mod emitter;
mod entry;
mod snapshot;
mod strategy;

pub use diff::{default_excluded_fields, diff, DiffIter, FieldChange, DEFAULT_EXCLUDED_FIELDS};
pub use emitter::{resolve_actor, AuditEmitter, EmitOutcome};
pub use entry::{AuditRecord, FieldChangeRecord, SnapshotAuditRecord};
pub use snapshot::{record_snapshot, snapshot_record};
pub use strategy::{select_changes, MissingPreImagePolicy, StrategyOptions};
