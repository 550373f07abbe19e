//! change-audit - audit trails derived from document change events
//!
//! Reacts to insert, update, replace and delete events on arbitrary document
//! collections and records what changed, either as one record per changed
//! leaf field or as one whole-document snapshot per event.
//!
//! # Architecture
//!
//! - `document`: structural equality and meaningfulness rules over JSON values
//! - `event`: change event model and the gate that filters audit collections
//! - `audit`: differ, operation strategies, record emission, snapshots
//! - `storage`: the `AuditStore` port with JSONL and in-memory adapters
//! - `engine`: per-event entry point returning the host-facing result
//! - `config`: paths and settings
//! - `cli`, `display`: command-line front end
//!
//! # Example
//!
//! ```rust,ignore
//! use change_audit::config::AuditSettings;
//! use change_audit::engine::{AuditEngine, AuditMode};
//! use change_audit::storage::MemoryAuditStore;
//!
//! let engine = AuditEngine::new(MemoryAuditStore::new(), AuditMode::FieldDiff, AuditSettings::default());
//! let result = engine.handle(&event);
//! println!("{}", serde_json::to_string(&result)?);
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod document;
pub mod engine;
pub mod error;
pub mod event;
pub mod storage;

pub use engine::{AuditEngine, AuditMode, InvocationResult};
pub use error::{AuditError, AuditResult};
