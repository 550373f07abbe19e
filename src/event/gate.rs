//! Change event gating
//!
//! Resolves which collection and document an event is about, and refuses
//! events raised by writes to the audit collections themselves. Without that
//! check every audit write would trigger another audit write.

use tracing::debug;

use super::ChangeEvent;
use crate::config::AuditSettings;
use crate::document::render_id;
use crate::engine::AuditMode;

/// Sentinel used when a collection name or document id cannot be resolved
pub const UNKNOWN: &str = "unknown";

/// Gate consulted before an event is audited
///
/// Field-diff output lands in `<collection><suffix>`, so any collection
/// carrying the suffix is refused. Snapshot output lands in one fixed
/// collection, so only that exact name is refused.
#[derive(Debug, Clone)]
pub struct AuditGate {
    mode: AuditMode,
    snapshot_collection: String,
    log_suffix: String,
}

impl AuditGate {
    pub fn new(
        mode: AuditMode,
        snapshot_collection: impl Into<String>,
        log_suffix: impl Into<String>,
    ) -> Self {
        Self {
            mode,
            snapshot_collection: snapshot_collection.into(),
            log_suffix: log_suffix.into(),
        }
    }

    pub fn from_settings(mode: AuditMode, settings: &AuditSettings) -> Self {
        Self::new(
            mode,
            settings.snapshot_collection.clone(),
            settings.log_collection_suffix.clone(),
        )
    }

    /// Name of the field-diff log collection for a source collection
    pub fn log_collection_for(&self, collection: &str) -> String {
        format!("{}{}", collection, self.log_suffix)
    }

    /// Name of the snapshot collection
    pub fn snapshot_collection(&self) -> &str {
        &self.snapshot_collection
    }

    /// Whether a collection holds this mode's audit output
    pub fn is_audit_collection(&self, collection: &str) -> bool {
        match self.mode {
            AuditMode::FieldDiff => {
                !self.log_suffix.is_empty() && collection.ends_with(&self.log_suffix)
            }
            AuditMode::Snapshot => collection == self.snapshot_collection,
        }
    }

    /// Whether the event should be audited at all
    pub fn should_process(&self, event: &ChangeEvent) -> bool {
        let collection = resolve_collection_name(event);
        if self.is_audit_collection(&collection) {
            debug!(
                collection = %collection,
                mode = ?self.mode,
                "skipping change on audit collection"
            );
            return false;
        }
        true
    }
}

/// Resolve the source collection name from either event shape
///
/// An empty name in one shape falls through to the other.
pub fn resolve_collection_name(event: &ChangeEvent) -> String {
    let current = event.ns.as_ref().and_then(|ns| ns.coll.as_deref());
    let legacy = event
        .namespace
        .as_ref()
        .and_then(|ns| ns.collection.as_deref());

    [current, legacy]
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Resolve the affected document id
///
/// Checks the document key, then the post-image, then the pre-image.
pub fn resolve_document_id(event: &ChangeEvent) -> String {
    [
        event.document_key.as_ref(),
        event.full_document.as_ref(),
        event.full_document_before_change.as_ref(),
    ]
    .into_iter()
    .flatten()
    .find_map(|doc| doc.get("_id").and_then(render_id))
    .unwrap_or_else(|| UNKNOWN.to_string())
}
