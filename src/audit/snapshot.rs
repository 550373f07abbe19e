//! Whole-document snapshot auditing
//!
//! Stores the pre-image/post-image pair of an event without diffing. Every
//! supported event produces exactly one record.

use chrono::{DateTime, Utc};

use super::emitter::{persist, EmitOutcome};
use super::entry::SnapshotAuditRecord;
use crate::event::{ChangeEvent, OperationKind};
use crate::storage::AuditStore;

/// Build the snapshot record for an event
pub fn snapshot_record(
    event: &ChangeEvent,
    operation: OperationKind,
    collection_name: &str,
    document_id: &str,
    timestamp: DateTime<Utc>,
) -> SnapshotAuditRecord {
    let (pre_image, post_image) = match operation {
        OperationKind::Insert => (None, event.full_document.clone()),
        OperationKind::Update | OperationKind::Replace => (
            event.full_document_before_change.clone(),
            event.full_document.clone(),
        ),
        OperationKind::Delete => (event.full_document_before_change.clone(), None),
    };

    SnapshotAuditRecord {
        operation_type: operation,
        collection_name: collection_name.to_string(),
        document_id: document_id.to_string(),
        timestamp,
        pre_image,
        post_image,
    }
}

/// Persist one snapshot record to the snapshot collection
pub fn record_snapshot<S>(
    store: &S,
    snapshot_collection: &str,
    record: SnapshotAuditRecord,
) -> EmitOutcome
where
    S: AuditStore + ?Sized,
{
    persist(store, snapshot_collection, &[record.into()])
}
