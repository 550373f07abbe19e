//! Audit record emission
//!
//! Turns differ output into [`FieldChangeRecord`]s and hands them to the store
//! in one batch. Store failures stop here: they are logged and reported as an
//! outcome, never propagated to the host that delivered the event.

use chrono::{DateTime, Utc};
use tracing::{error, info};

use super::diff::FieldChange;
use super::entry::{AuditRecord, FieldChangeRecord};
use crate::event::{ChangeEvent, OperationKind};
use crate::storage::AuditStore;

/// Result of one emission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
    /// This many records were persisted
    Written(usize),
    /// Nothing to write; the store was not called
    NothingToLog,
    /// The store rejected the batch
    Failed(String),
}

/// Resolve who made a change
///
/// Looks for `updatedBy`, then `name`, on the post-image first and then the
/// pre-image. Only non-empty strings count.
pub fn resolve_actor(event: &ChangeEvent, fallback: &str) -> String {
    let snapshots = [
        event.full_document.as_ref(),
        event.full_document_before_change.as_ref(),
    ];

    ["updatedBy", "name"]
        .iter()
        .find_map(|field| {
            snapshots.iter().flatten().find_map(|doc| {
                doc.get(*field)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
            })
        })
        .unwrap_or(fallback)
        .to_string()
}

/// Write a prepared batch, catching store failures
pub(crate) fn persist<S>(store: &S, collection: &str, records: &[AuditRecord]) -> EmitOutcome
where
    S: AuditStore + ?Sized,
{
    if records.is_empty() {
        return EmitOutcome::NothingToLog;
    }

    match store.append_batch(collection, records) {
        Ok(count) => {
            info!(collection, count, "audit records written");
            EmitOutcome::Written(count)
        }
        Err(e) => {
            error!(collection, error = %e, "failed to write audit records");
            EmitOutcome::Failed(e.to_string())
        }
    }
}

/// Emits field-level change records for one document
pub struct AuditEmitter<'s, S: AuditStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: AuditStore + ?Sized> AuditEmitter<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Annotate and persist the changes of one event in a single batch
    pub fn emit(
        &self,
        collection: &str,
        changes: Vec<FieldChange>,
        document_id: &str,
        operation: OperationKind,
        actor: &str,
        timestamp: DateTime<Utc>,
    ) -> EmitOutcome {
        let records: Vec<AuditRecord> = changes
            .into_iter()
            .map(|change| {
                FieldChangeRecord::from_change(change, document_id, operation, actor, timestamp)
                    .into()
            })
            .collect();

        persist(self.store, collection, &records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuditError, AuditResult};
    use crate::storage::MemoryAuditStore;
    use serde_json::json;

    struct FailingStore;

    impl AuditStore for FailingStore {
        fn append_batch(&self, _: &str, _: &[AuditRecord]) -> AuditResult<usize> {
            Err(AuditError::Storage("connection refused".into()))
        }
    }

    fn event(value: serde_json::Value) -> ChangeEvent {
        serde_json::from_value(value).unwrap()
    }

    fn change(path: &str) -> FieldChange {
        FieldChange {
            path: path.to_string(),
            old_value: json!("a"),
            new_value: json!("b"),
        }
    }

    #[test]
    fn test_actor_prefers_updated_by() {
        let e = event(json!({
            "fullDocument": {"name": "Ann", "updatedBy": "admin@x.com"}
        }));
        assert_eq!(resolve_actor(&e, "System"), "admin@x.com");
    }

    #[test]
    fn test_actor_updated_by_on_pre_image_beats_name() {
        let e = event(json!({
            "fullDocument": {"name": "Ann"},
            "fullDocumentBeforeChange": {"updatedBy": "bob"}
        }));
        assert_eq!(resolve_actor(&e, "System"), "bob");
    }

    #[test]
    fn test_actor_falls_back_to_name_then_system() {
        let e = event(json!({"fullDocumentBeforeChange": {"name": "Ann", "updatedBy": ""}}));
        assert_eq!(resolve_actor(&e, "System"), "Ann");

        let e = event(json!({"fullDocument": {"updatedBy": 42}}));
        assert_eq!(resolve_actor(&e, "System"), "System");
    }

    #[test]
    fn test_emit_writes_one_batch() {
        let store = MemoryAuditStore::new();
        let emitter = AuditEmitter::new(&store);
        let now = Utc::now();

        let outcome = emitter.emit(
            "users_logs",
            vec![change("a"), change("b.c")],
            "u1",
            OperationKind::Update,
            "alice",
            now,
        );

        assert_eq!(outcome, EmitOutcome::Written(2));
        let records = store.records("users_logs").unwrap();
        assert_eq!(records.len(), 2);
        match &records[1] {
            AuditRecord::Field(r) => {
                assert_eq!(r.changed_field, "b.c");
                assert_eq!(r.document_id, "u1");
                assert_eq!(r.updated_by, "alice");
                assert_eq!(r.timestamp, now);
            }
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn test_emit_nothing() {
        let store = MemoryAuditStore::new();
        let outcome = AuditEmitter::new(&store).emit(
            "users_logs",
            Vec::new(),
            "u1",
            OperationKind::Update,
            "System",
            Utc::now(),
        );

        assert_eq!(outcome, EmitOutcome::NothingToLog);
        assert!(store.collections().unwrap().is_empty());
    }

    #[test]
    fn test_emit_catches_store_failure() {
        let outcome = AuditEmitter::new(&FailingStore).emit(
            "users_logs",
            vec![change("a")],
            "u1",
            OperationKind::Insert,
            "System",
            Utc::now(),
        );

        assert_eq!(
            outcome,
            EmitOutcome::Failed("Storage error: connection refused".into())
        );
    }
}
