//! In-memory audit store
//!
//! Keeps every appended batch in a map keyed by collection. Used when the
//! engine is embedded in a host that persists records itself, and in tests.

use std::collections::HashMap;
use std::sync::RwLock;

use super::AuditStore;
use crate::audit::AuditRecord;
use crate::error::{AuditError, AuditResult};

#[derive(Default)]
pub struct MemoryAuditStore {
    data: RwLock<HashMap<String, Vec<AuditRecord>>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of one collection, in append order
    pub fn records(&self, collection: &str) -> AuditResult<Vec<AuditRecord>> {
        let data = self.data.read().map_err(|e| {
            AuditError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(collection).cloned().unwrap_or_default())
    }

    /// Names of all collections written so far, sorted
    pub fn collections(&self) -> AuditResult<Vec<String>> {
        let data = self.data.read().map_err(|e| {
            AuditError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut names: Vec<_> = data.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl AuditStore for MemoryAuditStore {
    fn append_batch(&self, collection: &str, records: &[AuditRecord]) -> AuditResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut data = self.data.write().map_err(|e| {
            AuditError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.entry(collection.to_string())
            .or_default()
            .extend_from_slice(records);
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::SnapshotAuditRecord;
    use crate::event::OperationKind;
    use chrono::Utc;

    fn snapshot(document_id: &str) -> AuditRecord {
        SnapshotAuditRecord {
            operation_type: OperationKind::Delete,
            collection_name: "users".into(),
            document_id: document_id.into(),
            timestamp: Utc::now(),
            pre_image: None,
            post_image: None,
        }
        .into()
    }

    #[test]
    fn test_append_and_list() {
        let store = MemoryAuditStore::new();

        store.append_batch("audit_logs", &[snapshot("a")]).unwrap();
        store
            .append_batch("audit_logs", &[snapshot("b"), snapshot("c")])
            .unwrap();

        let records = store.records("audit_logs").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].document_id(), "b");
        assert_eq!(store.collections().unwrap(), vec!["audit_logs"]);
    }

    #[test]
    fn test_empty_batch_creates_nothing() {
        let store = MemoryAuditStore::new();
        assert_eq!(store.append_batch("users_logs", &[]).unwrap(), 0);
        assert!(store.collections().unwrap().is_empty());
    }
}
