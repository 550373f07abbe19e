//! Audit record data structures
//!
//! Two record shapes are persisted: one [`FieldChangeRecord`] per changed leaf
//! field, or one [`SnapshotAuditRecord`] per event. Both are written once and
//! never updated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::diff::FieldChange;
use crate::display::format_value;
use crate::document::Document;
use crate::event::OperationKind;

/// A single changed field of one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChangeRecord {
    pub document_id: String,

    pub operation_type: OperationKind,

    /// Dot-delimited path of the changed leaf
    pub changed_field: String,

    pub old_value: Value,

    pub new_value: Value,

    /// Best-effort attribution of who made the change
    pub updated_by: String,

    /// When the record was created (UTC)
    pub timestamp: DateTime<Utc>,
}

impl FieldChangeRecord {
    /// Build a record from a differ tuple
    pub fn from_change(
        change: FieldChange,
        document_id: impl Into<String>,
        operation_type: OperationKind,
        updated_by: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            operation_type,
            changed_field: change.path,
            old_value: change.old_value,
            new_value: change.new_value,
            updated_by: updated_by.into(),
            timestamp,
        }
    }
}

/// A whole-document before/after capture of one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotAuditRecord {
    pub operation_type: OperationKind,

    pub collection_name: String,

    pub document_id: String,

    pub timestamp: DateTime<Utc>,

    /// Document before the change (null when not retained)
    #[serde(default)]
    pub pre_image: Option<Document>,

    /// Document after the change (null on delete)
    #[serde(default)]
    pub post_image: Option<Document>,
}

/// Anything the audit store can persist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuditRecord {
    Field(FieldChangeRecord),
    Snapshot(SnapshotAuditRecord),
}

impl AuditRecord {
    pub fn document_id(&self) -> &str {
        match self {
            AuditRecord::Field(r) => &r.document_id,
            AuditRecord::Snapshot(r) => &r.document_id,
        }
    }

    /// Format the record for human-readable output
    pub fn format_human_readable(&self) -> String {
        match self {
            AuditRecord::Field(r) => format!(
                "[{}] {} {} {}: {} -> {} (by {})",
                r.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                r.operation_type.to_string().to_uppercase(),
                r.document_id,
                r.changed_field,
                format_value(&r.old_value),
                format_value(&r.new_value),
                r.updated_by
            ),
            AuditRecord::Snapshot(r) => {
                let mut output = format!(
                    "[{}] {} {} {}",
                    r.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                    r.operation_type.to_string().to_uppercase(),
                    r.collection_name,
                    r.document_id
                );
                if let Some(pre) = &r.pre_image {
                    output.push_str(&format!("\n  Before: {{{} fields}}", pre.len()));
                }
                if let Some(post) = &r.post_image {
                    output.push_str(&format!("\n  After:  {{{} fields}}", post.len()));
                }
                output
            }
        }
    }
}

impl From<FieldChangeRecord> for AuditRecord {
    fn from(record: FieldChangeRecord) -> Self {
        AuditRecord::Field(record)
    }
}

impl From<SnapshotAuditRecord> for AuditRecord {
    fn from(record: SnapshotAuditRecord) -> Self {
        AuditRecord::Snapshot(record)
    }
}
