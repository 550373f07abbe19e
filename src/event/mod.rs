//! Change events delivered by the host
//!
//! A change event describes one insert, update, replace or delete against a
//! document, optionally carrying the document before and after the change.
//! Events come from an external change-capture mechanism and are only
//! deserialized here, never produced.

mod gate;

pub use gate::{resolve_collection_name, resolve_document_id, AuditGate, UNKNOWN};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::AuditError;

/// Kinds of write an event can describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Insert,
    Update,
    Replace,
    Delete,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Insert => write!(f, "insert"),
            OperationKind::Update => write!(f, "update"),
            OperationKind::Replace => write!(f, "replace"),
            OperationKind::Delete => write!(f, "delete"),
        }
    }
}

impl FromStr for OperationKind {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insert" => Ok(OperationKind::Insert),
            "update" => Ok(OperationKind::Update),
            "replace" => Ok(OperationKind::Replace),
            "delete" => Ok(OperationKind::Delete),
            other => Err(AuditError::InvalidEvent(format!(
                "unsupported operation type '{}'",
                other
            ))),
        }
    }
}

/// Namespace in the current event shape (`ns: {db, coll}`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coll: Option<String>,
}

/// Namespace in the legacy event shape (`namespace: {db, collection}`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyNamespace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<String>,
    #[serde(default, alias = "coll", skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

/// One change notification
///
/// Unknown fields are ignored so events from newer sources still parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Raw operation name; see [`ChangeEvent::operation`]
    #[serde(default)]
    pub operation_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ns: Option<Namespace>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<LegacyNamespace>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_key: Option<Document>,

    /// Post-image, absent on delete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_document: Option<Document>,

    /// Pre-image, only present when the source retains it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_document_before_change: Option<Document>,
}

impl ChangeEvent {
    /// The parsed operation kind, or `None` for anything unsupported
    pub fn operation(&self) -> Option<OperationKind> {
        self.operation_type.parse().ok()
    }

    /// Whether the event carries at least one document snapshot
    pub fn has_snapshot(&self) -> bool {
        self.full_document.is_some() || self.full_document_before_change.is_some()
    }
}
