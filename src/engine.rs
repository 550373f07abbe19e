//! Audit engine entry point
//!
//! One call to [`AuditEngine::handle`] processes one change event: gate it,
//! derive records in the configured mode, write them in a single batch and
//! report one of three outcomes. The engine keeps no state between calls, so
//! a single instance can serve concurrent events when its store allows it.

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::audit::{
    record_snapshot, resolve_actor, select_changes, snapshot_record, AuditEmitter, EmitOutcome,
    StrategyOptions,
};
use crate::config::AuditSettings;
use crate::event::{resolve_collection_name, resolve_document_id, AuditGate, ChangeEvent};
use crate::storage::AuditStore;

/// Message reported when an event yields nothing to record
pub const NO_CHANGES: &str = "no changes";

/// Which audit trail the engine derives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum AuditMode {
    /// One record per changed leaf field
    #[default]
    FieldDiff,
    /// One whole-document record per event
    Snapshot,
}

/// Outcome reported back to the event host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationResult {
    /// Records were written
    Created { entries_created: usize },
    /// Nothing was written, and nothing went wrong
    NoChanges { message: String },
    /// The store failed; the event was not recorded
    Failed { error: String },
}

impl InvocationResult {
    fn no_changes(message: impl Into<String>) -> Self {
        Self::NoChanges {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    pub fn entries_created(&self) -> usize {
        match self {
            Self::Created { entries_created } => *entries_created,
            _ => 0,
        }
    }
}

impl From<EmitOutcome> for InvocationResult {
    fn from(outcome: EmitOutcome) -> Self {
        match outcome {
            EmitOutcome::Written(entries_created) => Self::Created { entries_created },
            EmitOutcome::NothingToLog => Self::no_changes(NO_CHANGES),
            EmitOutcome::Failed(error) => Self::Failed { error },
        }
    }
}

impl Serialize for InvocationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Created { entries_created } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("entriesCreated", entries_created)?;
                map.end()
            }
            Self::NoChanges { message } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("message", message)?;
                map.end()
            }
            Self::Failed { error } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}

/// Derives and persists the audit trail of change events
pub struct AuditEngine<S: AuditStore> {
    store: S,
    mode: AuditMode,
    settings: AuditSettings,
    gate: AuditGate,
}

impl<S: AuditStore> AuditEngine<S> {
    pub fn new(store: S, mode: AuditMode, settings: AuditSettings) -> Self {
        let gate = AuditGate::from_settings(mode, &settings);
        Self {
            store,
            mode,
            settings,
            gate,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn mode(&self) -> AuditMode {
        self.mode
    }

    /// Process one event, stamping records with the current time
    pub fn handle(&self, event: &ChangeEvent) -> InvocationResult {
        self.handle_at(event, Utc::now())
    }

    /// Process one event with an explicit record timestamp
    pub fn handle_at(&self, event: &ChangeEvent, timestamp: DateTime<Utc>) -> InvocationResult {
        if !self.gate.should_process(event) {
            return InvocationResult::no_changes("skipped audit collection");
        }

        let Some(operation) = event.operation() else {
            debug!(operation = %event.operation_type, "ignoring unsupported operation");
            return InvocationResult::no_changes("unsupported operation");
        };

        if !event.has_snapshot() {
            debug!(operation = %operation, "event carries no document snapshot");
            return InvocationResult::no_changes(NO_CHANGES);
        }

        let collection = resolve_collection_name(event);
        let document_id = resolve_document_id(event);

        match self.mode {
            AuditMode::FieldDiff => {
                let options = StrategyOptions {
                    excluded: &self.settings.excluded_fields,
                    max_depth: self.settings.max_depth,
                    missing_pre_image: self.settings.missing_pre_image,
                };
                let changes = select_changes(event, Some(operation), options);
                if changes.is_empty() {
                    debug!(
                        collection = %collection,
                        document_id = %document_id,
                        "no meaningful changes"
                    );
                    return InvocationResult::no_changes(NO_CHANGES);
                }

                let actor = resolve_actor(event, &self.settings.fallback_actor);
                AuditEmitter::new(&self.store)
                    .emit(
                        &self.gate.log_collection_for(&collection),
                        changes,
                        &document_id,
                        operation,
                        &actor,
                        timestamp,
                    )
                    .into()
            }
            AuditMode::Snapshot => {
                let record =
                    snapshot_record(event, operation, &collection, &document_id, timestamp);
                record_snapshot(&self.store, self.gate.snapshot_collection(), record).into()
            }
        }
    }
}
