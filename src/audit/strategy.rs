//! Operation strategy selection
//!
//! Picks how the differ is driven for each kind of write: inserts expand the
//! post-image, deletes expand the pre-image, updates and replaces compare the
//! two. Events that cannot be interpreted produce no changes rather than an
//! error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::diff::{diff, FieldChange};
use crate::event::{ChangeEvent, OperationKind};

/// Handling of update/replace events whose pre-image was not retained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingPreImagePolicy {
    /// Record nothing for the event
    #[default]
    Skip,
    /// Record every meaningful field of the post-image as newly set
    CaptureAsInsert,
}

/// Options driving one strategy pass
#[derive(Debug, Clone, Copy)]
pub struct StrategyOptions<'a> {
    pub excluded: &'a [String],
    pub max_depth: usize,
    pub missing_pre_image: MissingPreImagePolicy,
}

/// Compute the field changes an event describes
pub fn select_changes(
    event: &ChangeEvent,
    kind: Option<OperationKind>,
    options: StrategyOptions<'_>,
) -> Vec<FieldChange> {
    let before = event.full_document_before_change.as_ref();
    let after = event.full_document.as_ref();

    let (old, new) = match kind {
        Some(OperationKind::Insert) => match after {
            Some(after) => (None, Some(after)),
            None => return Vec::new(),
        },
        Some(OperationKind::Delete) => match before {
            Some(before) => (Some(before), None),
            None => return Vec::new(),
        },
        Some(OperationKind::Update) | Some(OperationKind::Replace) => match (before, after) {
            (Some(before), Some(after)) => (Some(before), Some(after)),
            (None, Some(after)) => match options.missing_pre_image {
                MissingPreImagePolicy::Skip => {
                    debug!(operation = %event.operation_type, "no pre-image, skipping diff");
                    return Vec::new();
                }
                MissingPreImagePolicy::CaptureAsInsert => (None, Some(after)),
            },
            _ => return Vec::new(),
        },
        None => {
            debug!(operation = %event.operation_type, "unsupported operation, nothing to diff");
            return Vec::new();
        }
    };

    diff(old, new, "", options.excluded)
        .with_max_depth(options.max_depth)
        .collect()
}
