//! Diff CLI command
//!
//! Compares two JSON documents on disk with the same rules the engine uses
//! for update events.

use std::path::PathBuf;

use clap::Args;

use crate::audit::{diff, FieldChange};
use crate::config::AuditSettings;
use crate::display::format_change_list;
use crate::document::Document;
use crate::error::AuditResult;
use crate::storage::read_json_required;

/// Arguments for `diff`
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Document before the change (a file containing `null` means none)
    pub old: PathBuf,

    /// Document after the change (a file containing `null` means none)
    pub new: PathBuf,

    /// Also compare fields that are normally excluded
    #[arg(long)]
    pub all_fields: bool,

    /// Print changes as a JSON array
    #[arg(long)]
    pub json: bool,
}

/// Compute the changes between two optional documents using the settings
pub fn diff_documents(
    old: Option<&Document>,
    new: Option<&Document>,
    settings: &AuditSettings,
    all_fields: bool,
) -> Vec<FieldChange> {
    let excluded: &[String] = if all_fields {
        &[]
    } else {
        &settings.excluded_fields
    };

    diff(old, new, "", excluded)
        .with_max_depth(settings.max_depth)
        .collect()
}

/// Handle the `diff` command
pub fn handle_diff_command(settings: &AuditSettings, args: DiffArgs) -> AuditResult<()> {
    let old: Option<Document> = read_json_required(&args.old)?;
    let new: Option<Document> = read_json_required(&args.new)?;

    let changes = diff_documents(old.as_ref(), new.as_ref(), settings, args.all_fields);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&changes)?);
    } else {
        println!("{}", format_change_list(&changes));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_excluded_fields_respected() {
        let old = json!({"_id": 1, "name": "a"});
        let new = json!({"_id": 2, "name": "b"});
        let settings = AuditSettings::default();

        let changes = diff_documents(old.as_object(), new.as_object(), &settings, false);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "name");

        let changes = diff_documents(old.as_object(), new.as_object(), &settings, true);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].path, "_id");
    }
}
