//! Audit settings
//!
//! Controls which fields are excluded from field-level diffs, how audit
//! collections are named, and how incomplete events are handled. Every field
//! has a serde default so older or partial config files keep loading.

use serde::{Deserialize, Serialize};

use super::paths::AuditPaths;
use crate::audit::{default_excluded_fields, MissingPreImagePolicy};
use crate::document::DEFAULT_MAX_DEPTH;
use crate::error::AuditError;
use crate::storage::file_io::{read_json, write_json_atomic};

/// Settings for the audit engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Top-level fields never recorded in field-level diffs
    #[serde(default = "default_excluded_fields")]
    pub excluded_fields: Vec<String>,

    /// Suffix appended to a source collection to name its diff log
    #[serde(default = "default_log_suffix")]
    pub log_collection_suffix: String,

    /// Collection receiving whole-document snapshots
    #[serde(default = "default_snapshot_collection")]
    pub snapshot_collection: String,

    /// Actor recorded when a document names nobody
    #[serde(default = "default_fallback_actor")]
    pub fallback_actor: String,

    /// How many object levels the differ descends
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// What to do with an update/replace that has no pre-image
    #[serde(default)]
    pub missing_pre_image: MissingPreImagePolicy,
}

fn default_schema_version() -> u32 {
    1
}

fn default_log_suffix() -> String {
    "_logs".to_string()
}

fn default_snapshot_collection() -> String {
    "audit_logs".to_string()
}

fn default_fallback_actor() -> String {
    "System".to_string()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            excluded_fields: default_excluded_fields(),
            log_collection_suffix: default_log_suffix(),
            snapshot_collection: default_snapshot_collection(),
            fallback_actor: default_fallback_actor(),
            max_depth: default_max_depth(),
            missing_pre_image: MissingPreImagePolicy::default(),
        }
    }
}

impl AuditSettings {
    /// Load settings from disk, or defaults if the file doesn't exist
    pub fn load_or_create(paths: &AuditPaths) -> Result<Self, AuditError> {
        let settings: Self = read_json(paths.settings_file())
            .map_err(|e| AuditError::Config(format!("Failed to load settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings under which audit writes would be audited again
    ///
    /// An empty suffix sends field diffs back into the source collection, and
    /// an empty snapshot collection name matches nothing the gate can refuse.
    pub fn validate(&self) -> Result<(), AuditError> {
        if self.log_collection_suffix.is_empty() {
            return Err(AuditError::Config(
                "log_collection_suffix must not be empty".into(),
            ));
        }
        if self.snapshot_collection.is_empty() {
            return Err(AuditError::Config(
                "snapshot_collection must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Save settings to disk
    pub fn save(&self, paths: &AuditPaths) -> Result<(), AuditError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = AuditSettings::default();
        assert_eq!(settings.excluded_fields, vec!["_id", "__v", "updatedAt"]);
        assert_eq!(settings.log_collection_suffix, "_logs");
        assert_eq!(settings.snapshot_collection, "audit_logs");
        assert_eq!(settings.fallback_actor, "System");
        assert_eq!(settings.missing_pre_image, MissingPreImagePolicy::Skip);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = AuditSettings::load_or_create(&paths).unwrap();
        assert_eq!(settings, AuditSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = AuditSettings::default();
        settings.fallback_actor = "trigger".into();
        settings.missing_pre_image = MissingPreImagePolicy::CaptureAsInsert;
        settings.save(&paths).unwrap();

        let loaded = AuditSettings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.fallback_actor, "trigger");
        assert_eq!(loaded.missing_pre_image, MissingPreImagePolicy::CaptureAsInsert);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(
            paths.settings_file(),
            r#"{"excluded_fields": ["_id"], "missing_pre_image": "capture-as-insert"}"#,
        )
        .unwrap();

        let loaded = AuditSettings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.excluded_fields, vec!["_id"]);
        assert_eq!(loaded.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(loaded.missing_pre_image, MissingPreImagePolicy::CaptureAsInsert);
    }

    #[test]
    fn test_empty_collection_names_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path().to_path_buf());

        std::fs::write(paths.settings_file(), r#"{"log_collection_suffix": ""}"#).unwrap();
        let err = AuditSettings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));
        assert!(err.to_string().contains("log_collection_suffix"));

        std::fs::write(paths.settings_file(), r#"{"snapshot_collection": ""}"#).unwrap();
        let err = AuditSettings::load_or_create(&paths).unwrap_err();
        assert!(err.to_string().contains("snapshot_collection"));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), "not json").unwrap();

        let err = AuditSettings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));
    }
}
