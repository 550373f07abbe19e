//! Configuration module for change-audit
//!
//! - XDG-compliant path resolution
//! - Audit settings persistence

pub mod paths;
pub mod settings;

pub use paths::AuditPaths;
pub use settings::AuditSettings;
