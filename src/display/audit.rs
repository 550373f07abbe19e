//! Audit display formatting
//!
//! Formats values, field changes and stored records for the terminal.

use serde_json::Value;

use crate::audit::{AuditRecord, FieldChange};

/// Format a JSON value for human-readable display
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            // Truncate long strings
            if s.chars().count() > 50 {
                let head: String = s.chars().take(47).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

/// Format a list of field changes, one per line
pub fn format_change_list(changes: &[FieldChange]) -> String {
    if changes.is_empty() {
        return "No changes.".to_string();
    }

    let mut output = String::new();
    for change in changes {
        output.push_str(&change.to_string());
        output.push('\n');
    }
    output.push_str(&format!("\nTotal: {} changed fields", changes.len()));
    output
}

/// Format stored audit records, oldest first
pub fn format_record_list(records: &[AuditRecord]) -> String {
    if records.is_empty() {
        return "No audit records found.".to_string();
    }

    let mut output = String::new();
    for record in records {
        output.push_str(&record.format_human_readable());
        output.push('\n');
    }
    output.push_str(&format!("\nTotal: {} records", records.len()));
    output
}
