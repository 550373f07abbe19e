//! Process CLI command
//!
//! Feeds change events from a file or stdin through the audit engine and
//! prints one result per event. Input is either a JSON array of events or
//! one event per line.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Args;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{AuditPaths, AuditSettings};
use crate::engine::{AuditEngine, AuditMode, InvocationResult};
use crate::error::{AuditError, AuditResult};
use crate::event::ChangeEvent;
use crate::storage::{AuditStore, JsonlAuditStore};

/// Arguments for `process`
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// File of change events (reads stdin when omitted)
    pub file: Option<PathBuf>,

    /// Audit trail to derive
    #[arg(short, long, value_enum, env = "CHANGE_AUDIT_MODE", default_value_t = AuditMode::FieldDiff)]
    pub mode: AuditMode,
}

/// Counts of how a batch of events was handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub events: usize,
    pub entries_created: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl ProcessSummary {
    fn record(&mut self, result: &InvocationResult) {
        self.events += 1;
        match result {
            InvocationResult::Created { entries_created } => {
                self.entries_created += entries_created
            }
            InvocationResult::NoChanges { .. } => self.unchanged += 1,
            InvocationResult::Failed { .. } => self.failed += 1,
        }
    }
}

/// Split raw input into individual event documents
///
/// A leading `[` means a JSON array; anything else is read line by line.
/// Lines that fail to parse are returned as errors in place.
pub fn parse_events(input: &str) -> AuditResult<Vec<Result<ChangeEvent, AuditError>>> {
    let trimmed = input.trim_start();

    if trimmed.starts_with('[') {
        let values: Vec<Value> = serde_json::from_str(trimmed)
            .map_err(|e| AuditError::InvalidEvent(format!("Failed to parse event array: {}", e)))?;
        return Ok(values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                serde_json::from_value(v)
                    .map_err(|e| AuditError::InvalidEvent(format!("event {}: {}", i + 1, e)))
            })
            .collect());
    }

    Ok(input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map_err(|e| AuditError::InvalidEvent(format!("line {}: {}", i + 1, e)))
        })
        .collect())
}

/// Run every event through the engine, writing one JSON result per line
pub fn process_events<S, W>(
    engine: &AuditEngine<S>,
    events: Vec<Result<ChangeEvent, AuditError>>,
    out: &mut W,
) -> AuditResult<ProcessSummary>
where
    S: AuditStore,
    W: Write,
{
    let mut summary = ProcessSummary::default();

    for event in events {
        let result = match event {
            Ok(event) => engine.handle(&event),
            Err(e) => {
                warn!(error = %e, "skipping unreadable change event");
                InvocationResult::Failed {
                    error: e.to_string(),
                }
            }
        };

        summary.record(&result);
        serde_json::to_writer(&mut *out, &result)?;
        writeln!(out)?;
    }

    Ok(summary)
}

/// Handle the `process` command
pub fn handle_process_command(
    paths: &AuditPaths,
    settings: &AuditSettings,
    args: ProcessArgs,
) -> AuditResult<ProcessSummary> {
    let input = match &args.file {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            AuditError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    paths.ensure_directories()?;
    let store = JsonlAuditStore::new(paths.logs_dir());
    let engine = AuditEngine::new(store, args.mode, settings.clone());
    debug!(
        mode = ?engine.mode(),
        logs_dir = %engine.store().dir().display(),
        "audit engine ready"
    );

    let events = parse_events(&input)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = process_events(&engine, events, &mut out)?;

    info!(
        events = summary.events,
        entries_created = summary.entries_created,
        unchanged = summary.unchanged,
        failed = summary.failed,
        "processing complete"
    );

    Ok(summary)
}
