//! CLI command handlers
//!
//! Bridges clap argument parsing with the audit engine and stores.

pub mod diff;
pub mod process;
pub mod show;

pub use diff::{handle_diff_command, DiffArgs};
pub use process::{handle_process_command, ProcessArgs, ProcessSummary};
pub use show::{handle_show_command, ShowArgs};
