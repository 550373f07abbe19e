//! Show CLI command
//!
//! Prints the records stored in one audit collection.

use clap::Args;

use crate::config::AuditPaths;
use crate::display::format_record_list;
use crate::error::AuditResult;
use crate::storage::JsonlAuditStore;

/// Arguments for `show`
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Audit collection name (e.g. `users_logs` or `audit_logs`)
    pub collection: String,

    /// Print records as JSON lines
    #[arg(long)]
    pub json: bool,
}

/// Handle the `show` command
pub fn handle_show_command(paths: &AuditPaths, args: ShowArgs) -> AuditResult<()> {
    let store = JsonlAuditStore::new(paths.logs_dir());
    let records = store.read_all(&args.collection)?;

    if args.json {
        for record in &records {
            println!("{}", serde_json::to_string(record)?);
        }
    } else {
        println!("{}", format_record_list(&records));
    }

    Ok(())
}
