use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use change_audit::cli::{
    handle_diff_command, handle_process_command, handle_show_command, DiffArgs, ProcessArgs,
    ShowArgs,
};
use change_audit::config::{AuditPaths, AuditSettings};

#[derive(Parser)]
#[command(
    name = "change-audit",
    version,
    about = "Derive field-level audit trails from document change events",
    long_about = "change-audit turns insert, update, replace and delete events on \
                  document collections into an append-only audit trail, either one \
                  record per changed field or one before/after snapshot per event."
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run change events through the audit engine
    Process(ProcessArgs),

    /// Diff two JSON documents
    Diff(DiffArgs),

    /// Print the records of an audit collection
    Show(ShowArgs),

    /// Write default settings
    Init,

    /// Show current configuration and paths
    Config,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "change_audit=debug"
    } else {
        "change_audit=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = AuditPaths::new()?;
    let settings = AuditSettings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Process(args)) => {
            let summary = handle_process_command(&paths, &settings, args)?;
            if summary.failed > 0 {
                std::process::exit(2);
            }
        }
        Some(Commands::Diff(args)) => {
            handle_diff_command(&settings, args)?;
        }
        Some(Commands::Show(args)) => {
            handle_show_command(&paths, args)?;
        }
        Some(Commands::Init) => {
            println!("Initializing change-audit at: {}", paths.base_dir().display());
            settings.save(&paths)?;
            println!("Settings written to {}", paths.settings_file().display());
        }
        Some(Commands::Config) => {
            println!("change-audit Configuration");
            println!("==========================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Settings file:   {}", paths.settings_file().display());
            println!("Logs directory:  {}", paths.logs_dir().display());
            let initialized = if paths.is_initialized() {
                "yes"
            } else {
                "no (run 'change-audit init')"
            };
            println!("Initialized:     {}", initialized);
            println!();
            println!("Settings:");
            println!("  Excluded fields:     {}", settings.excluded_fields.join(", "));
            println!("  Log suffix:          {}", settings.log_collection_suffix);
            println!("  Snapshot collection: {}", settings.snapshot_collection);
            println!("  Fallback actor:      {}", settings.fallback_actor);
            println!("  Max depth:           {}", settings.max_depth);
            println!("  Missing pre-image:   {:?}", settings.missing_pre_image);
        }
        None => {
            println!("change-audit - field-level audit trails for document changes");
            println!();
            println!("Run 'change-audit --help' for usage information.");
        }
    }

    Ok(())
}
