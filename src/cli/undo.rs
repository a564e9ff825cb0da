//! Undo CLI commands
//!
//! Administrative commands for inspecting, restoring and clearing the undo
//! log.

use clap::Subcommand;

use crate::audit::{AuditLogger, Operation};
use crate::backup::UndoLog;
use crate::config::settings::Settings;
use crate::display::{format_backup_details, format_backup_list};
use crate::error::UndoResult;
use crate::services::AdminService;
use crate::storage::Storage;

/// Undo subcommands
#[derive(Subcommand)]
pub enum UndoCommands {
    /// Show how many backups are retained
    Count,

    /// Show the most recent backup without restoring it
    Peek,

    /// List retained backups, newest first
    List {
        /// Maximum number of backups to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Undo the most recent recorded order mutation
    Restore {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Delete every backup (irreversible)
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show recent audit entries
    History {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Only show entries of this operation
        #[arg(short, long, value_enum)]
        operation: Option<Operation>,
    },
}

/// Handle an undo command
pub fn handle_undo_command(
    storage: &Storage,
    settings: &Settings,
    cmd: UndoCommands,
) -> UndoResult<()> {
    let undo = UndoLog::from_settings(storage, settings);
    let audit = AuditLogger::new(storage.paths().audit_log());
    let admin = AdminService::new(&undo, &audit);

    match cmd {
        UndoCommands::Count => {
            let count = admin.count()?;
            println!("Backups: {} (max {})", count, undo.retention().max_depth());
        }

        UndoCommands::Peek => {
            let record = undo.peek_latest()?;
            println!("{}", format_backup_details(&record));
        }

        UndoCommands::List { limit } => {
            let records = undo.list_backups(limit)?;
            println!("{}", format_backup_list(&records));
        }

        UndoCommands::Restore { force } => {
            if !force {
                let record = undo.peek_latest()?;
                println!("Next Restore");
                println!("============");
                println!("{}", format_backup_details(&record));
                println!();
                println!("To restore this backup, run again with --force flag:");
                println!("  order-undo undo restore --force");
                return Ok(());
            }

            let outcome = admin.restore()?;
            println!("Restore complete!");
            println!("{}", outcome.summary());
            if let Some(id) = &outcome.restored_document_id {
                println!("Restored document id: {}", id);
            }
            if let Some(warning) = &outcome.cleanup_warning {
                eprintln!();
                eprintln!("WARNING: {}", warning);
            }
        }

        UndoCommands::Clear { force } => {
            let count = admin.count()?;
            if count == 0 {
                println!("No backups to clear.");
                return Ok(());
            }

            if !force {
                println!("This will permanently delete {} backup(s).", count);
                println!("To proceed, run again with --force flag:");
                println!("  order-undo undo clear --force");
                return Ok(());
            }

            let deleted = admin.clear()?;
            println!("Deleted {} backup(s).", deleted);
        }

        UndoCommands::History { limit, operation } => {
            let entries = audit.read_recent(limit, operation)?;
            if entries.is_empty() {
                println!("No audit entries found.");
                return Ok(());
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
    }

    Ok(())
}
