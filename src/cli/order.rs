//! Order CLI commands
//!
//! Mutates orders through the backing-up gateway so every update and delete
//! can be undone.

use clap::Subcommand;
use serde_json::Value;

use crate::audit::AuditLogger;
use crate::backup::UndoLog;
use crate::config::settings::Settings;
use crate::error::{UndoError, UndoResult};
use crate::services::{OrderChange, OrderService};
use crate::storage::Storage;

/// Order subcommands
#[derive(Subcommand)]
pub enum OrderCommands {
    /// Add an order from a JSON object
    Add {
        /// Order document, e.g. '{"_id": "A1", "name": "Alice"}'
        json: String,
    },

    /// List all orders
    List,

    /// Show a single order
    Show {
        /// Order id
        id: String,
    },

    /// Set fields on an order (backed up first)
    Update {
        /// Order id
        id: String,
        /// JSON object of fields to set
        json: String,
    },

    /// Delete an order (backed up first)
    Delete {
        /// Order id
        id: String,
    },
}

/// Handle an order command
pub fn handle_order_command(
    storage: &Storage,
    settings: &Settings,
    cmd: OrderCommands,
) -> UndoResult<()> {
    let undo = UndoLog::from_settings(storage, settings);
    let audit = AuditLogger::new(storage.paths().audit_log());
    let service = OrderService::new(&storage.orders, &undo, &audit);

    match cmd {
        OrderCommands::Add { json } => {
            let id = service.create(parse_json(&json)?)?;
            println!("Created order: {}", id);
        }

        OrderCommands::List => {
            let orders = service.list()?;
            if orders.is_empty() {
                println!("No orders found.");
                return Ok(());
            }
            for order in &orders {
                println!("{}", order);
            }
            println!();
            println!("Total: {} order(s)", orders.len());
        }

        OrderCommands::Show { id } => {
            let order = service
                .get(&id)?
                .ok_or_else(|| UndoError::order_not_found(&id))?;
            println!("{}", serde_json::to_string_pretty(&order)?);
        }

        OrderCommands::Update { id, json } => {
            let change = service.update(&id, parse_json(&json)?)?;
            println!("Updated order: {}", id);
            report_backup(&change);
        }

        OrderCommands::Delete { id } => {
            let change = service.delete(&id)?;
            println!("Deleted order: {}", id);
            report_backup(&change);
        }
    }

    Ok(())
}

fn parse_json(raw: &str) -> UndoResult<Value> {
    serde_json::from_str(raw).map_err(|e| UndoError::Validation(format!("Invalid JSON: {}", e)))
}

fn report_backup(change: &OrderChange) {
    match change.backup_id {
        Some(id) => println!("Backup recorded: {} (undo with 'order-undo undo restore')", id),
        None => eprintln!("WARNING: backing up the order failed; this change cannot be undone"),
    }
}
