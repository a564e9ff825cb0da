//! CLI command handlers
//!
//! Bridges the clap argument parsing with the service layer.

pub mod order;
pub mod undo;

pub use order::{handle_order_command, OrderCommands};
pub use undo::{handle_undo_command, UndoCommands};
