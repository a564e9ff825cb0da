//! Display formatting for terminal output

pub mod backup;

pub use backup::{format_backup_details, format_backup_list};
