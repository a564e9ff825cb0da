//! Backup display formatting
//!
//! Formats undo-log records for terminal output in table and detail views.

use chrono::Utc;

use crate::models::BackupRecord;

/// Format backups (newest first) as a table
pub fn format_backup_list(records: &[BackupRecord]) -> String {
    if records.is_empty() {
        return "No backups found.".to_string();
    }

    let order_width = records
        .iter()
        .map(|r| r.order_id.len())
        .max()
        .unwrap_or(5)
        .max(5);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<3}  {:<12}  {:<order_width$}  {:<6}  {:>6}  {}\n",
        "#",
        "Backup",
        "Order",
        "Action",
        "Age",
        "Description",
        order_width = order_width,
    ));
    output.push_str(&format!(
        "{:-<3}  {:-<12}  {:-<order_width$}  {:-<6}  {:->6}  {:-<11}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        order_width = order_width,
    ));

    for (i, record) in records.iter().enumerate() {
        output.push_str(&format!(
            "{:<3}  {:<12}  {:<order_width$}  {:<6}  {:>6}  {}\n",
            i + 1,
            record.id.to_string(),
            record.order_id,
            record.action.to_string(),
            format_age(record),
            record.description,
            order_width = order_width,
        ));
    }

    output.push_str(&format!("\nTotal: {} backup(s)", records.len()));
    output
}

/// Format a single backup with its snapshots
pub fn format_backup_details(record: &BackupRecord) -> String {
    let mut output = String::new();
    output.push_str(&format!("Backup:      {}\n", record.id.as_uuid()));
    output.push_str(&format!("Order:       {}\n", record.order_id));
    output.push_str(&format!("Action:      {}\n", record.action));
    output.push_str(&format!(
        "Created:     {} ({} ago)\n",
        record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        format_age(record)
    ));
    output.push_str(&format!("Description: {}\n", record.description));
    output.push_str("\nPrevious data:\n");
    output.push_str(&pretty(&record.previous_data));
    if let Some(new_data) = &record.new_data {
        output.push_str("\n\nNew data:\n");
        output.push_str(&pretty(new_data));
    }
    output
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Age of a record in human-readable form
fn format_age(record: &BackupRecord) -> String {
    let total_seconds = Utc::now()
        .signed_duration_since(record.timestamp)
        .num_seconds()
        .max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    format!("{}d", hours / 24)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BackupId, MutationAction};
    use serde_json::json;

    fn record(minutes_ago: i64) -> BackupRecord {
        BackupRecord {
            id: BackupId::new(),
            order_id: "A1".to_string(),
            action: MutationAction::Delete,
            previous_data: json!({"name": "Alice"}),
            new_data: None,
            timestamp: Utc::now() - chrono::Duration::minutes(minutes_ago),
            description: "delete order A1".to_string(),
        }
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_backup_list(&[]), "No backups found.");
    }

    #[test]
    fn test_list_rows() {
        let output = format_backup_list(&[record(5), record(180)]);
        assert!(output.contains("delete order A1"));
        assert!(output.contains("5m"));
        assert!(output.contains("3h"));
        assert!(output.ends_with("Total: 2 backup(s)"));
    }

    #[test]
    fn test_details_include_snapshot() {
        let output = format_backup_details(&record(0));
        assert!(output.contains("Action:      delete"));
        assert!(output.contains("\"name\": \"Alice\""));
        assert!(!output.contains("New data"));
    }
}
