//! Backup record model
//!
//! A backup record is a write-once snapshot of an order taken immediately
//! before an update or delete is applied to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ids::BackupId;
use crate::error::{UndoError, UndoResult};

/// Which kind of mutation a backup protects against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationAction {
    Update,
    Delete,
}

impl std::fmt::Display for MutationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MutationAction::Update => write!(f, "update"),
            MutationAction::Delete => write!(f, "delete"),
        }
    }
}

/// A backup that has not been appended to the store yet
///
/// Carries no identifier: the store assigns one on append.
#[derive(Debug, Clone, Serialize)]
pub struct NewBackup {
    pub order_id: String,
    pub action: MutationAction,
    pub previous_data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_data: Option<Value>,
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

impl NewBackup {
    /// Build a backup stamped with the current time
    ///
    /// `previous_data` is required; a missing or `null` snapshot is rejected.
    pub fn new(
        order_id: impl Into<String>,
        action: MutationAction,
        previous_data: Option<Value>,
        new_data: Option<Value>,
        description: Option<String>,
    ) -> UndoResult<Self> {
        let order_id = order_id.into();
        if order_id.trim().is_empty() {
            return Err(UndoError::Validation("Order id cannot be empty".into()));
        }

        let previous_data = match previous_data {
            Some(Value::Null) | None => {
                return Err(UndoError::Validation(
                    "A backup requires the order's previous data".into(),
                ))
            }
            Some(data) => data,
        };

        let description = description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("{} order {}", action, order_id));

        Ok(Self {
            order_id,
            action,
            previous_data,
            new_data: new_data.filter(|d| !d.is_null()),
            timestamp: Utc::now(),
            description,
        })
    }
}

/// A stored backup record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    #[serde(rename = "_id")]
    pub id: BackupId,
    pub order_id: String,
    pub action: MutationAction,
    pub previous_data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_data: Option<Value>,
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
}

/// Fixed-width RFC 3339 timestamps
///
/// Stores sort documents by comparing field values, so every timestamp is
/// written with nanosecond precision to keep lexical and time order equal.
pub(crate) mod timestamp_format {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(timestamp))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    pub fn format(timestamp: &DateTime<Utc>) -> String {
        timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_missing_previous_data_rejected() {
        let err = NewBackup::new("A1", MutationAction::Update, None, None, None).unwrap_err();
        assert!(err.is_validation());

        let err = NewBackup::new("A1", MutationAction::Delete, Some(Value::Null), None, None)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_default_description() {
        let backup = NewBackup::new(
            "A1",
            MutationAction::Delete,
            Some(json!({"name": "Alice"})),
            None,
            None,
        )
        .unwrap();
        assert_eq!(backup.description, "delete order A1");
        assert!(backup.new_data.is_none());
    }

    #[test]
    fn test_action_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MutationAction::Update).unwrap(),
            "\"update\""
        );
        let action: MutationAction = serde_json::from_str("\"delete\"").unwrap();
        assert_eq!(action, MutationAction::Delete);
    }

    #[test]
    fn test_timestamps_sort_lexically() {
        let whole = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let later = whole + chrono::Duration::nanoseconds(100);

        let a = timestamp_format::format(&whole);
        let b = timestamp_format::format(&later);
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[test]
    fn test_record_reads_store_document() {
        let doc = json!({
            "_id": "550e8400-e29b-41d4-a716-446655440000",
            "order_id": "A1",
            "action": "update",
            "previous_data": {"total": 10},
            "timestamp": "2025-01-01T12:00:00.000000000Z",
            "description": "price fix"
        });

        let record: BackupRecord = serde_json::from_value(doc).unwrap();
        assert_eq!(record.order_id, "A1");
        assert_eq!(record.action, MutationAction::Update);
        assert!(record.new_data.is_none());
    }
}
