//! Backup record identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of one undo-log record
///
/// Stored as the full UUID in the record's `_id`; displayed in the short
/// `bak-xxxxxxxx` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackupId(Uuid);

impl BackupId {
    /// A fresh random identifier, assigned when a record is appended
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for BackupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bak-{}", &self.0.simple().to_string()[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_display() {
        let id = BackupId::new();
        let display = id.to_string();
        assert!(display.starts_with("bak-"));
        assert_eq!(display.len(), 12);
        assert!(id.as_uuid().to_string().starts_with(&display[4..]));
    }

    #[test]
    fn test_serializes_as_plain_uuid() {
        let raw = "\"550e8400-e29b-41d4-a716-446655440000\"";
        let id: BackupId = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), raw);
        assert!(serde_json::from_str::<BackupId>("\"bak-550e8400\"").is_err());
    }
}
