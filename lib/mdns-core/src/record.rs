//! Records handed to the mDNS advertiser

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the advertiser should do with a record.
///
/// `Updated` exists for completeness; controllers split an update into
/// `Deleted` followed by `Added` and never emit it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Added,
    Updated,
    Deleted,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Added => "added",
            Action::Updated => "updated",
            Action::Deleted => "deleted",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hostname-to-address advertisement change
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Watcher kind that produced the record (e.g., "ingress")
    pub source_type: String,
    pub action: Action,
    /// Canonical hostname without the `.local` suffix, never empty
    pub name: String,
    pub namespace: String,
    /// Addresses snapshotted when the producing controller was built
    pub ips: Vec<String>,
}

impl Record {
    /// Same record with a different action
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Whether the record carries at least one address to publish
    pub fn has_addresses(&self) -> bool {
        !self.ips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record {
            source_type: "ingress".to_string(),
            action: Action::Added,
            name: "whoami".to_string(),
            namespace: "apps".to_string(),
            ips: vec!["10.0.0.1".to_string()],
        }
    }

    #[test]
    fn test_with_action() {
        let deleted = record().with_action(Action::Deleted);
        assert_eq!(deleted.action, Action::Deleted);
        assert_eq!(deleted.name, "whoami");
    }

    #[test]
    fn test_has_addresses() {
        assert!(record().has_addresses());
        let empty = Record { ips: vec![], ..record() };
        assert!(!empty.has_addresses());
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(record()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "sourceType": "ingress",
                "action": "added",
                "name": "whoami",
                "namespace": "apps",
                "ips": ["10.0.0.1"]
            })
        );
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Added.to_string(), "added");
        assert_eq!(Action::Deleted.to_string(), "deleted");
        assert_eq!(Action::Updated.to_string(), "updated");
    }
}
