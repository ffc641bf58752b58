use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// One index as returned by the listing call.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    pub name: String,
    pub primary_size_bytes: f64,
    pub primary_shards: u64,
    pub replica_count: u64,
    pub creation_time: Option<DateTime<Utc>>,
    pub doc_count: Option<u64>,
}

impl IndexRecord {
    /// Primary shards plus all their replicas.
    pub fn total_shards(&self) -> u64 {
        self.primary_shards * (1 + self.replica_count)
    }

    pub fn creation_month(&self) -> Option<String> {
        self.creation_time
            .map(|time| time.format("%Y-%m").to_string())
    }

    pub fn creation_day(&self) -> Option<String> {
        self.creation_time
            .map(|time| time.format("%Y-%m-%d").to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleStatus {
    pub managed: bool,
    pub policy_name: Option<String>,
    pub phase: Option<String>,
}

impl LifecycleStatus {
    pub fn unmanaged() -> Self {
        Self::default()
    }

    /// Policy name of a managed index.
    pub fn managing_policy(&self) -> Option<&str> {
        self.policy_name.as_deref().filter(|_| self.managed)
    }
}

pub type PolicyDefinitions = HashMap<String, PolicyDefinition>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyDefinition {
    pub phases: HashMap<String, PhaseDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseDefinition {
    pub min_age: Option<String>,
    pub rollover: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn record(primary_shards: u64, replica_count: u64) -> IndexRecord {
        IndexRecord {
            name: "logs-000001".to_owned(),
            primary_size_bytes: 0.0,
            primary_shards,
            replica_count,
            creation_time: Some(Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap()),
            doc_count: None,
        }
    }

    #[test]
    fn total_shards_counts_replicas() {
        assert_eq!(record(3, 0).total_shards(), 3);
        assert_eq!(record(3, 1).total_shards(), 6);
        assert_eq!(record(2, 2).total_shards(), 6);
        assert_eq!(record(0, 5).total_shards(), 0);
    }

    #[test]
    fn creation_buckets() {
        let r = record(1, 0);
        assert_eq!(r.creation_month().as_deref(), Some("2024-03"));
        assert_eq!(r.creation_day().as_deref(), Some("2024-03-07"));

        let unknown = IndexRecord {
            creation_time: None,
            ..r
        };
        assert!(unknown.creation_month().is_none());
        assert!(unknown.creation_day().is_none());
    }

    #[test]
    fn managing_policy_requires_managed() {
        let status = LifecycleStatus {
            managed: false,
            policy_name: Some("logs".to_owned()),
            phase: None,
        };
        assert_eq!(status.managing_policy(), None);

        let status = LifecycleStatus {
            managed: true,
            ..status
        };
        assert_eq!(status.managing_policy(), Some("logs"));
        assert_eq!(LifecycleStatus::unmanaged().managing_policy(), None);
    }
}
