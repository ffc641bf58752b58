use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;

use crate::{
    model::{IndexRecord, LifecycleStatus},
    report::settings::PolicySettings,
};

pub const UNKNOWN_PHASE: &str = "unknown";

/// An index joined with the lifecycle policy managing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedIndex {
    pub record: IndexRecord,
    pub policy: String,
    pub phase: String,
}

/// Keep indices strictly below the threshold.
pub fn filter_below_threshold(records: Vec<IndexRecord>, threshold_bytes: f64) -> Vec<IndexRecord> {
    records
        .into_iter()
        .filter(|record| record.primary_size_bytes < threshold_bytes)
        .collect()
}

/// Join records with their lifecycle status, dropping unmanaged and unknown indices.
pub fn enrich(
    records: Vec<IndexRecord>,
    statuses: &HashMap<String, LifecycleStatus>,
) -> Vec<ManagedIndex> {
    records
        .into_iter()
        .filter_map(|record| {
            let status = statuses.get(&record.name)?;
            let policy = status.managing_policy()?.to_owned();
            let phase = status
                .phase
                .clone()
                .unwrap_or_else(|| UNKNOWN_PHASE.to_owned());

            Some(ManagedIndex {
                record,
                policy,
                phase,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub num_indices: u64,
    pub total_shards: u64,
    pub total_size_bytes: f64,
    pub total_docs: u64,
}

impl Totals {
    pub fn add(&mut self, record: &IndexRecord) {
        self.num_indices += 1;
        self.total_shards += record.total_shards();
        self.total_size_bytes += record.primary_size_bytes;
        self.total_docs += record.doc_count.unwrap_or(0);
    }

    fn of<'a>(records: impl IntoIterator<Item = &'a IndexRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut totals, record| {
            totals.add(record);
            totals
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeBucket {
    pub num_indices: u64,
    pub size_bytes: f64,
}

impl TimeBucket {
    pub fn add(&mut self, record: &IndexRecord) {
        self.num_indices += 1;
        self.size_bytes += record.primary_size_bytes;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseGroup {
    pub totals: Totals,
    pub members: Vec<IndexRecord>,
}

impl PhaseGroup {
    fn new(members: Vec<IndexRecord>) -> Self {
        Self {
            totals: Totals::of(&members),
            members,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolicyGroup {
    pub totals: Totals,
    pub phases: BTreeMap<String, PhaseGroup>,
    /// Keyed by `YYYY-MM`.
    pub monthly: BTreeMap<String, TimeBucket>,
    /// Keyed by `YYYY-MM-DD`.
    pub daily: BTreeMap<String, TimeBucket>,
    /// Filled in from the policy definitions, see [`crate::report::settings`].
    pub settings: Option<PolicySettings>,
}

impl PolicyGroup {
    fn new(members: Vec<ManagedIndex>) -> Self {
        let totals = Totals::of(members.iter().map(|m| &m.record));
        let monthly = time_buckets(&members, IndexRecord::creation_month);
        let daily = time_buckets(&members, IndexRecord::creation_day);
        let phases = members
            .into_iter()
            .map(|m| (m.phase, m.record))
            .into_group_map()
            .into_iter()
            .map(|(phase, records)| (phase, PhaseGroup::new(records)))
            .collect();

        Self {
            totals,
            phases,
            monthly,
            daily,
            settings: None,
        }
    }
}

pub type PolicyGroups = BTreeMap<String, PolicyGroup>;

pub fn group_by_policy(managed: Vec<ManagedIndex>) -> PolicyGroups {
    managed
        .into_iter()
        .fold(BTreeMap::<String, Vec<ManagedIndex>>::new(), |mut groups, m| {
            groups.entry(m.policy.clone()).or_default().push(m);
            groups
        })
        .into_iter()
        .map(|(policy, members)| (policy, PolicyGroup::new(members)))
        .collect()
}

// Records without a creation time are left out.
fn time_buckets(
    members: &[ManagedIndex],
    key: fn(&IndexRecord) -> Option<String>,
) -> BTreeMap<String, TimeBucket> {
    members
        .iter()
        .filter_map(|m| key(&m.record).map(|bucket| (bucket, &m.record)))
        .fold(BTreeMap::new(), |mut buckets, (bucket, record)| {
            buckets
                .entry(bucket)
                .or_insert_with(TimeBucket::default)
                .add(record);
            buckets
        })
}
