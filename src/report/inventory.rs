//! Flat per-index listing of lifecycle managed indices.

use serde::Serialize;

use crate::{report::aggregate::ManagedIndex, size::format_size};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryEntry {
    pub index: String,
    pub policy: String,
    pub phase: String,
    pub size: String,
    pub size_bytes: f64,
    pub creation_date: String,
    pub doc_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryCsvRow {
    #[serde(rename = "Index")]
    pub index: String,
    #[serde(rename = "Policy")]
    pub policy: String,
    #[serde(rename = "Phase")]
    pub phase: String,
    #[serde(rename = "Size")]
    pub size: String,
    #[serde(rename = "Size (Bytes)")]
    pub size_bytes: f64,
    #[serde(rename = "Creation Date")]
    pub creation_date: String,
    #[serde(rename = "Document Count")]
    pub doc_count: u64,
}

/// Entries in listing order.
pub fn inventory(managed: Vec<ManagedIndex>) -> Vec<InventoryEntry> {
    managed
        .into_iter()
        .map(|m| InventoryEntry {
            size: format_size(m.record.primary_size_bytes),
            size_bytes: m.record.primary_size_bytes,
            creation_date: m
                .record
                .creation_day()
                .unwrap_or_else(|| "unknown".to_owned()),
            doc_count: m.record.doc_count.unwrap_or(0),
            index: m.record.name,
            policy: m.policy,
            phase: m.phase,
        })
        .collect()
}

pub fn inventory_csv_rows(entries: &[InventoryEntry]) -> Vec<InventoryCsvRow> {
    entries
        .iter()
        .cloned()
        .map(|entry| InventoryCsvRow {
            index: entry.index,
            policy: entry.policy,
            phase: entry.phase,
            size: entry.size,
            size_bytes: entry.size_bytes,
            creation_date: entry.creation_date,
            doc_count: entry.doc_count,
        })
        .collect()
}
