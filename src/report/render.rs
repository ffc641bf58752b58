use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, Write},
    path::Path,
};

use error_stack::{IntoReport, ResultExt};
use serde::Serialize;
use thiserror::Error;

use crate::{
    model::IndexRecord,
    report::{
        aggregate::{PhaseGroup, PolicyGroup, PolicyGroups, TimeBucket, Totals},
        settings::PolicySettings,
    },
    size::format_size,
};

const NO_SETTINGS: &str = "No settings retrieved";
const UNKNOWN_DATE: &str = "unknown";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("serialize json")]
    Json,
    #[error("write csv")]
    Csv,
    #[error("output io error")]
    Io,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub include_doc_counts: bool,
}

pub type PolicyReport = BTreeMap<String, PolicySummary>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicySummary {
    pub num_indices: u64,
    pub total_shards: u64,
    pub total_size: String,
    pub total_size_bytes: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_docs: Option<u64>,
    pub phases: BTreeMap<String, PhaseSummary>,
    pub monthly_breakdown: BTreeMap<String, BucketSummary>,
    pub daily_breakdown: BTreeMap<String, BucketSummary>,
    pub phase_settings: PolicySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseSummary {
    pub num_indices: u64,
    pub total_shards: u64,
    pub total_size: String,
    pub total_size_bytes: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_docs: Option<u64>,
    pub indices: Vec<IndexSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSummary {
    pub name: String,
    pub size: String,
    pub shards: u64,
    pub creation_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub num_indices: u64,
    pub size: String,
    pub size_bytes: f64,
}

pub fn policy_report(groups: &PolicyGroups, options: RenderOptions) -> PolicyReport {
    groups
        .iter()
        .map(|(policy, group)| (policy.clone(), policy_summary(group, options)))
        .collect()
}

fn policy_summary(group: &PolicyGroup, options: RenderOptions) -> PolicySummary {
    let Totals {
        num_indices,
        total_shards,
        total_size_bytes,
        total_docs,
    } = group.totals;

    PolicySummary {
        num_indices,
        total_shards,
        total_size: format_size(total_size_bytes),
        total_size_bytes,
        total_docs: options.include_doc_counts.then_some(total_docs),
        phases: group
            .phases
            .iter()
            .map(|(phase, p)| (phase.clone(), phase_summary(p, options)))
            .collect(),
        monthly_breakdown: buckets(&group.monthly),
        daily_breakdown: buckets(&group.daily),
        phase_settings: group.settings.clone().unwrap_or_else(|| PolicySettings::Error {
            error: NO_SETTINGS.to_owned(),
        }),
    }
}

fn phase_summary(phase: &PhaseGroup, options: RenderOptions) -> PhaseSummary {
    PhaseSummary {
        num_indices: phase.totals.num_indices,
        total_shards: phase.totals.total_shards,
        total_size: format_size(phase.totals.total_size_bytes),
        total_size_bytes: phase.totals.total_size_bytes,
        total_docs: options
            .include_doc_counts
            .then_some(phase.totals.total_docs),
        indices: phase
            .members
            .iter()
            .map(|record| index_summary(record, options))
            .collect(),
    }
}

fn index_summary(record: &IndexRecord, options: RenderOptions) -> IndexSummary {
    IndexSummary {
        name: record.name.clone(),
        size: format_size(record.primary_size_bytes),
        shards: record.total_shards(),
        creation_date: record
            .creation_day()
            .unwrap_or_else(|| UNKNOWN_DATE.to_owned()),
        doc_count: record.doc_count.filter(|_| options.include_doc_counts),
    }
}

fn buckets(buckets: &BTreeMap<String, TimeBucket>) -> BTreeMap<String, BucketSummary> {
    buckets
        .iter()
        .map(|(key, bucket)| {
            let summary = BucketSummary {
                num_indices: bucket.num_indices,
                size: format_size(bucket.size_bytes),
                size_bytes: bucket.size_bytes,
            };
            (key.clone(), summary)
        })
        .collect()
}

/// One row of the flattened policy table. Each row carries a single fact,
/// columns belonging to other kinds of rows stay empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolicyCsvRow {
    #[serde(rename = "Policy")]
    pub policy: String,
    #[serde(rename = "Num Indices")]
    pub num_indices: Option<u64>,
    #[serde(rename = "Total Shards")]
    pub total_shards: Option<u64>,
    #[serde(rename = "Total Size")]
    pub total_size: Option<String>,
    #[serde(rename = "Total Size (Bytes)")]
    pub total_size_bytes: Option<f64>,
    #[serde(rename = "Phase")]
    pub phase: Option<String>,
    #[serde(rename = "Phase Num Indices")]
    pub phase_num_indices: Option<u64>,
    #[serde(rename = "Phase Lifetime")]
    pub phase_lifetime: Option<String>,
    #[serde(rename = "Phase Rollover")]
    pub phase_rollover: Option<String>,
    #[serde(rename = "Month")]
    pub month: Option<String>,
    #[serde(rename = "Month Num Indices")]
    pub month_num_indices: Option<u64>,
    #[serde(rename = "Month Size")]
    pub month_size: Option<String>,
    #[serde(rename = "Month Size (Bytes)")]
    pub month_size_bytes: Option<f64>,
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Date Num Indices")]
    pub date_num_indices: Option<u64>,
    #[serde(rename = "Date Size")]
    pub date_size: Option<String>,
    #[serde(rename = "Date Size (Bytes)")]
    pub date_size_bytes: Option<f64>,
}

/// Flatten an already rendered report into table rows.
pub fn policy_csv_rows(report: &PolicyReport) -> Vec<PolicyCsvRow> {
    let mut rows = Vec::new();

    for (policy, summary) in report {
        let row = || PolicyCsvRow {
            policy: policy.clone(),
            ..Default::default()
        };

        rows.push(PolicyCsvRow {
            num_indices: Some(summary.num_indices),
            total_shards: Some(summary.total_shards),
            total_size: Some(summary.total_size.clone()),
            total_size_bytes: Some(summary.total_size_bytes),
            ..row()
        });

        match &summary.phase_settings {
            PolicySettings::Phases(phases) => {
                rows.extend(phases.iter().map(|(phase, setting)| PolicyCsvRow {
                    phase: Some(phase.clone()),
                    phase_num_indices: Some(setting.num_indices),
                    phase_lifetime: Some(setting.lifetime.clone()),
                    phase_rollover: Some(setting.rollover.to_cell()),
                    ..row()
                }));
            }
            PolicySettings::Note { note: message } | PolicySettings::Error { error: message } => {
                rows.push(PolicyCsvRow {
                    phase_rollover: Some(message.clone()),
                    ..row()
                });
            }
        }

        rows.extend(
            summary
                .monthly_breakdown
                .iter()
                .map(|(month, bucket)| PolicyCsvRow {
                    month: Some(month.clone()),
                    month_num_indices: Some(bucket.num_indices),
                    month_size: Some(bucket.size.clone()),
                    month_size_bytes: Some(bucket.size_bytes),
                    ..row()
                }),
        );

        rows.extend(
            summary
                .daily_breakdown
                .iter()
                .map(|(date, bucket)| PolicyCsvRow {
                    date: Some(date.clone()),
                    date_num_indices: Some(bucket.num_indices),
                    date_size: Some(bucket.size.clone()),
                    date_size_bytes: Some(bucket.size_bytes),
                    ..row()
                }),
        );
    }

    rows
}

pub fn write_json<T: Serialize>(
    mut writer: impl Write,
    value: &T,
) -> error_stack::Result<(), RenderError> {
    serde_json::to_writer_pretty(&mut writer, value)
        .into_report()
        .change_context(RenderError::Json)?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .into_report()
        .change_context(RenderError::Io)
}

pub fn write_csv<T: Serialize>(
    writer: impl Write,
    rows: &[T],
) -> error_stack::Result<(), RenderError> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)
            .into_report()
            .change_context(RenderError::Csv)?;
    }
    csv.flush().into_report().change_context(RenderError::Io)
}

pub fn write_json_file<T: Serialize>(
    path: &Path,
    value: &T,
) -> error_stack::Result<(), RenderError> {
    create_file(path)
        .and_then(|file| write_json(io::BufWriter::new(file), value))
        .attach_printable_lazy(|| format!("path: {}", path.display()))
}

pub fn write_csv_file<T: Serialize>(
    path: &Path,
    rows: &[T],
) -> error_stack::Result<(), RenderError> {
    create_file(path)
        .and_then(|file| write_csv(io::BufWriter::new(file), rows))
        .attach_printable_lazy(|| format!("path: {}", path.display()))
}

fn create_file(path: &Path) -> error_stack::Result<File, RenderError> {
    File::create(path)
        .into_report()
        .change_context(RenderError::Io)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use crate::{
        model::{PhaseDefinition, PolicyDefinition},
        report::{
            aggregate::{
                group_by_policy,
                tests::{record, MB},
                ManagedIndex,
            },
            settings::attach_policy_definitions,
        },
    };

    fn report(options: RenderOptions) -> PolicyReport {
        let member = |name: &str, phase: &str, created| ManagedIndex {
            record: record(name, 512.0 * MB, created),
            policy: "logs".to_owned(),
            phase: phase.to_owned(),
        };
        let mut groups = group_by_policy(vec![
            member("logs-1", "hot", Some((2024, 1, 5))),
            member("logs-2", "warm", Some((2024, 2, 10))),
            member("logs-3", "warm", None),
        ]);
        let definitions = HashMap::from([(
            "logs".to_owned(),
            PolicyDefinition {
                phases: HashMap::from([(
                    "hot".to_owned(),
                    PhaseDefinition {
                        min_age: Some("0ms".to_owned()),
                        rollover: Some(json!({"max_age": "1d"})),
                    },
                )]),
            },
        )]);
        attach_policy_definitions(&mut groups, &definitions);
        policy_report(&groups, options)
    }

    #[test]
    fn json_shape() {
        let value = serde_json::to_value(report(RenderOptions::default())).unwrap();
        let logs = &value["logs"];

        assert_eq!(logs["num_indices"], json!(3));
        assert_eq!(logs["total_shards"], json!(6));
        assert_eq!(logs["total_size"], json!("1.50GB"));
        assert_eq!(logs["phases"]["warm"]["num_indices"], json!(2));
        assert_eq!(
            logs["phases"]["hot"]["indices"][0],
            json!({"name": "logs-1", "size": "512.00MB", "shards": 2, "creation_date": "2024-01-05"})
        );
        assert_eq!(
            logs["phases"]["warm"]["indices"][1]["creation_date"],
            json!("unknown")
        );
        assert_eq!(
            logs["monthly_breakdown"]["2024-02"],
            json!({"num_indices": 1, "size": "512.00MB", "size_bytes": 512.0 * MB})
        );
        assert!(logs["daily_breakdown"]["2024-01-05"].is_object());
        assert_eq!(logs["phase_settings"]["hot"]["lifetime"], json!("0ms"));
        assert!(logs.get("total_docs").is_none());
    }

    #[test]
    fn doc_counts_are_optional() {
        let value = serde_json::to_value(report(RenderOptions {
            include_doc_counts: true,
        }))
        .unwrap();
        assert_eq!(value["logs"]["total_docs"], json!(30));
        assert_eq!(value["logs"]["phases"]["hot"]["indices"][0]["doc_count"], json!(10));
    }

    #[test]
    fn missing_settings_render_as_error() {
        let groups = group_by_policy(vec![ManagedIndex {
            record: record("a", 1.0, None),
            policy: "p".to_owned(),
            phase: "hot".to_owned(),
        }]);
        let value = serde_json::to_value(policy_report(&groups, RenderOptions::default())).unwrap();
        assert_eq!(value["p"]["phase_settings"], json!({"error": NO_SETTINGS}));
    }

    #[test]
    fn csv_row_kinds() {
        let rows = policy_csv_rows(&report(RenderOptions::default()));

        // summary, one phase setting, two months, two days
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|row| row.policy == "logs"));

        assert_eq!(rows[0].num_indices, Some(3));
        assert!(rows[0].phase.is_none() && rows[0].month.is_none());

        assert_eq!(rows[1].phase.as_deref(), Some("hot"));
        assert_eq!(rows[1].phase_num_indices, Some(1));
        assert_eq!(rows[1].phase_rollover.as_deref(), Some(r#"{"max_age":"1d"}"#));
        assert!(rows[1].num_indices.is_none());

        assert_eq!(rows[2].month.as_deref(), Some("2024-01"));
        assert_eq!(rows[3].month.as_deref(), Some("2024-02"));
        assert_eq!(rows[4].date.as_deref(), Some("2024-01-05"));
        assert_eq!(rows[5].date_size.as_deref(), Some("512.00MB"));
    }

    #[test]
    fn csv_note_row() {
        let mut report = report(RenderOptions::default());
        report.get_mut("logs").unwrap().phase_settings = PolicySettings::Note {
            note: "No phases with rollover settings".to_owned(),
        };
        let rows = policy_csv_rows(&report);
        assert_eq!(
            rows[1].phase_rollover.as_deref(),
            Some("No phases with rollover settings")
        );
        assert!(rows[1].phase.is_none());
    }

    #[test]
    fn csv_output_has_header_and_blank_cells() {
        let rows = policy_csv_rows(&report(RenderOptions::default()));
        let mut out = Vec::new();
        write_csv(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Policy,Num Indices,Total Shards,Total Size,Total Size (Bytes),Phase,Phase Num Indices,\
             Phase Lifetime,Phase Rollover,Month,Month Num Indices,Month Size,Month Size (Bytes),\
             Date,Date Num Indices,Date Size,Date Size (Bytes)"
        );
        assert!(lines.next().unwrap().starts_with("logs,3,6,1.50GB,"));
        assert_eq!(text.lines().count(), 7);
    }

    #[test]
    fn write_files() {
        let dir = tempfile::tempdir().unwrap();
        let report = report(RenderOptions::default());

        let json_path = dir.path().join("report.json");
        write_json_file(&json_path, &report).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(written["logs"]["num_indices"], json!(3));

        let csv_path = dir.path().join("report.csv");
        write_csv_file(&csv_path, &policy_csv_rows(&report)).unwrap();
        assert!(std::fs::read_to_string(&csv_path).unwrap().starts_with("Policy,"));
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.json");
        let err = write_json_file(&path, &json!({})).unwrap_err();
        assert!(matches!(err.current_context(), RenderError::Io));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn full_device_is_io_error() {
        let path = Path::new("/dev/full");

        let err = write_json_file(path, &json!({"a": 1})).unwrap_err();
        assert!(matches!(err.current_context(), RenderError::Io));

        let err = write_csv_file(path, &[("a", 1)]).unwrap_err();
        assert!(matches!(err.current_context(), RenderError::Io));
    }
}
