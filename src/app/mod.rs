use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::Local;
use serde::Serialize;
use thiserror::Error;

use crate::{
    api::LifecycleApi,
    config::Config,
    report::{
        self,
        render::{write_csv_file, write_json, write_json_file},
        InventoryEntry, PolicyReport, RenderOptions,
    },
    size,
};

mod collect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Indices below the threshold grouped by lifecycle policy.
    Policies,
    /// Every managed index on its own row.
    Indices,
}

impl ReportKind {
    fn file_stem(self) -> &'static str {
        match self {
            ReportKind::Policies => "policies",
            ReportKind::Indices => "indices",
        }
    }
}

pub struct App {
    config: Config,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configure client error")]
    ConfigureClient,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    #[cfg(feature = "elasticsearch")]
    pub async fn run(self, kind: ReportKind) -> error_stack::Result<(), AppError> {
        use error_stack::ResultExt;

        let client =
            crate::client::elasticsearch::ElasticsearchClient::new(self.config.elasticsearch.clone())
                .change_context(AppError::ConfigureClient)?;

        self.run_with(&client, kind).await;
        Ok(())
    }

    /// Build the requested report against `api`, print it and write the output files.
    pub async fn run_with<A: LifecycleApi>(&self, api: &A, kind: ReportKind) {
        let report_config = self.config.report();
        let options = RenderOptions {
            include_doc_counts: report_config.include_doc_counts(),
        };
        let threshold = report_config.threshold().map(size::parse_size);
        let outputs = Outputs::resolve(
            report_config.json_output.as_deref(),
            report_config.csv_output.as_deref(),
            report_config.csv,
            kind,
        );

        match kind {
            ReportKind::Policies => {
                let threshold = threshold.unwrap_or_else(|| {
                    tracing::warn!("No size threshold configured, assuming 0 bytes");
                    0.0
                });
                let document = policy_report(api, threshold, options).await;
                outputs.emit(&document, || report::policy_csv_rows(&document));
            }
            ReportKind::Indices => {
                let entries = index_inventory(api, threshold).await;
                outputs.emit(&entries, || report::inventory_csv_rows(&entries));
            }
        }
    }
}

pub async fn policy_report<A: LifecycleApi>(
    api: &A,
    threshold_bytes: f64,
    options: RenderOptions,
) -> PolicyReport {
    let indices = collect::list_indices(api).await;
    let small = report::filter_below_threshold(indices, threshold_bytes);
    tracing::info!(
        count = small.len(),
        threshold = %size::format_size(threshold_bytes),
        "Indices below threshold"
    );

    let statuses = collect::lifecycle_statuses(api, &small).await;
    let mut groups = report::group_by_policy(report::enrich(small, &statuses));
    collect::attach_definitions(api, &mut groups).await;

    report::policy_report(&groups, options)
}

pub async fn index_inventory<A: LifecycleApi>(
    api: &A,
    threshold_bytes: Option<f64>,
) -> Vec<InventoryEntry> {
    let mut indices = collect::list_indices(api).await;
    if let Some(threshold_bytes) = threshold_bytes {
        indices = report::filter_below_threshold(indices, threshold_bytes);
    }

    let statuses = collect::lifecycle_statuses(api, &indices).await;
    report::inventory(report::enrich(indices, &statuses))
}

#[derive(Debug, Clone, PartialEq)]
struct Outputs {
    json: PathBuf,
    csv: Option<PathBuf>,
}

impl Outputs {
    fn resolve(
        json: Option<&Path>,
        csv: Option<&Path>,
        csv_enabled: bool,
        kind: ReportKind,
    ) -> Self {
        let default = |extension: &str| {
            PathBuf::from(format!(
                "{}_{}.{extension}",
                kind.file_stem(),
                Local::now().format("%Y-%m-%d")
            ))
        };

        Self {
            json: json.map_or_else(|| default("json"), Path::to_path_buf),
            csv: csv
                .map(Path::to_path_buf)
                .or_else(|| csv_enabled.then(|| default("csv"))),
        }
    }

    // Write failures are logged, the report printed to stdout stays valid.
    fn emit<T, R, F>(&self, document: &T, rows: F)
    where
        T: Serialize,
        R: Serialize,
        F: FnOnce() -> Vec<R>,
    {
        if let Err(report) = write_json(io::stdout().lock(), document) {
            tracing::error!("Error printing results: {report:?}");
        }

        match write_json_file(&self.json, document) {
            Ok(()) => tracing::info!(path = %self.json.display(), "Results written"),
            Err(report) => tracing::error!("Error writing JSON file: {report:?}"),
        }

        if let Some(csv) = self.csv.as_ref() {
            match write_csv_file(csv, &rows()) {
                Ok(()) => tracing::info!(path = %csv.display(), "Results written"),
                Err(report) => tracing::error!("Error writing CSV file: {report:?}"),
            }
        }
    }
}
