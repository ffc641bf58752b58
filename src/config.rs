use std::{fs, path::Path, path::PathBuf};

use error_stack::{IntoReport, ResultExt};
use serde::Deserialize;
use thiserror::Error;
use typed_builder::TypedBuilder;
use url::Url;

#[derive(Clone, Debug, Deserialize, TypedBuilder)]
pub struct Config {
    pub(crate) elasticsearch: ElasticsearchConfig,
    #[serde(default)]
    #[builder(default)]
    pub(crate) report: ReportConfig,
}

#[derive(Clone, Debug, Deserialize, TypedBuilder)]
pub struct ElasticsearchConfig {
    pub(crate) endpoint: Url,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub(crate) credential: Option<ElasticsearchCredential>,
    /// Skip TLS certificate verification.
    #[serde(default = "default_insecure")]
    #[builder(default = default_insecure())]
    pub(crate) insecure: bool,
    #[serde(default = "default_timeout_secs")]
    #[builder(default = default_timeout_secs())]
    pub(crate) timeout_secs: u64,
}

#[derive(Clone, Debug, Deserialize, TypedBuilder)]
pub struct ElasticsearchCredential {
    pub(crate) username: String,
    pub(crate) password: String,
    #[serde(default)]
    #[builder(default)]
    pub(crate) cloud_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, TypedBuilder)]
pub struct ReportConfig {
    /// Size threshold, e.g. `1gb`. Indices strictly below it are reported.
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub(crate) threshold: Option<String>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub(crate) json_output: Option<PathBuf>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub(crate) csv_output: Option<PathBuf>,
    /// Write CSV next to JSON even without an explicit `csv_output`.
    #[serde(default)]
    #[builder(default)]
    pub(crate) csv: bool,
    #[serde(default)]
    #[builder(default)]
    pub(crate) include_doc_counts: bool,
}

fn default_insecure() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    20
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file")]
    Read,
    #[error("parse config file")]
    Parse,
    #[error("missing config value")]
    Missing,
    #[error("invalid config value")]
    Invalid,
}

/// Partial configuration as it appears in a YAML file. Every field is
/// optional so command line flags can fill in the rest.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub elasticsearch: Option<ElasticsearchFileConfig>,
    #[serde(default)]
    pub report: Option<ReportConfig>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ElasticsearchFileConfig {
    pub endpoint: Option<Url>,
    pub credential: Option<ElasticsearchCredential>,
    pub insecure: Option<bool>,
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    pub fn load(path: impl AsRef<Path>) -> error_stack::Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .into_report()
            .change_context(ConfigError::Read)
            .attach_printable_lazy(|| format!("path: {}", path.display()))?;

        Self::from_yaml(&raw).attach_printable_lazy(|| format!("path: {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> error_stack::Result<Self, ConfigError> {
        serde_yaml::from_str(raw)
            .into_report()
            .change_context(ConfigError::Parse)
    }
}

impl Config {
    pub fn elasticsearch(&self) -> &ElasticsearchConfig {
        &self.elasticsearch
    }

    pub fn report(&self) -> &ReportConfig {
        &self.report
    }
}

impl ReportConfig {
    pub fn threshold(&self) -> Option<&str> {
        self.threshold.as_deref()
    }

    pub fn include_doc_counts(&self) -> bool {
        self.include_doc_counts
    }
}
