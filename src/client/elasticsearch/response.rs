use std::collections::HashMap;

use serde::Deserialize;

/// https://www.elastic.co/guide/en/elasticsearch/reference/current/rest-api-root.html
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterInfo {
    pub name: String,
    pub cluster_name: String,
    pub version: ClusterVersion,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterVersion {
    pub number: String,
}

/// https://www.elastic.co/guide/en/elasticsearch/reference/current/cat-indices.html
pub type CatIndices = Vec<CatIndex>;

// Closed indices report null for most stats.
#[derive(Debug, Clone, Deserialize)]
pub struct CatIndex {
    pub index: String,
    #[serde(rename = "pri.store.size")]
    pub pri_store_size: Option<String>,
    pub pri: Option<String>,
    pub rep: Option<String>,
    #[serde(rename = "docs.count")]
    pub docs_count: Option<String>,
    #[serde(rename = "creation.date.string")]
    pub creation_date_string: Option<String>,
}

/// https://www.elastic.co/guide/en/elasticsearch/reference/current/ilm-explain-lifecycle.html
#[derive(Debug, Clone, Deserialize)]
pub struct IlmExplain {
    #[serde(default)]
    pub indices: HashMap<String, IlmExplainIndex>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IlmExplainIndex {
    pub index: Option<String>,
    #[serde(default)]
    pub managed: bool,
    pub policy: Option<String>,
    pub phase: Option<String>,
    pub action: Option<String>,
    pub step: Option<String>,
}

/*
{
    "policy_name": { "version": 1, "modified_date": "...", "policy": { "phases": { ... } } }
 */
/// https://www.elastic.co/guide/en/elasticsearch/reference/current/ilm-get-lifecycle.html
pub type LifecyclePolicies = HashMap<String, LifecyclePolicy>;

#[derive(Debug, Clone, Deserialize)]
pub struct LifecyclePolicy {
    pub version: Option<u64>,
    pub modified_date: Option<String>,
    pub policy: PolicyBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyBody {
    #[serde(default)]
    pub phases: HashMap<String, Phase>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Phase {
    pub min_age: Option<String>,
    #[serde(default)]
    pub actions: HashMap<String, serde_json::Value>,
}
