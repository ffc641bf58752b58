use chrono::{DateTime, Utc};
use error_stack::ResultExt;
use tracing_futures::Instrument;

use crate::{
    api::{LifecycleApi, LifecycleApiError},
    client::elasticsearch::{
        response::{CatIndex, IlmExplainIndex, LifecyclePolicies},
        ElasticsearchClient,
    },
    model::{IndexRecord, LifecycleStatus, PhaseDefinition, PolicyDefinition, PolicyDefinitions},
    size,
};

impl LifecycleApi for ElasticsearchClient {
    async fn check_connection(&self) -> error_stack::Result<(), LifecycleApiError> {
        tracing::info!(endpoint = self.endpoint(), "Connect to cluster...");

        let info = self
            .info()
            .await
            .change_context(LifecycleApiError::Connect)?;

        tracing::info!(
            cluster_name = %info.cluster_name,
            node = %info.name,
            version = %info.version.number,
            "Successfully connected to cluster"
        );
        Ok(())
    }

    async fn list_indices(&self) -> error_stack::Result<Vec<IndexRecord>, LifecycleApiError> {
        tracing::info!("Fetch indices...");

        self.cat_indices()
            .await
            .map(|indices| indices.into_iter().map(index_record).collect())
            .change_context(LifecycleApiError::ListIndices)
    }

    async fn explain_lifecycle(
        &self,
        index: &str,
    ) -> error_stack::Result<LifecycleStatus, LifecycleApiError> {
        let span = tracing::debug_span!("explain_lifecycle", index);

        self.explain_index_lifecycle(index)
            .instrument(span)
            .await
            .map(lifecycle_status)
            .change_context(LifecycleApiError::ExplainLifecycle)
            .attach_printable_lazy(|| format!("index: {index}"))
    }

    async fn policy_definitions(
        &self,
    ) -> error_stack::Result<PolicyDefinitions, LifecycleApiError> {
        tracing::info!("Fetch lifecycle policies...");

        self.get_lifecycle()
            .await
            .map(policy_definitions)
            .change_context(LifecycleApiError::PolicyDefinitions)
    }
}

pub(crate) fn index_record(cat: CatIndex) -> IndexRecord {
    let primary_size_bytes = match cat.pri_store_size.as_deref() {
        Some(raw) => size::try_parse_size(raw).unwrap_or_else(|report| {
            tracing::warn!(index = %cat.index, size = raw, "Could not parse size, assuming 0 bytes: {report:?}");
            0.0
        }),
        None => 0.0,
    };

    let creation_time = cat.creation_date_string.as_deref().and_then(|raw| {
        parse_utc(raw)
            .map_err(|err| {
                tracing::warn!(index = %cat.index, creation_date = raw, %err, "Could not parse creation date");
            })
            .ok()
    });

    IndexRecord {
        primary_size_bytes,
        primary_shards: parse_count(&cat.index, "pri", cat.pri.as_deref()).unwrap_or(0),
        replica_count: parse_count(&cat.index, "rep", cat.rep.as_deref()).unwrap_or(0),
        doc_count: parse_count(&cat.index, "docs.count", cat.docs_count.as_deref()),
        creation_time,
        name: cat.index,
    }
}

fn parse_count(index: &str, field: &str, raw: Option<&str>) -> Option<u64> {
    let raw = raw?;
    raw.trim()
        .parse::<u64>()
        .map_err(|err| {
            tracing::warn!(index, field, value = raw, %err, "Could not parse count");
        })
        .ok()
}

fn parse_utc(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|time| time.with_timezone(&Utc))
}

pub(crate) fn lifecycle_status(explain: IlmExplainIndex) -> LifecycleStatus {
    tracing::debug!(
        index = ?explain.index,
        managed = explain.managed,
        action = ?explain.action,
        step = ?explain.step,
        "Explained lifecycle"
    );

    LifecycleStatus {
        managed: explain.managed,
        policy_name: explain.policy,
        phase: explain.phase,
    }
}

pub(crate) fn policy_definitions(policies: LifecyclePolicies) -> PolicyDefinitions {
    policies
        .into_iter()
        .map(|(name, policy)| {
            tracing::debug!(
                policy = %name,
                version = ?policy.version,
                modified_date = ?policy.modified_date,
                "Lifecycle policy"
            );
            let phases = policy
                .policy
                .phases
                .into_iter()
                .map(|(phase, mut body)| {
                    let definition = PhaseDefinition {
                        min_age: body.min_age,
                        rollover: body.actions.remove("rollover"),
                    };
                    (phase, definition)
                })
                .collect();
            (name, PolicyDefinition { phases })
        })
        .collect()
}
