use std::collections::HashMap;

use crate::{
    api::LifecycleApi,
    model::{IndexRecord, LifecycleStatus},
    report::{attach_definitions_error, attach_policy_definitions, PolicyGroups},
};

/// List indices, degrading to an empty listing when the cluster can not be reached.
pub(crate) async fn list_indices<A: LifecycleApi>(api: &A) -> Vec<IndexRecord> {
    if let Err(report) = api.check_connection().await {
        tracing::error!("Error connecting to cluster, continue with no indices: {report:?}");
        return Vec::new();
    }

    match api.list_indices().await {
        Ok(indices) => {
            tracing::info!(count = indices.len(), "Listed indices");
            indices
        }
        Err(report) => {
            tracing::error!("Error fetching indices, continue with no indices: {report:?}");
            Vec::new()
        }
    }
}

/// Explain every given index one after another. A failed lookup counts as unmanaged.
pub(crate) async fn lifecycle_statuses<A: LifecycleApi>(
    api: &A,
    records: &[IndexRecord],
) -> HashMap<String, LifecycleStatus> {
    let mut statuses = HashMap::with_capacity(records.len());

    for record in records {
        let status = match api.explain_lifecycle(&record.name).await {
            Ok(status) => status,
            Err(report) => {
                tracing::warn!(index = %record.name, "Failed to get lifecycle info: {report:?}");
                LifecycleStatus::unmanaged()
            }
        };
        statuses.insert(record.name.clone(), status);
    }

    statuses
}

pub(crate) async fn attach_definitions<A: LifecycleApi>(api: &A, groups: &mut PolicyGroups) {
    if groups.is_empty() {
        return;
    }

    match api.policy_definitions().await {
        Ok(definitions) => {
            tracing::debug!(count = definitions.len(), "Fetched lifecycle policies");
            attach_policy_definitions(groups, &definitions);
        }
        Err(report) => {
            tracing::error!("Failed to get lifecycle policies: {report:?}");
            attach_definitions_error(groups, &format!("{report:#}"));
        }
    }
}
