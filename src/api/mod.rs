use thiserror::Error;

use crate::model::{IndexRecord, LifecycleStatus, PolicyDefinitions};

#[cfg(feature = "elasticsearch")]
pub(crate) mod elasticsearch;

#[derive(Debug, Error)]
pub enum LifecycleApiError {
    #[error("cluster connectivity check failed")]
    Connect,
    #[error("list indices failed")]
    ListIndices,
    #[error("explain lifecycle failed")]
    ExplainLifecycle,
    #[error("fetch lifecycle policies failed")]
    PolicyDefinitions,
}

/// Everything the report needs from a cluster.
///
/// Calls are issued one at a time. Callers decide how to degrade when a call
/// fails, implementations only report what went wrong.
#[allow(async_fn_in_trait)]
pub trait LifecycleApi {
    async fn check_connection(&self) -> error_stack::Result<(), LifecycleApiError>;

    async fn list_indices(&self) -> error_stack::Result<Vec<IndexRecord>, LifecycleApiError>;

    async fn explain_lifecycle(
        &self,
        index: &str,
    ) -> error_stack::Result<LifecycleStatus, LifecycleApiError>;

    async fn policy_definitions(
        &self,
    ) -> error_stack::Result<PolicyDefinitions, LifecycleApiError>;
}
