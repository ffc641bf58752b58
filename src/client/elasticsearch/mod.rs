use std::time::Duration;

use elasticsearch::{
    auth::Credentials,
    cat::CatIndicesParts,
    cert::CertificateValidation,
    http::transport::{SingleNodeConnectionPool, Transport, TransportBuilder},
    ilm::{IlmExplainLifecycleParts, IlmGetLifecycleParts},
    params::Bytes,
};
use error_stack::{IntoReport, Report, ResultExt};
use futures::{FutureExt, TryFutureExt};
use thiserror::Error;

use crate::{config::ElasticsearchCredential, ElasticsearchConfig};

pub(crate) mod response;

#[derive(Debug)]
pub struct ElasticsearchClient {
    endpoint: String,
    inner: elasticsearch::Elasticsearch,
    default_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ElasticsearchClientError {
    #[error("build client error")]
    BuildClient,
    #[error("api request error")]
    ApiRequest,
    #[error("deserialize response")]
    DeserializeResponse,
}

impl ElasticsearchClient {
    const CAT_INDICES_COLUMNS: &'static [&'static str] = &[
        "index",
        "pri.store.size",
        "pri",
        "rep",
        "docs.count",
        "creation.date.string",
    ];

    pub fn new(c: ElasticsearchConfig) -> error_stack::Result<Self, ElasticsearchClientError> {
        let default_timeout = Duration::from_secs(c.timeout_secs);
        let transport = match c.credential {
            Some(ElasticsearchCredential {
                username,
                password,
                cloud_id: Some(cloud_id),
            }) => Transport::cloud(cloud_id.as_str(), Credentials::Basic(username, password))
                .into_report()
                .change_context(ElasticsearchClientError::BuildClient)
                .attach_printable("invalid cloud id")?,
            credential => {
                let pool = SingleNodeConnectionPool::new(c.endpoint.clone());
                let mut builder = TransportBuilder::new(pool).timeout(default_timeout);
                if let Some(credential) = credential {
                    builder =
                        builder.auth(Credentials::Basic(credential.username, credential.password));
                }
                if c.insecure {
                    builder = builder.cert_validation(CertificateValidation::None);
                }
                builder
                    .build()
                    .into_report()
                    .change_context(ElasticsearchClientError::BuildClient)?
            }
        };

        Ok(ElasticsearchClient {
            endpoint: c.endpoint.to_string(),
            inner: elasticsearch::Elasticsearch::new(transport),
            default_timeout,
        })
    }

    pub(crate) fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    // https://www.elastic.co/guide/en/elasticsearch/reference/current/rest-api-root.html
    pub(crate) async fn info(
        &self,
    ) -> error_stack::Result<response::ClusterInfo, ElasticsearchClientError> {
        self.inner
            .info()
            .request_timeout(self.default_timeout)
            .send()
            .map(|result| result.and_then(|res| res.error_for_status_code()))
            .await
            .into_report()
            .change_context(ElasticsearchClientError::ApiRequest)?
            .json::<response::ClusterInfo>()
            .await
            .into_report()
            .change_context(ElasticsearchClientError::DeserializeResponse)
    }

    pub(crate) async fn cat_indices(
        &self,
    ) -> error_stack::Result<response::CatIndices, ElasticsearchClientError> {
        self.inner
            .cat()
            .indices(CatIndicesParts::None)
            .h(Self::CAT_INDICES_COLUMNS)
            .bytes(Bytes::B)
            .format("json")
            .request_timeout(self.default_timeout)
            .send()
            .map(|result| result.and_then(|res| res.error_for_status_code()))
            .and_then(|res| res.json::<response::CatIndices>())
            .await
            .into_report()
            .change_context(ElasticsearchClientError::ApiRequest)
    }

    /// https://www.elastic.co/guide/en/elasticsearch/reference/current/ilm-explain-lifecycle.html
    pub(crate) async fn explain_index_lifecycle(
        &self,
        index: &str,
    ) -> error_stack::Result<response::IlmExplainIndex, ElasticsearchClientError> {
        let mut payload = self
            .inner
            .ilm()
            .explain_lifecycle(IlmExplainLifecycleParts::Index(index))
            .request_timeout(self.default_timeout)
            .send()
            .map(|result| result.and_then(|res| res.error_for_status_code()))
            .and_then(|res| res.json::<response::IlmExplain>())
            .await
            .into_report()
            .change_context(ElasticsearchClientError::ApiRequest)?;

        match payload.indices.remove(index) {
            Some(res) => Ok(res),
            None => Err(Report::new(ElasticsearchClientError::DeserializeResponse))
                .attach_printable_lazy(|| "response does not contain expected index"),
        }
    }

    /// https://www.elastic.co/guide/en/elasticsearch/reference/current/ilm-get-lifecycle.html
    pub(crate) async fn get_lifecycle(
        &self,
    ) -> error_stack::Result<response::LifecyclePolicies, ElasticsearchClientError> {
        self.inner
            .ilm()
            .get_lifecycle(IlmGetLifecycleParts::None)
            .request_timeout(self.default_timeout)
            .send()
            .map(|result| result.and_then(|res| res.error_for_status_code()))
            .and_then(|res| res.json::<response::LifecyclePolicies>())
            .await
            .into_report()
            .change_context(ElasticsearchClientError::ApiRequest)
    }
}
