//! Access to the Kubernetes API server for namespaces and service catalog
//! resources.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Namespace, ServiceClass, ServiceInstanceSummary, ServicePlan},
    error::{ApiError, ErrorKind},
    protocol::{
        ClusterServiceClass, ClusterServicePlan, NamespaceObject, ObjectList, ProvisionRequest,
        ServiceInstance, Status, SERVICE_CATALOG_API_VERSION,
    },
};
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ApiError>;
    async fn get_namespace(&self, name: &Namespace) -> Result<Namespace, ApiError>;
    async fn create_namespace(&self, name: &Namespace) -> Result<Namespace, ApiError>;
    async fn list_classes(&self) -> Result<Vec<ServiceClass>, ApiError>;
    async fn list_plans(&self) -> Result<Vec<ServicePlan>, ApiError>;
    async fn list_instances(
        &self,
        namespace: &Namespace,
    ) -> Result<Vec<ServiceInstanceSummary>, ApiError>;
    async fn provision_instance(
        &self,
        request: &ProvisionRequest,
    ) -> Result<ServiceInstanceSummary, ApiError>;
}

#[derive(Debug, Error)]
pub enum CatalogApiError {
    #[error("invalid api url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },
    #[error("{url} returned {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },
    #[error("invalid response body from {url}: {source}")]
    Decode {
        url: String,
        source: reqwest::Error,
    },
}

impl CatalogApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Status { status, .. } => ErrorKind::from_status(*status),
            Self::Transport { .. } => ErrorKind::Transport,
            Self::InvalidUrl { .. } | Self::Client(_) | Self::Decode { .. } => ErrorKind::Internal,
        }
    }
}

impl From<CatalogApiError> for ApiError {
    fn from(value: CatalogApiError) -> Self {
        let kind = value.kind();
        let message = match value {
            CatalogApiError::Status { message, .. } => message,
            other => other.to_string(),
        };
        ApiError::new(kind, message)
    }
}

pub struct HttpCatalogApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCatalogApi {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CatalogApiError> {
        let parsed = Url::parse(base_url).map_err(|source| CatalogApiError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CatalogApiError::Client)?;
        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            token: token.filter(|token| !token.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        url: String,
    ) -> Result<T, CatalogApiError> {
        let response = builder
            .send()
            .await
            .map_err(|source| CatalogApiError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reported = serde_json::from_str::<Status>(&body)
                .ok()
                .map(|status| status.message)
                .filter(|message| !message.is_empty());
            let message = match reported {
                Some(message) => message,
                None if body.trim().is_empty() => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
                None => body,
            };
            error!(%url, status = status.as_u16(), %message, "cluster api request failed");
            return Err(CatalogApiError::Status {
                url,
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| CatalogApiError::Decode { url, source })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "GET");
        let builder = self.request(Method::GET, &url);
        Ok(self.send_json(builder, url).await?)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "POST");
        let builder = self.request(Method::POST, &url).json(body);
        Ok(self.send_json(builder, url).await?)
    }
}

fn catalog_path(rest: &str) -> String {
    format!("/apis/{SERVICE_CATALOG_API_VERSION}/{rest}")
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ApiError> {
        let list: ObjectList<NamespaceObject> = self.get_json("/api/v1/namespaces").await?;
        Ok(list
            .items
            .into_iter()
            .map(|namespace| Namespace(namespace.metadata.name))
            .collect())
    }

    async fn get_namespace(&self, name: &Namespace) -> Result<Namespace, ApiError> {
        let namespace: NamespaceObject = self
            .get_json(&format!("/api/v1/namespaces/{name}"))
            .await?;
        Ok(Namespace(namespace.metadata.name))
    }

    async fn create_namespace(&self, name: &Namespace) -> Result<Namespace, ApiError> {
        let created: NamespaceObject = self
            .post_json("/api/v1/namespaces", &NamespaceObject::named(name))
            .await?;
        Ok(Namespace(created.metadata.name))
    }

    async fn list_classes(&self) -> Result<Vec<ServiceClass>, ApiError> {
        let list: ObjectList<ClusterServiceClass> = self
            .get_json(&catalog_path("clusterserviceclasses"))
            .await?;
        Ok(list.items.into_iter().map(ServiceClass::from).collect())
    }

    async fn list_plans(&self) -> Result<Vec<ServicePlan>, ApiError> {
        let list: ObjectList<ClusterServicePlan> = self
            .get_json(&catalog_path("clusterserviceplans"))
            .await?;
        Ok(list.items.into_iter().map(ServicePlan::from).collect())
    }

    async fn list_instances(
        &self,
        namespace: &Namespace,
    ) -> Result<Vec<ServiceInstanceSummary>, ApiError> {
        let list: ObjectList<ServiceInstance> = self
            .get_json(&catalog_path(&format!(
                "namespaces/{namespace}/serviceinstances"
            )))
            .await?;
        Ok(list
            .items
            .into_iter()
            .map(ServiceInstanceSummary::from)
            .collect())
    }

    async fn provision_instance(
        &self,
        request: &ProvisionRequest,
    ) -> Result<ServiceInstanceSummary, ApiError> {
        let path = catalog_path(&format!(
            "namespaces/{}/serviceinstances",
            request.namespace
        ));
        let created: ServiceInstance = self
            .post_json(&path, &request.to_service_instance())
            .await?;
        Ok(ServiceInstanceSummary::from(created))
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
