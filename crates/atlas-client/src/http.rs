//! reqwest-backed catalog
//!
//! Every call is scoped to `{base_url}/api/v1/workspaces/{workspace}` and
//! carries the current bearer token. Calls are attempted once; the caller
//! decides whether to try again.

use crate::auth::{CredentialProvider, SessionObserver};
use crate::catalog::Catalog;
use crate::config::ClientConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::requests::{DiagramPatch, EnvironmentPatch, NewDiagram, NewEnvironment};
use async_trait::async_trait;
use atlas_model::{Diagram, DiagramId, Environment, EnvironmentId, WorkspaceId};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Catalog served over HTTP
pub struct HttpCatalog {
    client: reqwest::Client,
    config: ClientConfig,
    credentials: Arc<dyn CredentialProvider>,
    session: Arc<dyn SessionObserver>,
}

impl std::fmt::Debug for HttpCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCatalog")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpCatalog {
    /// Build a client with the configured timeout
    ///
    /// # Errors
    /// `CatalogError::Network` if the TLS backend cannot be initialized.
    pub fn new(
        config: ClientConfig,
        credentials: Arc<dyn CredentialProvider>,
        session: Arc<dyn SessionObserver>,
    ) -> CatalogResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("atlas-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;
        Ok(Self {
            client,
            config,
            credentials,
            session,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, workspace: &WorkspaceId, tail: &str) -> String {
        format!("{}/{tail}", self.config.scope_url(workspace.as_str()))
    }

    async fn request(&self, method: Method, url: &str) -> CatalogResult<RequestBuilder> {
        let Some(token) = self.credentials.bearer_token().await else {
            let error = CatalogError::Authentication("no credential available".into());
            self.session.signed_out(&error.to_string());
            return Err(error);
        };
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    /// Send and map non-success statuses; `resource`/`id` name 404 targets
    async fn execute(
        &self,
        request: RequestBuilder,
        resource: &'static str,
        id: &str,
    ) -> CatalogResult<Response> {
        let response = request.send().await.map_err(|e| self.transport_error(&e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = body.lines().next().unwrap_or_default().trim().to_string();
        let error = CatalogError::from_status(status.as_u16(), resource, id, message);

        if error.requires_sign_out() {
            self.session.signed_out(&error.to_string());
        }
        if !error.is_not_found() {
            tracing::warn!(status = status.as_u16(), resource, id, error = %error, "catalog call failed");
        }
        Err(error)
    }

    fn transport_error(&self, error: &reqwest::Error) -> CatalogError {
        if error.is_timeout() {
            CatalogError::Timeout(self.config.request_timeout())
        } else if error.is_decode() {
            CatalogError::Decode(error.to_string())
        } else {
            CatalogError::Network(error.to_string())
        }
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> CatalogResult<T> {
        response.json::<T>().await.map_err(|e| self.transport_error(&e))
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        resource: &'static str,
    ) -> CatalogResult<Vec<T>> {
        tracing::debug!(url, "GET list");
        let request = self.request(Method::GET, url).await?.query(query);
        match self.execute(request, resource, "").await {
            Ok(response) => self.decode(response).await,
            Err(CatalogError::NotFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        url: &str,
        body: &B,
        resource: &'static str,
        id: &str,
    ) -> CatalogResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(%method, url, "sending catalog write");
        let request = self.request(method, url).await?.json(body);
        let response = self.execute(request, resource, id).await?;
        self.decode(response).await
    }

    async fn delete(&self, url: &str, resource: &'static str, id: &str) -> CatalogResult<()> {
        tracing::debug!(url, "DELETE");
        let request = self.request(Method::DELETE, url).await?;
        self.execute(request, resource, id).await.map(drop)
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn list_environments(&self, workspace: &WorkspaceId) -> CatalogResult<Vec<Environment>> {
        self.fetch_list(&self.url(workspace, "environments"), &[], "environment")
            .await
    }

    async fn create_environment(
        &self,
        workspace: &WorkspaceId,
        request: &NewEnvironment,
    ) -> CatalogResult<Environment> {
        request.validate()?;
        let url = self.url(workspace, "environments");
        self.send_json(Method::POST, &url, request, "environment", "")
            .await
    }

    async fn update_environment(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
        patch: &EnvironmentPatch,
    ) -> CatalogResult<Environment> {
        let url = self.url(workspace, &format!("environments/{environment}"));
        self.send_json(Method::PUT, &url, patch, "environment", environment.as_str())
            .await
    }

    async fn delete_environment(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
    ) -> CatalogResult<()> {
        let url = self.url(workspace, &format!("environments/{environment}"));
        self.delete(&url, "environment", environment.as_str()).await
    }

    async fn list_diagrams(
        &self,
        workspace: &WorkspaceId,
        environment: &EnvironmentId,
    ) -> CatalogResult<Vec<Diagram>> {
        self.fetch_list(
            &self.url(workspace, "diagrams"),
            &[("environment_id", environment.as_str())],
            "diagram",
        )
        .await
    }

    async fn get_diagram(
        &self,
        workspace: &WorkspaceId,
        _environment: &EnvironmentId,
        diagram: &DiagramId,
    ) -> CatalogResult<Diagram> {
        let url = self.url(workspace, &format!("diagrams/{diagram}"));
        tracing::debug!(url, "GET diagram");
        let request = self.request(Method::GET, &url).await?;
        let response = self.execute(request, "diagram", diagram.as_str()).await?;
        self.decode(response).await
    }

    async fn create_diagram(
        &self,
        workspace: &WorkspaceId,
        request: &NewDiagram,
    ) -> CatalogResult<Diagram> {
        request.validate()?;
        let url = self.url(workspace, "diagrams");
        self.send_json(Method::POST, &url, request, "diagram", "")
            .await
    }

    async fn update_diagram(
        &self,
        workspace: &WorkspaceId,
        _environment: &EnvironmentId,
        diagram: &DiagramId,
        patch: &DiagramPatch,
    ) -> CatalogResult<Diagram> {
        let url = self.url(workspace, &format!("diagrams/{diagram}"));
        self.send_json(Method::PUT, &url, patch, "diagram", diagram.as_str())
            .await
    }

    async fn delete_diagram(
        &self,
        workspace: &WorkspaceId,
        _environment: &EnvironmentId,
        diagram: &DiagramId,
    ) -> CatalogResult<()> {
        let url = self.url(workspace, &format!("diagrams/{diagram}"));
        self.delete(&url, "diagram", diagram.as_str()).await
    }
}
