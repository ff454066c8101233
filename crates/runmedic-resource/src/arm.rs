//! HTTP implementation of [`ResourceApi`] against the resource-management API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use runmedic_types::config_defaults;
use runmedic_types::{
    BearerCredential, InspectionTarget, ResourceList, WorkflowAction, WorkflowDetails, WorkflowRun,
};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::ResourceApi;
use crate::error::{ResourceError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for [`ArmClient`].
#[derive(Debug, Clone)]
pub struct ArmConfig {
    /// API root, e.g. `https://management.azure.com`.
    pub base_url: String,
    /// Value of the `api-version` query parameter.
    pub api_version: String,
    /// Request timeout. `None` keeps the HTTP client default.
    pub timeout: Option<Duration>,
    /// Maximum number of list pages to fetch by following `nextLink`.
    pub max_pages: u32,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            base_url: config_defaults::RESOURCE_BASE_URL.to_string(),
            api_version: config_defaults::RESOURCE_API_VERSION.to_string(),
            timeout: None,
            max_pages: config_defaults::MAX_PAGES,
        }
    }
}

impl ArmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the page limit for list calls.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Resource-management client.
///
/// Every request carries the caller's `Authorization` header verbatim. The
/// underlying connection pool is shared across clones of the inner
/// `reqwest::Client`.
pub struct ArmClient {
    http: reqwest::Client,
    base_url: Url,
    config: ArmConfig,
}

impl ArmClient {
    pub fn new(config: ArmConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ResourceError::InvalidUrl(format!(
                "{} cannot be used as a base URL",
                config.base_url
            )));
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(format!("runmedic/{}", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ResourceError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    /// Create a client with default settings.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ArmConfig::default())
    }

    /// Build the URL for a workflow resource, with `tail` segments appended.
    ///
    /// Each segment is percent-encoded on its own, so identifiers containing
    /// `/`, `?` or spaces cannot change the path shape.
    pub(crate) fn workflow_url(&self, target: &InspectionTarget, tail: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ResourceError::InvalidUrl(format!("{} cannot be used as a base URL", self.base_url))
            })?;
            segments.pop_if_empty().extend([
                "subscriptions",
                target.subscription_id.as_str(),
                "resourceGroups",
                target.resource_group.as_str(),
                "providers",
                "Microsoft.Logic",
                "workflows",
                target.workflow_name.as_str(),
            ]);
            segments.extend(tail);
        }
        url.query_pairs_mut()
            .append_pair("api-version", &self.config.api_version);
        Ok(url)
    }

    /// GET a URL and decode the body.
    async fn fetch<T: DeserializeOwned>(&self, url: Url, credential: &BearerCredential) -> Result<T> {
        tracing::debug!(url = %url, "Resource API request");

        let response = self
            .http
            .get(url.clone())
            .header(AUTHORIZATION, credential.header_value())
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                url = %url,
                status = status.as_u16(),
                "Resource API returned an error"
            );
            return Err(ResourceError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// GET a list endpoint, following `nextLink` up to `max_pages` pages.
    ///
    /// Only links on the base URL's origin are followed, so the credential
    /// never leaves that host. When the limit or an off-origin link stops
    /// pagination early, the returned list keeps the unfollowed `nextLink`.
    async fn fetch_list<T: DeserializeOwned>(
        &self,
        url: Url,
        credential: &BearerCredential,
    ) -> Result<ResourceList<T>> {
        let first: ResourceList<T> = self.fetch(url, credential).await?;
        let mut items = first.value;
        let mut next_link = first.next_link;
        let mut pages = 1;

        while pages < self.config.max_pages.max(1) {
            let Some(link) = next_link.take() else {
                break;
            };
            let link_url = Url::parse(&link)?;
            if link_url.origin() != self.base_url.origin() {
                tracing::warn!(
                    next_link = %link_url.origin().ascii_serialization(),
                    "Not following nextLink outside the resource API origin"
                );
                next_link = Some(link);
                break;
            }
            let page: ResourceList<T> = self.fetch(link_url, credential).await?;
            items.extend(page.value);
            next_link = page.next_link;
            pages += 1;
        }

        if next_link.is_some() {
            tracing::debug!(pages, "List truncated at page limit");
        }

        Ok(ResourceList {
            value: items,
            next_link,
        })
    }
}

#[async_trait]
impl ResourceApi for ArmClient {
    async fn get_workflow(
        &self,
        target: &InspectionTarget,
        credential: &BearerCredential,
    ) -> Result<WorkflowDetails> {
        let url = self.workflow_url(target, &[])?;
        self.fetch(url, credential).await
    }

    async fn list_runs(
        &self,
        target: &InspectionTarget,
        credential: &BearerCredential,
    ) -> Result<ResourceList<WorkflowRun>> {
        let url = self.workflow_url(target, &["runs"])?;
        self.fetch_list(url, credential).await
    }

    async fn list_run_actions(
        &self,
        target: &InspectionTarget,
        run_id: &str,
        credential: &BearerCredential,
    ) -> Result<ResourceList<WorkflowAction>> {
        let url = self.workflow_url(target, &["runs", run_id, "actions"])?;
        self.fetch_list(url, credential).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
