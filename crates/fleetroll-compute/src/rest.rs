//! REST-backed [`ComputeClient`] over the provider's v1 compute API.
//!
//! Thin JSON/bearer-token client. Auth is a pre-minted access token; the
//! credential flow itself (refresh, service accounts) is the operator's
//! concern. The base endpoint is overridable for emulators and tests.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::ComputeClient;
use crate::error::{ComputeError, ComputeResult};
use crate::types::{Image, InstanceGroup, InstanceTemplate, ManagedInstance};

/// Production endpoint for the v1 compute API.
pub const DEFAULT_ENDPOINT: &str = "https://compute.googleapis.com/compute/v1";

/// HTTP implementation of the compute capability.
pub struct RestClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl RestClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: token.into(),
        }
    }

    /// Override the API endpoint (emulators, test servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> ComputeResult<T> {
        debug!(%path, "GET");
        let resp = self
            .http
            .get(format!("{}/{path}", self.endpoint))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let resp = check(resp, what).await?;
        Ok(resp.json().await?)
    }

    /// POST a JSON body and discard the response payload (the provider
    /// answers mutations with an operation object this client does not
    /// track; callers confirm by reading back).
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        what: &str,
    ) -> ComputeResult<()> {
        debug!(%path, "POST");
        let resp = self
            .http
            .post(format!("{}/{path}", self.endpoint))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        check(resp, what).await?;
        Ok(())
    }
}

/// Map non-success statuses: 404 to `NotFound`, everything else to
/// `Status` with the response body as the message.
async fn check(resp: reqwest::Response, what: &str) -> ComputeResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ComputeError::NotFound(what.to_string()));
    }
    let message = resp.text().await.unwrap_or_default();
    Err(ComputeError::Status {
        status: status.as_u16(),
        message,
    })
}

#[derive(Deserialize)]
struct ListResponse<T> {
    #[serde(default)]
    items: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManagedInstancesResponse {
    #[serde(default)]
    managed_instances: Vec<ManagedInstance>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetTemplateRequest<'a> {
    instance_template: &'a str,
}

#[derive(Serialize)]
struct RecreateRequest<'a> {
    instances: &'a [String],
}

#[async_trait]
impl ComputeClient for RestClient {
    async fn list_images(&self, project: &str) -> ComputeResult<Vec<Image>> {
        let resp: ListResponse<Image> = self
            .get_json(&format!("projects/{project}/global/images"), "image list")
            .await?;
        Ok(resp.items)
    }

    async fn get_instance_template(
        &self,
        project: &str,
        name: &str,
    ) -> ComputeResult<InstanceTemplate> {
        self.get_json(
            &format!("projects/{project}/global/instanceTemplates/{name}"),
            &format!("instance template {name:?}"),
        )
        .await
    }

    async fn list_instance_templates(
        &self,
        project: &str,
    ) -> ComputeResult<Vec<InstanceTemplate>> {
        let resp: ListResponse<InstanceTemplate> = self
            .get_json(
                &format!("projects/{project}/global/instanceTemplates"),
                "instance template list",
            )
            .await?;
        Ok(resp.items)
    }

    async fn insert_instance_template(
        &self,
        project: &str,
        template: &InstanceTemplate,
    ) -> ComputeResult<()> {
        self.post_json(
            &format!("projects/{project}/global/instanceTemplates"),
            template,
            "instance template insert",
        )
        .await
    }

    async fn set_instance_template(
        &self,
        project: &str,
        zone: &str,
        group: &str,
        template_link: &str,
    ) -> ComputeResult<()> {
        self.post_json(
            &format!(
                "projects/{project}/zones/{zone}/instanceGroupManagers/{group}/setInstanceTemplate"
            ),
            &SetTemplateRequest {
                instance_template: template_link,
            },
            "set instance template",
        )
        .await
    }

    async fn get_instance_group(
        &self,
        project: &str,
        zone: &str,
        group: &str,
    ) -> ComputeResult<InstanceGroup> {
        self.get_json(
            &format!("projects/{project}/zones/{zone}/instanceGroupManagers/{group}"),
            &format!("instance group {group:?}"),
        )
        .await
    }

    async fn list_managed_instances(
        &self,
        project: &str,
        zone: &str,
        group: &str,
    ) -> ComputeResult<Vec<ManagedInstance>> {
        debug!(group, "POST listManagedInstances");
        let resp = self
            .http
            .post(format!(
                "{}/projects/{project}/zones/{zone}/instanceGroupManagers/{group}/listManagedInstances",
                self.endpoint
            ))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let resp = check(resp, &format!("instance group {group:?}")).await?;
        let body: ManagedInstancesResponse = resp.json().await?;
        Ok(body.managed_instances)
    }

    async fn recreate_instances(
        &self,
        project: &str,
        zone: &str,
        group: &str,
        instances: &[String],
    ) -> ComputeResult<()> {
        self.post_json(
            &format!(
                "projects/{project}/zones/{zone}/instanceGroupManagers/{group}/recreateInstances"
            ),
            &RecreateRequest { instances },
            "recreate instances",
        )
        .await
    }

    async fn resize_group(
        &self,
        project: &str,
        zone: &str,
        group: &str,
        size: u64,
    ) -> ComputeResult<()> {
        debug!(group, size, "POST resize");
        let resp = self
            .http
            .post(format!(
                "{}/projects/{project}/zones/{zone}/instanceGroupManagers/{group}/resize",
                self.endpoint
            ))
            .bearer_auth(&self.token)
            .query(&[("size", size)])
            .send()
            .await?;
        check(resp, &format!("instance group {group:?}")).await?;
        Ok(())
    }
}
