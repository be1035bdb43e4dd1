use anyhow::Result;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::types::{PatchOp, TemplateSummary};

/// NDO API client
pub struct MsoClient {
    base_url: String,
    token: String,
    client: Client,
}

impl MsoClient {
    pub fn new(url: String, token: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/mso/api/v1{}", self.base_url, path)
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Helper to perform a GET request and decode the JSON body
    async fn get_json<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let resp = self
            .client
            .get(self.api_url(endpoint))
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("NDO API error {}: {}", status, body));
        }

        Ok(resp.json().await?)
    }

    /// Test connectivity to NDO
    pub async fn test_connection(&self) -> bool {
        match self
            .client
            .get(self.api_url("/templates/summaries"))
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    // --- Templates ---

    pub async fn list_template_summaries(&self) -> Result<Vec<TemplateSummary>> {
        let summaries: Option<Vec<TemplateSummary>> = self.get_json("/templates/summaries").await?;
        Ok(summaries.unwrap_or_default())
    }

    /// Fetch the full template document. The body is kept opaque; the
    /// reconciler only does positional addressing and field lookup into it.
    pub async fn get_template(&self, template_id: &str) -> Result<Value> {
        self.get_json(&format!("/templates/{}", template_id)).await
    }

    // --- Tenant-scoped object collections ---

    /// Fetch a tenant-scoped object collection (route maps, VRFs, ...).
    /// The backend returns null instead of an empty array when the tenant
    /// has no objects of the requested kind.
    pub async fn list_template_objects<T: serde::de::DeserializeOwned>(
        &self,
        object_type: &str,
        tenant_id: &str,
    ) -> Result<Vec<T>> {
        let objects: Option<Vec<T>> = self
            .get_json(&format!(
                "/templates/objects?type={}&tenant-id={}",
                object_type, tenant_id
            ))
            .await?;
        Ok(objects.unwrap_or_default())
    }

    // --- Mutation ---

    /// Submit the finished ordered operation list as one atomic PATCH.
    /// Callers must not invoke this with an empty list.
    pub async fn patch_template(&self, template_id: &str, ops: &[PatchOp]) -> Result<Value> {
        let resp = self
            .client
            .patch(self.api_url(&format!("/templates/{}", template_id)))
            .header("Authorization", self.auth_header())
            .json(ops)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("NDO API patch error {}: {}", status, body));
        }

        let body = resp.text().await?;
        if body.is_empty() {
            Ok(Value::Null)
        } else {
            Ok(serde_json::from_str(&body)?)
        }
    }
}
