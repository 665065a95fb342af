use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::archive::{Archive, Connect};
use crate::error::DandiError;
use crate::types::{Asset, Dandiset, Version};

/// HTTP client for the archive REST API, bound to one endpoint.
pub struct DandiClient {
    api_url: String,
    http: reqwest::Client,
}

/// Raw Dandiset record as returned by `GET /dandisets/{id}/`.
#[derive(Debug, Deserialize)]
struct DandisetData {
    identifier: String,
    created: Option<DateTime<Utc>>,
    modified: Option<DateTime<Utc>>,
    draft_version: Version,
}

impl DandisetData {
    /// Bind to the draft version; deletion never targets published versions.
    fn into_draft(self) -> Dandiset {
        Dandiset {
            identifier: self.identifier,
            version: self.draft_version,
            created: self.created,
            modified: self.modified,
        }
    }
}

/// One cursor page of a paginated listing endpoint.
#[derive(Debug, Deserialize)]
struct Page<T> {
    next: Option<String>,
    results: Vec<T>,
}

impl DandiClient {
    /// Create a client for `api_url` sending `Authorization: token <key>`
    /// on every request.
    pub fn new(api_url: &str, api_key: &str) -> Result<Self, DandiError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let mut auth = reqwest::header::HeaderValue::from_str(&format!("token {api_key}"))
            .map_err(|_| DandiError::Auth("API key contains invalid characters".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);
        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Check the credentials by fetching the authenticated user record.
    pub async fn verify_credentials(&self) -> Result<(), DandiError> {
        let resp = self.http.get(self.url("/users/me/")).send().await?;
        match resp.status().as_u16() {
            200 => Ok(()),
            401 | 403 => Err(DandiError::Auth(format!(
                "API key rejected by {}",
                self.api_url
            ))),
            status => Err(DandiError::Api {
                status,
                message: resp.text().await.unwrap_or_default(),
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, DandiError> {
        let resp = self.http.get(self.url(path)).send().await?;
        handle_response(resp).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, DandiError> {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        handle_response(resp).await
    }

    async fn delete(&self, path: &str) -> Result<(), DandiError> {
        let resp = self.http.delete(self.url(path)).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(error_from(status.as_u16(), resp.text().await.unwrap_or_default()))
        }
    }

    /// Follow `next` cursors until the listing is exhausted.
    async fn paginate<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, DandiError> {
        let mut results = Vec::new();
        let mut next = {
            let resp = self
                .http
                .get(self.url(path))
                .query(params)
                .send()
                .await?;
            let page: Page<T> = handle_response(resp).await?;
            results.extend(page.results);
            page.next
        };
        while let Some(url) = next {
            let resp = self.http.get(url).send().await?;
            let page: Page<T> = handle_response(resp).await?;
            results.extend(page.results);
            next = page.next;
        }
        Ok(results)
    }

    fn version_assets_path(&self, dandiset: &Dandiset) -> String {
        format!(
            "/dandisets/{}/versions/{}/assets/",
            dandiset.identifier,
            dandiset.version_id()
        )
    }
}

#[async_trait]
impl Archive for DandiClient {
    fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn get_dandiset(&self, dandiset_id: &str) -> Result<Dandiset, DandiError> {
        tracing::debug!(dandiset_id, api_url = %self.api_url, "fetching dandiset");
        let data: DandisetData = self
            .get(&format!("/dandisets/{dandiset_id}/"))
            .await
            .map_err(|e| match e {
                DandiError::NotFound(_) => {
                    DandiError::NotFound(format!("No such Dandiset: {dandiset_id:?}"))
                }
                other => other,
            })?;
        Ok(data.into_draft())
    }

    async fn get_asset_by_path(
        &self,
        dandiset: &Dandiset,
        path: &str,
    ) -> Result<Asset, DandiError> {
        // The listing endpoint matches by prefix, so weed out assets that
        // merely have `path` as a proper prefix.
        let mut exact: Vec<Asset> = self
            .get_assets_with_path_prefix(dandiset, path)
            .await?
            .into_iter()
            .filter(|a| a.path == path)
            .collect();
        match exact.len() {
            1 => Ok(exact.remove(0)),
            _ => Err(DandiError::NotFound(format!("No asset at path {path:?}"))),
        }
    }

    async fn get_assets_with_path_prefix(
        &self,
        dandiset: &Dandiset,
        prefix: &str,
    ) -> Result<Vec<Asset>, DandiError> {
        self.paginate(&self.version_assets_path(dandiset), &[("path", prefix)])
            .await
    }

    async fn get_assets_by_glob(
        &self,
        dandiset: &Dandiset,
        pattern: &str,
    ) -> Result<Vec<Asset>, DandiError> {
        self.paginate(&self.version_assets_path(dandiset), &[("glob", pattern)])
            .await
    }

    async fn delete_asset(&self, dandiset: &Dandiset, asset_id: &str) -> Result<(), DandiError> {
        tracing::debug!(asset_id, dandiset = %dandiset.identifier, "deleting asset");
        self.delete(&format!("{}{asset_id}/", self.version_assets_path(dandiset)))
            .await
    }

    async fn delete_dandiset(&self, dandiset: &Dandiset) -> Result<(), DandiError> {
        tracing::debug!(dandiset = %dandiset.identifier, "deleting dandiset");
        self.delete(&format!("/dandisets/{}/", dandiset.identifier))
            .await
    }

    async fn create_dandiset(
        &self,
        name: &str,
        metadata: serde_json::Value,
    ) -> Result<Dandiset, DandiError> {
        let data: DandisetData = self
            .post(
                "/dandisets/",
                &serde_json::json!({ "name": name, "metadata": metadata }),
            )
            .await?;
        Ok(data.into_draft())
    }
}

/// Authenticating [`Connect`] implementation over [`DandiClient`].
pub struct DandiConnector {
    api_key: Option<String>,
}

impl DandiConnector {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }
}

#[async_trait]
impl Connect for DandiConnector {
    async fn connect(&self, api_url: &str) -> Result<Arc<dyn Archive>, DandiError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            DandiError::Auth("no API key configured; set DANDI_API_KEY".to_string())
        })?;
        let client = DandiClient::new(api_url, api_key)?;
        client.verify_credentials().await?;
        Ok(Arc::new(client))
    }
}

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, DandiError> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    } else {
        Err(error_from(status.as_u16(), resp.text().await.unwrap_or_default()))
    }
}

fn error_from(status: u16, body: String) -> DandiError {
    // Error bodies are usually {"detail": "..."} but not reliably so.
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
        .unwrap_or(body);
    match status {
        404 => DandiError::NotFound(message),
        401 | 403 => DandiError::Auth(message),
        _ => DandiError::Api { status, message },
    }
}
