use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::error::CatalogError;

/// Per-call deadline. The legacy importer had none and could hang
/// indefinitely on a stalled upload.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Status, `Location` header and body text of a catalog response,
/// independent of the HTTP implementation.
#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: u16,
    pub location: Option<String>,
    pub body: String,
}

impl WireResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn is_created(&self) -> bool {
        self.status == 201
    }

    pub fn is_accepted(&self) -> bool {
        self.status == 202
    }
}

/// Low-level HTTP operations against the catalog server. Query parameters
/// carry the credentials; the client layer builds them.
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<WireResponse, CatalogError>;

    async fn post_json(
        &self,
        path: &str,
        query: &[(String, String)],
        body: &serde_json::Value,
    ) -> Result<WireResponse, CatalogError>;

    async fn patch_json(
        &self,
        path: &str,
        query: &[(String, String)],
        body: &serde_json::Value,
    ) -> Result<WireResponse, CatalogError>;

    /// Multipart POST of one image file plus its deployment id.
    async fn post_image(
        &self,
        path: &str,
        query: &[(String, String)],
        deployment_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<WireResponse, CatalogError>;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn into_wire(resp: reqwest::Response) -> Result<WireResponse, CatalogError> {
        let status = resp.status().as_u16();
        let location = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = resp.text().await?;
        Ok(WireResponse {
            status,
            location,
            body,
        })
    }
}

#[async_trait]
impl CatalogTransport for HttpTransport {
    async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<WireResponse, CatalogError> {
        let resp = self.http.get(self.url(path)).query(query).send().await?;
        Self::into_wire(resp).await
    }

    async fn post_json(
        &self,
        path: &str,
        query: &[(String, String)],
        body: &serde_json::Value,
    ) -> Result<WireResponse, CatalogError> {
        let resp = self
            .http
            .post(self.url(path))
            .query(query)
            .json(body)
            .send()
            .await?;
        Self::into_wire(resp).await
    }

    async fn patch_json(
        &self,
        path: &str,
        query: &[(String, String)],
        body: &serde_json::Value,
    ) -> Result<WireResponse, CatalogError> {
        let resp = self
            .http
            .patch(self.url(path))
            .query(query)
            .json(body)
            .send()
            .await?;
        Self::into_wire(resp).await
    }

    async fn post_image(
        &self,
        path: &str,
        query: &[(String, String)],
        deployment_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<WireResponse, CatalogError> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new()
            .text("deployment", deployment_id.to_string())
            .part("img", part);
        let resp = self
            .http
            .post(self.url(path))
            .query(query)
            .multipart(form)
            .send()
            .await?;
        Self::into_wire(resp).await
    }
}
