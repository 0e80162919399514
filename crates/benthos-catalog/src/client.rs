use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::endpoints::ApiFlavor;
use crate::error::CatalogError;
use crate::transport::{CatalogTransport, WireResponse};
use crate::wire::{
    CameraPayload, CampaignPayload, DeploymentPayload, ImageMetadataPayload, MeasurementPayload,
};

/// Substring the server embeds in the body of a POST that hit an existing
/// natural key. Matching it is the only duplicate signal the API offers.
const DUPLICATE_KEY_MESSAGE: &str = "duplicate key value violates unique constraint";

/// Body fragments marking an image whose destination file already exists
/// on the server. Treated as success, not as a duplicate error.
const IMAGE_EXISTS_HEAD: &str = "Destination path";
const IMAGE_EXISTS_TAIL: &str = "already exists";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
struct ResourceRef {
    resource_uri: String,
}

#[derive(Debug, Deserialize)]
struct Collection {
    objects: Vec<ResourceRef>,
}

/// Stateful wrapper over the catalog REST resources. Credentials ride as
/// query parameters on every call; there is no session or token exchange.
pub struct CatalogClient {
    transport: Arc<dyn CatalogTransport>,
    credentials: Credentials,
    flavor: ApiFlavor,
}

impl CatalogClient {
    pub fn new(
        transport: Arc<dyn CatalogTransport>,
        credentials: Credentials,
        flavor: ApiFlavor,
    ) -> Self {
        Self {
            transport,
            credentials,
            flavor,
        }
    }

    pub fn flavor(&self) -> ApiFlavor {
        self.flavor
    }

    fn auth_query(&self) -> Vec<(String, String)> {
        vec![
            ("username".to_string(), self.credentials.username.clone()),
            ("api_key".to_string(), self.credentials.api_key.clone()),
        ]
    }

    /// GETs each write endpoint and requires a 200 before any write traffic
    /// is sent. Fails on the first unavailable endpoint.
    pub async fn probe(&self) -> Result<(), CatalogError> {
        for path in self.flavor.probe_paths() {
            let resp = self.transport.get(path, &self.auth_query()).await?;
            if !resp.is_ok() {
                return Err(CatalogError::Unavailable {
                    path: path.to_string(),
                    status: resp.status,
                });
            }
            debug!(path, "endpoint available");
        }
        Ok(())
    }

    /// Creates the campaign resource, or resumes it by natural key
    /// (short name plus start date) when the server reports a duplicate.
    pub async fn create_campaign(
        &self,
        payload: &CampaignPayload,
    ) -> Result<String, CatalogError> {
        let resume_query = vec![
            ("short_name".to_string(), payload.short_name.clone()),
            ("date_start".to_string(), payload.date_start.clone()),
        ];
        self.create_or_resume(
            "campaign",
            self.flavor.campaign(),
            serde_json::to_value(payload)?,
            payload.short_name.clone(),
            resume_query,
        )
        .await
    }

    /// Creates the deployment resource, or resumes it by short name.
    pub async fn create_deployment(
        &self,
        payload: &DeploymentPayload,
    ) -> Result<String, CatalogError> {
        let resume_query = vec![("short_name".to_string(), payload.short_name.clone())];
        self.create_or_resume(
            "deployment",
            self.flavor.deployment(),
            serde_json::to_value(payload)?,
            payload.short_name.clone(),
            resume_query,
        )
        .await
    }

    async fn create_or_resume(
        &self,
        resource: &'static str,
        path: &str,
        body: serde_json::Value,
        key: String,
        resume_query: Vec<(String, String)>,
    ) -> Result<String, CatalogError> {
        let resp = self
            .transport
            .post_json(path, &self.auth_query(), &body)
            .await?;

        if resp.is_created() {
            let uri = resp.location.ok_or_else(|| CatalogError::MissingLocation {
                path: path.to_string(),
            })?;
            info!(resource, %uri, "created");
            return Ok(uri);
        }

        if !body_reports_duplicate(&resp) {
            return Err(CatalogError::Rejected {
                path: path.to_string(),
                status: resp.status,
                body: resp.body,
            });
        }

        // The resource already exists; resolve it by natural key and
        // require exactly one match.
        let mut query = self.auth_query();
        query.extend(resume_query);
        let resp = self.transport.get(path, &query).await?;
        if !resp.is_ok() {
            return Err(CatalogError::Rejected {
                path: path.to_string(),
                status: resp.status,
                body: resp.body,
            });
        }

        let collection: Collection = serde_json::from_str(&resp.body)?;
        let found = collection.objects.len();
        match collection.objects.into_iter().next() {
            Some(existing) if found == 1 => {
                info!(resource, uri = %existing.resource_uri, "resuming upload of existing resource");
                Ok(existing.resource_uri)
            }
            _ => Err(CatalogError::AmbiguousResume {
                resource,
                key,
                found,
            }),
        }
    }

    /// Bulk image metadata upsert. The returned resource URIs are in
    /// request order; later camera/measurement stages join to them by index.
    pub async fn patch_images(
        &self,
        payloads: &[ImageMetadataPayload],
    ) -> Result<Vec<String>, CatalogError> {
        let path = self.flavor.image();
        let resp = self.bulk_patch(path, serde_json::to_value(payloads)?).await?;
        let collection: Collection = serde_json::from_str(&resp.body)?;
        Ok(collection
            .objects
            .into_iter()
            .map(|o| o.resource_uri)
            .collect())
    }

    pub async fn patch_cameras(&self, payloads: &[CameraPayload]) -> Result<(), CatalogError> {
        self.bulk_patch(self.flavor.camera(), serde_json::to_value(payloads)?)
            .await?;
        Ok(())
    }

    pub async fn patch_measurements(
        &self,
        payloads: &[MeasurementPayload],
    ) -> Result<(), CatalogError> {
        self.bulk_patch(self.flavor.measurements(), serde_json::to_value(payloads)?)
            .await?;
        Ok(())
    }

    async fn bulk_patch(
        &self,
        path: &str,
        objects: serde_json::Value,
    ) -> Result<WireResponse, CatalogError> {
        let body = serde_json::json!({ "objects": objects });
        let resp = self
            .transport
            .patch_json(path, &self.auth_query(), &body)
            .await?;
        if !resp.is_accepted() {
            return Err(CatalogError::Rejected {
                path: path.to_string(),
                status: resp.status,
                body: resp.body,
            });
        }
        Ok(resp)
    }

    /// Posts one image binary. A destination-already-exists response counts
    /// as success so interrupted runs can be resumed without re-sending.
    pub async fn upload_image(
        &self,
        deployment_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), CatalogError> {
        let path = self.flavor.image_upload();
        let resp = self
            .transport
            .post_image(path, &self.auth_query(), deployment_id, file_name, bytes)
            .await?;

        if resp.body.contains(IMAGE_EXISTS_HEAD) && resp.body.contains(IMAGE_EXISTS_TAIL) {
            debug!(file_name, "image already on server, skipping");
            return Ok(());
        }
        if !resp.is_created() {
            return Err(CatalogError::Rejected {
                path: path.to_string(),
                status: resp.status,
                body: resp.body,
            });
        }
        Ok(())
    }
}

fn body_reports_duplicate(resp: &WireResponse) -> bool {
    resp.body.to_lowercase().contains(DUPLICATE_KEY_MESSAGE)
}
