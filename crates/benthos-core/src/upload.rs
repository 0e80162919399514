//! The campaign/deployment upload pipeline.
//!
//! Metadata stages are strictly ordered because each consumes identifiers
//! returned by the previous one; only the per-image binary stage runs
//! through a bounded worker pool, since those calls are independent and
//! idempotent.

use std::path::Path;
use std::sync::Arc;

use benthos_catalog::{
    CameraPayload, CampaignPayload, CatalogClient, ImageMetadataPayload, MeasurementPayload,
};
use benthos_parser::{read_campaign_file, CampaignDescriptor, ImageRecord, NUMERIC_FILL};
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::camera::resolve_camera;
use crate::envelope::point_wkt;
use crate::error::UploadError;
use crate::scan::{scan_deployment, DEFAULT_LICENSE};
use crate::validate::deployment_dirs;

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Width of the image upload worker pool.
    pub concurrency: usize,
    /// License string attached to each deployment header.
    pub license: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            license: DEFAULT_LICENSE.to_string(),
        }
    }
}

pub struct UploadPipeline {
    client: Arc<CatalogClient>,
    config: UploadConfig,
}

impl UploadPipeline {
    pub fn new(client: CatalogClient, config: UploadConfig) -> Self {
        Self {
            client: Arc::new(client),
            config,
        }
    }

    /// Uploads a whole campaign package: the campaign header once, then
    /// every deployment directory in name order. The first deployment
    /// failure aborts the run; interrupted runs are recovered by
    /// re-invoking, which resumes via duplicate detection.
    pub async fn upload_campaign(&self, root: &Path) -> Result<String, UploadError> {
        let campaign = read_campaign_file(root)?;
        info!(short_name = %campaign.short_name, "uploading campaign header");
        let campaign_uri = self.client.create_campaign(&campaign_payload(&campaign)).await?;

        let dirs = deployment_dirs(root);
        if dirs.is_empty() {
            return Err(UploadError::NoDeployments(root.to_path_buf()));
        }
        for dir in dirs {
            self.upload_deployment(&dir, uri_path(&campaign_uri)).await?;
        }
        Ok(campaign_uri)
    }

    /// Uploads one deployment into an existing campaign. Stage order is
    /// mandatory: probe, scan, header, image metadata, camera/measurement,
    /// then binaries.
    pub async fn upload_deployment(
        &self,
        path: &Path,
        campaign_uri: &str,
    ) -> Result<(), UploadError> {
        // fail before any write traffic if an endpoint is down
        self.client.probe().await?;

        let scan = scan_deployment(path)?;
        let payload = scan.deployment_payload(campaign_uri, &self.config.license);
        info!(short_name = %payload.short_name, "uploading deployment header");
        let deployment_uri = self.client.create_deployment(&payload).await?;
        let deployment_ref = uri_path(&deployment_uri).to_string();
        let deployment_id = uri_id(&deployment_uri).to_string();

        let filtered = scan.geolocated_records();

        let metadata: Vec<ImageMetadataPayload> = filtered
            .iter()
            .map(|record| image_metadata_payload(record, &deployment_ref))
            .collect();
        info!(count = metadata.len(), "uploading image metadata");
        let image_uris = self.client.patch_images(&metadata).await?;
        // later stages join camera/measurement records to these identifiers
        // purely by index, so the batch must come back 1:1 and in order
        if image_uris.len() != metadata.len() {
            return Err(UploadError::BatchLengthMismatch {
                submitted: metadata.len(),
                returned: image_uris.len(),
            });
        }

        let (_, angle) = resolve_camera(&filtered)?;
        let cameras: Vec<CameraPayload> = filtered
            .iter()
            .zip(&image_uris)
            .map(|(record, uri)| CameraPayload {
                name: record.camera_name.clone(),
                angle: angle.code().to_string(),
                image: uri_path(uri).to_string(),
            })
            .collect();
        let measurements: Vec<MeasurementPayload> = filtered
            .iter()
            .zip(&image_uris)
            .map(|(record, uri)| MeasurementPayload {
                image: uri_path(uri).to_string(),
                temperature: record.temperature,
                salinity: record.salinity,
                pitch: record.pitch,
                roll: record.roll,
                yaw: record.yaw,
                altitude: record.altitude,
            })
            .collect();
        info!(count = cameras.len(), "uploading camera metadata");
        self.client.patch_cameras(&cameras).await?;
        info!(count = measurements.len(), "uploading measurement metadata");
        self.client.patch_measurements(&measurements).await?;

        let names: Vec<String> = filtered.iter().map(|r| r.image_name.clone()).collect();
        self.upload_binaries(path, &deployment_id, &names).await?;

        info!(short_name = %payload.short_name, "deployment upload finished");
        Ok(())
    }

    /// First image goes up synchronously so the server creates the
    /// deployment directory; the rest run through the worker pool.
    async fn upload_binaries(
        &self,
        dir: &Path,
        deployment_id: &str,
        names: &[String],
    ) -> Result<(), UploadError> {
        let Some(first) = names.first() else {
            return Ok(());
        };
        let first_path = dir.join(first);
        let bytes = tokio::fs::read(&first_path)
            .await
            .map_err(|_| UploadError::MissingImageFile(first_path.clone()))?;
        self.client
            .upload_image(deployment_id, first, bytes)
            .await?;

        let submitted = names.len() - 1;
        info!(submitted, width = self.config.concurrency, "uploading images");

        let completed = stream::iter(names[1..].iter().cloned())
            .map(|name| {
                let client = Arc::clone(&self.client);
                let dir = dir.to_path_buf();
                let deployment_id = deployment_id.to_string();
                async move {
                    let file = dir.join(&name);
                    let bytes = match tokio::fs::read(&file).await {
                        Ok(bytes) => bytes,
                        Err(err) => {
                            warn!(image = %name, %err, "failed to read image file");
                            return false;
                        }
                    };
                    match client.upload_image(&deployment_id, &name, bytes).await {
                        Ok(()) => true,
                        Err(err) => {
                            warn!(image = %name, %err, "image upload failed");
                            false
                        }
                    }
                }
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .filter(|ok| futures::future::ready(*ok))
            .count()
            .await;

        // individual worker failures are logged, not propagated; the
        // completion count is the contract
        if completed < submitted {
            return Err(UploadError::PartialUpload {
                completed,
                submitted,
            });
        }
        Ok(())
    }
}

fn campaign_payload(campaign: &CampaignDescriptor) -> CampaignPayload {
    CampaignPayload {
        version: campaign.version.clone(),
        short_name: campaign.short_name.clone(),
        description: campaign.description.clone(),
        associated_researchers: campaign.associated_researchers.clone(),
        associated_publications: campaign.associated_publications.clone(),
        associated_research_grants: campaign.associated_research_grants.clone(),
        date_start: campaign.date_start.clone(),
        date_end: campaign.date_end.clone(),
        contact_person: campaign.contact_person.clone(),
    }
}

fn image_metadata_payload(record: &ImageRecord, deployment_ref: &str) -> ImageMetadataPayload {
    ImageMetadataPayload {
        web_location: String::new(),
        archive_location: "None".to_string(),
        image_name: record.image_name.clone(),
        deployment: deployment_ref.to_string(),
        date_time: record.capture_time.clone(),
        position: point_wkt(record.longitude, record.latitude),
        depth: record.depth.unwrap_or(NUMERIC_FILL),
    }
}

/// Path component of a resource URI. `Location` headers come back as
/// absolute URLs; resource references on the wire carry only the path.
fn uri_path(uri: &str) -> &str {
    match uri.find("://") {
        Some(scheme_end) => {
            let rest = &uri[scheme_end + 3..];
            match rest.find('/') {
                Some(idx) => &rest[idx..],
                None => "/",
            }
        }
        None => uri,
    }
}

/// Trailing id segment of a resource URI, used by the binary upload form.
fn uri_id(uri: &str) -> &str {
    uri_path(uri)
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_path_strips_scheme_and_host() {
        assert_eq!(
            uri_path("http://catalog.example.org/api/dev/deployment/12/"),
            "/api/dev/deployment/12/"
        );
        assert_eq!(uri_path("/api/dev/deployment/12/"), "/api/dev/deployment/12/");
        assert_eq!(uri_path("http://catalog.example.org"), "/");
    }

    #[test]
    fn uri_id_takes_trailing_segment() {
        assert_eq!(uri_id("http://catalog.example.org/api/dev/deployment/12/"), "12");
        assert_eq!(uri_id("/api/dev/campaign/3/"), "3");
    }
}
