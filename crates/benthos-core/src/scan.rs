use std::path::Path;

use benthos_catalog::DeploymentPayload;
use benthos_parser::{read_deployment, Deployment, ImageRecord};
use tracing::info;

use crate::envelope::Envelope;
use crate::error::UploadError;

/// Default license attached to every deployment header.
pub const DEFAULT_LICENSE: &str = "CC-BY";

/// A deployment read from disk together with its derived envelope,
/// ready to be turned into the deployment-creation payload.
#[derive(Debug, Clone)]
pub struct DeploymentScan {
    pub deployment: Deployment,
    pub envelope: Envelope,
}

impl DeploymentScan {
    /// Builds the deployment header payload. The campaign URI is attached
    /// here; the deployment files themselves do not know their campaign.
    pub fn deployment_payload(&self, campaign_uri: &str, license: &str) -> DeploymentPayload {
        let descriptor = &self.deployment.descriptor;
        DeploymentPayload {
            deployment_type: descriptor.deployment_type.as_str().to_string(),
            start_position: self.envelope.start_position.clone(),
            end_position: self.envelope.end_position.clone(),
            transect_shape: self.envelope.transect_shape(),
            start_time_stamp: self.envelope.start_time.clone(),
            end_time_stamp: self.envelope.end_time.clone(),
            short_name: self.deployment.short_name(),
            mission_aim: descriptor.description.clone(),
            min_depth: self.envelope.min_depth,
            max_depth: self.envelope.max_depth,
            campaign: campaign_uri.to_string(),
            contact_person: descriptor.operator.clone(),
            descriptive_keywords: descriptor.keywords.clone(),
            license: license.to_string(),
        }
    }

    /// Records carrying both coordinates, in manifest order. Everything
    /// downstream of the deployment header (metadata, camera, measurement
    /// and binary upload) operates on exactly this subset; records without
    /// a position are skipped silently by policy, not rejected.
    pub fn geolocated_records(&self) -> Vec<&ImageRecord> {
        self.deployment
            .records
            .iter()
            .filter(|r| r.has_position())
            .collect()
    }
}

/// Reads and aggregates one deployment directory.
pub fn scan_deployment(path: &Path) -> Result<DeploymentScan, UploadError> {
    info!(path = %path.display(), "scanning deployment");
    let deployment = read_deployment(path)?;
    let envelope = Envelope::compute(&deployment.records).map_err(|source| {
        UploadError::Envelope {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(DeploymentScan {
        deployment,
        envelope,
    })
}
