//! Wire payload shapes for the catalog API.
//!
//! Field names and the missing-value sentinels are part of the server
//! contract inherited from the legacy importer and must not be changed.

use serde::Serialize;

/// Numeric fill value the server expects for a missing measurement.
const NUMERIC_FILL: f64 = -999.0;

#[derive(Debug, Clone, Serialize)]
pub struct CampaignPayload {
    pub version: String,
    pub short_name: String,
    pub description: String,
    pub associated_researchers: String,
    pub associated_publications: String,
    pub associated_research_grants: String,
    pub date_start: String,
    pub date_end: String,
    pub contact_person: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentPayload {
    #[serde(rename = "type")]
    pub deployment_type: String,
    /// `SRID=4326;POINT(lon lat)`
    pub start_position: String,
    pub end_position: String,
    /// `SRID=4326;POLYGON((...))` bounding ring
    pub transect_shape: String,
    pub start_time_stamp: String,
    pub end_time_stamp: String,
    pub short_name: String,
    pub mission_aim: String,
    pub min_depth: f64,
    pub max_depth: f64,
    /// Resource URI of the owning campaign.
    pub campaign: String,
    pub contact_person: String,
    pub descriptive_keywords: String,
    pub license: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageMetadataPayload {
    pub web_location: String,
    pub archive_location: String,
    pub image_name: String,
    /// Resource URI path of the owning deployment.
    pub deployment: String,
    pub date_time: String,
    /// `SRID=4326;POINT(lon lat)`
    pub position: String,
    pub depth: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CameraPayload {
    pub name: String,
    /// Canonical orientation code, serialized as a numeric string.
    pub angle: String,
    /// Resource URI path of the image this camera record belongs to.
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeasurementPayload {
    pub image: String,
    #[serde(with = "numeric_fill")]
    pub temperature: Option<f64>,
    #[serde(with = "numeric_fill")]
    pub salinity: Option<f64>,
    #[serde(with = "numeric_fill")]
    pub pitch: Option<f64>,
    #[serde(with = "numeric_fill")]
    pub roll: Option<f64>,
    #[serde(with = "numeric_fill")]
    pub yaw: Option<f64>,
    #[serde(with = "numeric_fill")]
    pub altitude: Option<f64>,
}

mod numeric_fill {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(
        value: &Option<f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.unwrap_or(super::NUMERIC_FILL))
    }
}
