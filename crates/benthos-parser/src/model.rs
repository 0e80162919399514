use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Required format version for campaign.txt, description.txt and images.csv.
pub const FORMAT_VERSION: &str = "1.0";

pub const CAMPAIGN_FILENAME: &str = "campaign.txt";
pub const DESCRIPTION_FILENAME: &str = "description.txt";
pub const MANIFEST_FILENAME: &str = "images.csv";

/// Legacy fill value marking a missing numeric field on the wire.
pub const NUMERIC_FILL: f64 = -999.0;
/// Legacy fill value marking a missing text field on the wire.
pub const TEXT_FILL: &str = "null";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentType {
    Auv,
    Bruv,
    Ti,
    Dov,
    Tv,
}

impl DeploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentType::Auv => "AUV",
            DeploymentType::Bruv => "BRUV",
            DeploymentType::Ti => "TI",
            DeploymentType::Dov => "DOV",
            DeploymentType::Tv => "TV",
        }
    }
}

impl fmt::Display for DeploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DeploymentType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "AUV" => Ok(DeploymentType::Auv),
            "BRUV" => Ok(DeploymentType::Bruv),
            "TI" => Ok(DeploymentType::Ti),
            "DOV" => Ok(DeploymentType::Dov),
            "TV" => Ok(DeploymentType::Tv),
            other => Err(format!("unknown deployment type '{other}'")),
        }
    }
}

/// One row of images.csv, in manifest order. Order is semantically
/// meaningful: the first and last records define the deployment's
/// start/end position and time.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub capture_time: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub depth: Option<f64>,
    pub image_name: String,
    pub camera_name: String,
    pub camera_angle: String,
    pub temperature: Option<f64>,
    pub salinity: Option<f64>,
    pub pitch: Option<f64>,
    pub roll: Option<f64>,
    pub yaw: Option<f64>,
    pub altitude: Option<f64>,
}

impl ImageRecord {
    /// Both coordinates present. Records failing this are excluded from
    /// envelope aggregation and from every upload payload.
    pub fn has_position(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentDescriptor {
    pub version: String,
    pub deployment_type: DeploymentType,
    pub description: String,
    pub operator: String,
    pub keywords: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignDescriptor {
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

/// A deployment directory read into memory: descriptor plus the ordered
/// manifest records.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub path: PathBuf,
    pub descriptor: DeploymentDescriptor,
    pub records: Vec<ImageRecord>,
}

impl Deployment {
    /// Directory name, used as the deployment's natural key on the server.
    pub fn short_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
