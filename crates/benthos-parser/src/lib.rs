pub mod campaign;
pub mod deployment;
pub mod descriptor;
pub mod errors;
pub mod manifest;
pub mod model;

pub use campaign::read_campaign_file;
pub use deployment::read_deployment;
pub use descriptor::read_description_file;
pub use errors::ParseError;
pub use manifest::{parse_manifest, read_manifest};
pub use model::{
    CampaignDescriptor, Deployment, DeploymentDescriptor, DeploymentType, ImageRecord,
    CAMPAIGN_FILENAME, DESCRIPTION_FILENAME, FORMAT_VERSION, MANIFEST_FILENAME, NUMERIC_FILL,
    TEXT_FILL,
};
