pub mod camera;
pub mod envelope;
pub mod error;
pub mod scan;
pub mod upload;
pub mod validate;

pub use camera::CameraAngle;
pub use envelope::{Envelope, EnvelopeError, GeoBounds};
pub use error::UploadError;
pub use scan::{scan_deployment, DeploymentScan};
pub use upload::{UploadConfig, UploadPipeline};
pub use validate::{validate_campaign, validate_deployment, Finding, Severity, ValidationReport};
