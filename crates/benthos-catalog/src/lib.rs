//! Async client for the benthic survey catalog REST API.
//!
//! All network traffic goes through the [`CatalogTransport`] trait so the
//! create-or-resume and duplicate-detection logic can be exercised against
//! an in-memory transport in tests.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod transport;
pub mod wire;

pub use client::{CatalogClient, Credentials};
pub use endpoints::ApiFlavor;
pub use error::CatalogError;
pub use transport::{CatalogTransport, HttpTransport, WireResponse};
pub use wire::{
    CameraPayload, CampaignPayload, DeploymentPayload, ImageMetadataPayload, MeasurementPayload,
};
