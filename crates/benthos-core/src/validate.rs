//! Pre-flight structural and content checks over a campaign package.
//! Read-only: nothing here mutates files or talks to the network.

use std::fmt;
use std::fs;
use std::path::Path;

use benthos_parser::{
    read_campaign_file, read_description_file, read_manifest, ImageRecord, CAMPAIGN_FILENAME,
    DESCRIPTION_FILENAME, MANIFEST_FILENAME,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Missing optional data; reported but never blocks an upload.
    Warning,
    /// Missing required data or broken content; the verdict is incomplete.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("WARNING"),
            Severity::Error => f.write_str("ERROR"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Finding {
    pub severity: Severity,
    pub location: String,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.location, self.message)
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    fn error(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.findings.push(Finding {
            severity: Severity::Error,
            location: location.into(),
            message: message.into(),
        });
    }

    fn warning(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.findings.push(Finding {
            severity: Severity::Warning,
            location: location.into(),
            message: message.into(),
        });
    }

    /// True when no error-severity finding was recorded. Warnings do not
    /// affect the verdict.
    pub fn is_complete(&self) -> bool {
        !self
            .findings
            .iter()
            .any(|f| f.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }
}

/// Validates the whole campaign package: the campaign file, then every
/// deployment directory beneath the root.
pub fn validate_campaign(root: &Path) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !root.is_dir() {
        report.error(
            root.display().to_string(),
            "not a directory; check the path to your data package",
        );
        return report;
    }

    match read_campaign_file(root) {
        Ok(campaign) => {
            let location = root.join(CAMPAIGN_FILENAME).display().to_string();
            let required = [
                ("campaign name", &campaign.short_name),
                ("description", &campaign.description),
                ("associated researchers", &campaign.associated_researchers),
                ("associated publications", &campaign.associated_publications),
                (
                    "associated research grants",
                    &campaign.associated_research_grants,
                ),
                ("start date", &campaign.date_start),
                ("end date", &campaign.date_end),
                ("contact person", &campaign.contact_person),
            ];
            for (label, value) in required {
                if value.trim().is_empty() {
                    report.error(&location, format!("{label} is required"));
                }
            }
        }
        Err(err) => {
            report.error(root.display().to_string(), err.to_string());
        }
    }

    let deployments = deployment_dirs(root);
    if deployments.is_empty() {
        report.error(
            root.display().to_string(),
            "no deployment directories found to import",
        );
    }
    for dir in deployments {
        validate_deployment(&dir, &mut report);
    }

    report
}

/// Deployment directories under the root, dot-directories ignored,
/// sorted for stable reporting and upload order.
pub fn deployment_dirs(root: &Path) -> Vec<std::path::PathBuf> {
    let mut dirs: Vec<_> = fs::read_dir(root)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    p.is_dir()
                        && !p
                            .file_name()
                            .map(|n| n.to_string_lossy().starts_with('.'))
                            .unwrap_or(true)
                })
                .collect()
        })
        .unwrap_or_default();
    dirs.sort();
    dirs
}

/// Validates one deployment directory: descriptor, manifest rows and the
/// referenced image binaries.
pub fn validate_deployment(path: &Path, report: &mut ValidationReport) {
    debug!(path = %path.display(), "validating deployment");
    let location = path.display().to_string();

    match read_description_file(path) {
        Ok(descriptor) => {
            if descriptor.description.trim().is_empty() {
                report.error(
                    format!("{location}/{DESCRIPTION_FILENAME}"),
                    "deployment description is required",
                );
            }
        }
        Err(err) => {
            report.error(format!("{location}/{DESCRIPTION_FILENAME}"), err.to_string());
        }
    }

    let records = match read_manifest(path) {
        Ok(records) => records,
        Err(err) => {
            report.error(format!("{location}/{MANIFEST_FILENAME}"), err.to_string());
            return;
        }
    };

    let mut good_images = 0usize;
    let mut bad_images = 0usize;

    for (index, record) in records.iter().enumerate() {
        // rows 1 and 2 of the file are the header preamble
        let row = index + 3;
        let row_location = format!("{location}/{MANIFEST_FILENAME} row {row}");

        validate_record_fields(record, &row_location, report);

        if record.image_name.is_empty() {
            continue;
        }
        let image_path = path.join(&record.image_name);
        if !image_path.is_file() {
            report.error(&row_location, format!("{} is referenced but missing", record.image_name));
            continue;
        }
        match fs::read(&image_path) {
            Ok(bytes) => match validate_image_bytes(&bytes) {
                Ok(()) => good_images += 1,
                Err(err) => {
                    bad_images += 1;
                    report.error(
                        &row_location,
                        format!("{} appears to be an invalid image: {err}", record.image_name),
                    );
                }
            },
            Err(err) => {
                bad_images += 1;
                report.error(&row_location, format!("cannot read {}: {err}", record.image_name));
            }
        }
    }

    debug!(good_images, bad_images, path = %path.display(), "image check finished");
}

fn validate_record_fields(record: &ImageRecord, location: &str, report: &mut ValidationReport) {
    if record.capture_time.is_empty() {
        report.error(location, "Time is required");
    }
    if record.latitude.is_none() {
        report.error(location, "Latitude is required");
    }
    if record.longitude.is_none() {
        report.error(location, "Longitude is required");
    }
    if record.depth.is_none() {
        report.error(location, "Depth is required");
    }
    if record.image_name.is_empty() {
        report.error(location, "ImageName is required");
    }
    if record.camera_name.is_empty() {
        report.error(location, "CameraName is required");
    }
    if record.camera_angle.is_empty() {
        report.error(location, "CameraAngle is required");
    }

    let optional = [
        ("Temperature", record.temperature),
        ("Salinity", record.salinity),
        ("Pitch", record.pitch),
        ("Roll", record.roll),
        ("Yaw", record.yaw),
        ("Altitude", record.altitude),
    ];
    for (label, value) in optional {
        if value.is_none() {
            report.warning(location, format!("{label} is missing"));
        }
    }
}

/// Decodes the bytes as an image. Zero tolerance: any referenced image
/// that fails to decode makes the deployment's verdict incomplete.
pub fn validate_image_bytes(bytes: &[u8]) -> Result<(), image::ImageError> {
    image::load_from_memory(bytes).map(|_| ())
}
