use std::fmt;

use benthos_parser::ImageRecord;

use crate::error::UploadError;

/// Canonical camera orientation codes understood by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraAngle {
    Downward,
    Upward,
    SlantingOblique,
    HorizontalSeascape,
}

impl CameraAngle {
    pub fn code(&self) -> u8 {
        match self {
            CameraAngle::Downward => 0,
            CameraAngle::Upward => 1,
            CameraAngle::SlantingOblique => 2,
            CameraAngle::HorizontalSeascape => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CameraAngle::Downward => "Downward",
            CameraAngle::Upward => "Upward",
            CameraAngle::SlantingOblique => "Slanting/Oblique",
            CameraAngle::HorizontalSeascape => "Horizontal/Seascape",
        }
    }
}

impl fmt::Display for CameraAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CameraAngle {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "downward" => Ok(CameraAngle::Downward),
            "upward" => Ok(CameraAngle::Upward),
            "slanting/oblique" => Ok(CameraAngle::SlantingOblique),
            "horizontal/seascape" => Ok(CameraAngle::HorizontalSeascape),
            other => Err(format!("unknown camera angle '{other}'")),
        }
    }
}

/// Resolves the deployment's single camera from the last record of the
/// given sequence. One camera per deployment is assumed; the last record
/// is used consistently. An unrecognized angle label aborts the
/// deployment's upload, there is no salvage path.
pub fn resolve_camera(records: &[&ImageRecord]) -> Result<(String, CameraAngle), UploadError> {
    let record = records
        .last()
        .ok_or_else(|| UploadError::UnknownCameraAngle(String::new()))?;
    let angle = CameraAngle::try_from(record.camera_angle.as_str())
        .map_err(|_| UploadError::UnknownCameraAngle(record.camera_angle.clone()))?;
    Ok((record.camera_name.clone(), angle))
}
