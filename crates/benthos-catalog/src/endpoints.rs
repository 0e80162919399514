use std::fmt;

/// Which family of API resource paths to address.
///
/// The standard flavor serves towed-imagery and AUV catalog entries; the
/// generic flavor is a parallel resource set (`generic_deployment/`,
/// `generic_image/`, `generic_camera/`) some servers expose for other
/// platform types. Campaign, measurement and binary-upload paths are shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiFlavor {
    #[default]
    Standard,
    Generic,
}

impl ApiFlavor {
    pub fn campaign(&self) -> &'static str {
        "/api/dev/campaign/"
    }

    pub fn deployment(&self) -> &'static str {
        match self {
            ApiFlavor::Standard => "/api/dev/deployment/",
            ApiFlavor::Generic => "/api/dev/generic_deployment/",
        }
    }

    pub fn image(&self) -> &'static str {
        match self {
            ApiFlavor::Standard => "/api/dev/image/",
            ApiFlavor::Generic => "/api/dev/generic_image/",
        }
    }

    pub fn camera(&self) -> &'static str {
        match self {
            ApiFlavor::Standard => "/api/dev/camera/",
            ApiFlavor::Generic => "/api/dev/generic_camera/",
        }
    }

    pub fn measurements(&self) -> &'static str {
        "/api/dev/measurements/"
    }

    pub fn image_upload(&self) -> &'static str {
        "/api/dev/image_upload/"
    }

    /// Endpoints probed before any write traffic is sent.
    pub fn probe_paths(&self) -> [&'static str; 4] {
        [
            self.deployment(),
            self.image(),
            self.camera(),
            self.measurements(),
        ]
    }
}

impl fmt::Display for ApiFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFlavor::Standard => f.write_str("standard"),
            ApiFlavor::Generic => f.write_str("generic"),
        }
    }
}

impl TryFrom<&str> for ApiFlavor {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(ApiFlavor::Standard),
            "generic" => Ok(ApiFlavor::Generic),
            other => Err(format!("unknown API flavor '{other}'")),
        }
    }
}
