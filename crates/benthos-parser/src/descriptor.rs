use std::fs;
use std::path::Path;

use crate::errors::ParseError;
use crate::model::{DeploymentDescriptor, DeploymentType, DESCRIPTION_FILENAME, FORMAT_VERSION};

/// Reads `description.txt` under `deployment_path`.
///
/// Lines are `Label:value` pairs, labels matched case-insensitively.
/// Unrecognized labels are ignored, matching the behaviour of the legacy
/// importer (only campaign files reject unknown labels).
pub fn read_description_file(deployment_path: &Path) -> Result<DeploymentDescriptor, ParseError> {
    let path = deployment_path.join(DESCRIPTION_FILENAME);
    if !path.is_file() {
        return Err(ParseError::MissingFile(path));
    }
    let contents = fs::read_to_string(&path).map_err(|source| ParseError::Io {
        path: path.clone(),
        source,
    })?;
    parse_description(&contents)
}

pub fn parse_description(contents: &str) -> Result<DeploymentDescriptor, ParseError> {
    let mut version = String::new();
    let mut type_text = String::new();
    let mut description = String::new();
    let mut operator = String::new();
    let mut keywords = String::new();

    for line in contents.lines() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let label = label.trim();
        if label.eq_ignore_ascii_case("Version") {
            version = value.trim().to_string();
        } else if label.eq_ignore_ascii_case("Type") {
            type_text = value.trim().to_string();
        } else if label.eq_ignore_ascii_case("Description") {
            description = value.trim().to_string();
        } else if label.eq_ignore_ascii_case("Operator") {
            operator = value.trim().to_string();
        } else if label.eq_ignore_ascii_case("Keywords") {
            keywords = value.trim().to_string();
        }
    }

    if version.replace(' ', "") != FORMAT_VERSION {
        return Err(ParseError::UnsupportedVersion {
            file: DESCRIPTION_FILENAME.to_string(),
            found: version,
        });
    }

    let deployment_type = DeploymentType::try_from(type_text.as_str())
        .map_err(|_| ParseError::UnknownDeploymentType(type_text.clone()))?;

    Ok(DeploymentDescriptor {
        version,
        deployment_type,
        description,
        operator,
        keywords,
    })
}
