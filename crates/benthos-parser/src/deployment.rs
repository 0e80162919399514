use std::path::Path;

use crate::descriptor::read_description_file;
use crate::errors::ParseError;
use crate::manifest::read_manifest;
use crate::model::Deployment;

/// Reads a deployment directory: `description.txt` plus the ordered
/// `images.csv` manifest. Callers are expected to have run the validator
/// first; this fails fast on anything structurally wrong.
pub fn read_deployment(path: &Path) -> Result<Deployment, ParseError> {
    let descriptor = read_description_file(path)?;
    let records = read_manifest(path)?;
    Ok(Deployment {
        path: path.to_path_buf(),
        descriptor,
        records,
    })
}
