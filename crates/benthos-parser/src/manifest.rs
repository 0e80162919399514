use std::fs;
use std::path::Path;

use crate::errors::ParseError;
use crate::model::{ImageRecord, MANIFEST_FILENAME, NUMERIC_FILL};

/// Column count of the fixed manifest layout (Time through Altitude).
pub const MANIFEST_COLUMNS: usize = 13;

/// Reads and parses `images.csv` under `deployment_path`.
pub fn read_manifest(deployment_path: &Path) -> Result<Vec<ImageRecord>, ParseError> {
    let path = deployment_path.join(MANIFEST_FILENAME);
    if !path.is_file() {
        return Err(ParseError::MissingFile(path));
    }
    let raw = fs::read(&path).map_err(|source| ParseError::Io {
        path: path.clone(),
        source,
    })?;
    parse_manifest(&raw)
}

/// Parses manifest bytes. The first two rows (version line and column
/// header) are skipped; every following row must carry the 13 fixed
/// positional columns. NUL bytes are stripped before parsing, a known
/// corruption in packages produced by some acquisition rigs.
pub fn parse_manifest(raw: &[u8]) -> Result<Vec<ImageRecord>, ParseError> {
    let cleaned: Vec<u8> = raw.iter().copied().filter(|&b| b != 0).collect();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(cleaned.as_slice());

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row = index + 1;
        let record = result?;
        // rows 1 and 2 are the version line and the column header
        if row <= 2 {
            continue;
        }
        if record.len() != MANIFEST_COLUMNS {
            return Err(ParseError::WrongColumnCount {
                row,
                found: record.len(),
                expected: MANIFEST_COLUMNS,
            });
        }
        records.push(ImageRecord {
            capture_time: text_field(&record[0]),
            latitude: numeric_field(&record[1], row, "Latitude")?,
            longitude: numeric_field(&record[2], row, "Longitude")?,
            depth: numeric_field(&record[3], row, "Depth")?,
            image_name: text_field(&record[4]),
            camera_name: text_field(&record[5]),
            camera_angle: text_field(&record[6]),
            temperature: numeric_field(&record[7], row, "Temperature")?,
            salinity: numeric_field(&record[8], row, "Salinity")?,
            pitch: numeric_field(&record[9], row, "Pitch")?,
            roll: numeric_field(&record[10], row, "Roll")?,
            yaw: numeric_field(&record[11], row, "Yaw")?,
            altitude: numeric_field(&record[12], row, "Altitude")?,
        });
    }

    Ok(records)
}

fn is_missing_token(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
}

/// Text columns keep their content verbatim; fill tokens become empty.
fn text_field(value: &str) -> String {
    if is_missing_token(value) {
        String::new()
    } else {
        value.trim().to_string()
    }
}

/// Numeric columns treat the `-999` fill value and the text fill tokens
/// as missing.
fn numeric_field(value: &str, row: usize, column: &'static str) -> Result<Option<f64>, ParseError> {
    if is_missing_token(value) {
        return Ok(None);
    }
    let parsed: f64 = value.trim().parse().map_err(|_| ParseError::BadNumber {
        row,
        column,
        value: value.to_string(),
    })?;
    if parsed == NUMERIC_FILL {
        return Ok(None);
    }
    Ok(Some(parsed))
}
