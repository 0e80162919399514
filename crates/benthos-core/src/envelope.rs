//! Aggregate geospatial/temporal bounds derived from a deployment's
//! ordered image records.

use benthos_parser::{ImageRecord, TEXT_FILL};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("no record carries both latitude and longitude")]
    NoGeolocatedRecords,
    #[error("no record carries a depth value")]
    NoDepthSamples,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_longitude: f64,
    pub max_longitude: f64,
    pub min_latitude: f64,
    pub max_latitude: f64,
}

impl GeoBounds {
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        longitude >= self.min_longitude
            && longitude <= self.max_longitude
            && latitude >= self.min_latitude
            && latitude <= self.max_latitude
    }
}

/// Derived per-scan, never stored. Start fields come from the first record
/// with both coordinates; end fields come from the literal last record in
/// manifest order, whether or not it is geolocated. That asymmetry matches
/// the upstream catalog's expectations and is deliberate.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub bounds: GeoBounds,
    pub start_position: String,
    pub end_position: String,
    pub start_time: String,
    pub end_time: String,
    pub min_depth: f64,
    pub max_depth: f64,
}

impl Envelope {
    pub fn compute(records: &[ImageRecord]) -> Result<Self, EnvelopeError> {
        let start = records
            .iter()
            .find(|r| r.has_position())
            .ok_or(EnvelopeError::NoGeolocatedRecords)?;
        // literal last record, not the last geolocated one
        let end = records.last().ok_or(EnvelopeError::NoGeolocatedRecords)?;

        let mut bounds: Option<GeoBounds> = None;
        for record in records.iter() {
            let (Some(lon), Some(lat)) = (record.longitude, record.latitude) else {
                continue;
            };
            bounds = Some(match bounds {
                None => GeoBounds {
                    min_longitude: lon,
                    max_longitude: lon,
                    min_latitude: lat,
                    max_latitude: lat,
                },
                Some(b) => GeoBounds {
                    min_longitude: b.min_longitude.min(lon),
                    max_longitude: b.max_longitude.max(lon),
                    min_latitude: b.min_latitude.min(lat),
                    max_latitude: b.max_latitude.max(lat),
                },
            });
        }
        // `start` above guarantees at least one geolocated record
        let bounds = bounds.ok_or(EnvelopeError::NoGeolocatedRecords)?;

        let depths: Vec<f64> = records.iter().filter_map(|r| r.depth).collect();
        if depths.is_empty() {
            return Err(EnvelopeError::NoDepthSamples);
        }
        let min_depth = depths.iter().copied().fold(f64::INFINITY, f64::min);
        let max_depth = depths.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(Envelope {
            bounds,
            start_position: point_wkt(start.longitude, start.latitude),
            end_position: point_wkt(end.longitude, end.latitude),
            start_time: start.capture_time.clone(),
            end_time: end.capture_time.clone(),
            min_depth,
            max_depth,
        })
    }

    /// Closed 5-point bounding ring. A single geolocated record degenerates
    /// to the same point repeated, which the server accepts.
    pub fn transect_shape(&self) -> String {
        polygon_wkt(&self.bounds)
    }
}

fn coordinate(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v}"),
        None => TEXT_FILL.to_string(),
    }
}

/// `SRID=4326;POINT(lon lat)` — longitude first, a single space between the
/// pair. The remote geometry parser rejects any other internal whitespace.
pub fn point_wkt(longitude: Option<f64>, latitude: Option<f64>) -> String {
    format!(
        "SRID=4326;POINT({} {})",
        coordinate(longitude),
        coordinate(latitude)
    )
}

pub fn polygon_wkt(bounds: &GeoBounds) -> String {
    format!(
        "SRID=4326;POLYGON(({min_lon} {min_lat},{max_lon} {min_lat},{max_lon} {max_lat},{min_lon} {max_lat},{min_lon} {min_lat}))",
        min_lon = bounds.min_longitude,
        max_lon = bounds.max_longitude,
        min_lat = bounds.min_latitude,
        max_lat = bounds.max_latitude,
    )
}
