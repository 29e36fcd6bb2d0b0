use anyhow::{Context, Result};
use std::fmt;

pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;
pub const MIN_LAT: f64 = -85.0;
pub const MAX_LAT: f64 = 85.0;

/// Mean Earth radius used for great-circle distances, in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A longitude/latitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Build a point with each axis clamped into the map bounds
    pub fn clamped(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude: longitude.clamp(MIN_LON, MAX_LON),
            latitude: latitude.clamp(MIN_LAT, MAX_LAT),
        }
    }

    pub fn in_bounds(&self) -> bool {
        lon_in_bounds(self.longitude) && lat_in_bounds(self.latitude)
    }

    /// Parses the geocoder's "lon lat" position string
    /// Example: "37.617635 55.755814"
    pub fn from_pos(pos: &str) -> Result<Self> {
        let mut parts = pos.split_whitespace();
        let lon = parts.next().context("Position is missing longitude")?;
        let lat = parts.next().context("Position is missing latitude")?;
        if parts.next().is_some() {
            anyhow::bail!("Unexpected trailing data in position: {}", pos);
        }

        let longitude: f64 = lon
            .parse()
            .with_context(|| format!("Invalid longitude: {}", lon))?;
        let latitude: f64 = lat
            .parse()
            .with_context(|| format!("Invalid latitude: {}", lat))?;
        if !longitude.is_finite() || !latitude.is_finite() {
            anyhow::bail!("Position is not finite: {}", pos);
        }

        Ok(Self {
            longitude,
            latitude,
        })
    }
}

/// Renders as "lon,lat", the form the map services accept for `ll` and `pt`
impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.longitude, self.latitude)
    }
}

pub fn lon_in_bounds(lon: f64) -> bool {
    (MIN_LON..=MAX_LON).contains(&lon)
}

pub fn lat_in_bounds(lat: f64) -> bool {
    (MIN_LAT..=MAX_LAT).contains(&lat)
}

/// Great-circle distance between two points in meters (haversine formula).
///
/// No special handling for the antimeridian: points on opposite sides of
/// ±180° are measured the long way round.
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Formats a point for status readouts
/// Example: "37.6176, 55.7558"
pub fn format_coords(point: &GeoPoint) -> String {
    format!("{:.4}, {:.4}", point.longitude, point.latitude)
}
