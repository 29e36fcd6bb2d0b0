//! Map service seams: static map rendering, geocoding and organization search.
//!
//! The session talks to these traits only; `YandexClient` is the HTTP
//! implementation used by the binaries.

use crate::address::AddressResult;
use crate::geo::GeoPoint;
use crate::matcher::OrganizationCandidate;
use crate::viewport::{MapType, Theme, ViewportState};
use anyhow::{Context, Result};

pub mod responses;
pub mod yandex;

pub use yandex::YandexClient;

/// Marker style drawn at `pt` (red pin with a dot)
pub const MARKER_STYLE: &str = "pm2rdl";

/// Search window around a clicked point, in degrees
pub const ORGANIZATION_SEARCH_SPAN: (f64, f64) = (0.001, 0.001);

/// Parameters for one static map render
#[derive(Debug, Clone, PartialEq)]
pub struct MapRequest {
    pub center: GeoPoint,
    pub zoom: u8,
    pub map_type: MapType,
    pub theme: Theme,
    pub marker: Option<GeoPoint>,
    pub width: u32,
    pub height: u32,
}

impl MapRequest {
    pub fn from_viewport(state: &ViewportState, width: u32, height: u32) -> Self {
        Self {
            center: state.center,
            zoom: state.zoom,
            map_type: state.map_type,
            theme: state.theme,
            marker: state.marker,
            width,
            height,
        }
    }

    /// Query parameters understood by the static map service, API key excluded
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("ll", self.center.to_string()),
            ("z", self.zoom.to_string()),
            ("l", self.map_type.layer_code().to_string()),
            ("size", format!("{},{}", self.width, self.height)),
            ("theme", self.theme.code().to_string()),
        ];

        if let Some(marker) = self.marker {
            pairs.push(("pt", format!("{},{}", marker, MARKER_STYLE)));
        }

        pairs
    }
}

/// A rendered map: the raw response body and its decoded pixels
#[derive(Debug, Clone)]
pub struct MapImage {
    pub bytes: Vec<u8>,
    pub image: image::RgbaImage,
}

impl MapImage {
    pub fn decode(bytes: Vec<u8>) -> Result<Self> {
        let image = image::load_from_memory(&bytes)
            .context("Failed to decode map image")?
            .to_rgba8();
        Ok(Self { bytes, image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Forward geocoding result
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    pub point: GeoPoint,
    pub address: AddressResult,
}

pub trait MapRenderer {
    fn render(&self, request: &MapRequest) -> Result<MapImage>;
}

pub trait Geocoder {
    /// Resolve free text to the best matching point, if any
    fn geocode(&self, query: &str) -> Result<Option<GeocodeHit>>;

    /// Resolve a point to the nearest address, if any
    fn reverse(&self, point: GeoPoint) -> Result<Option<AddressResult>>;
}

pub trait PlaceSearch {
    /// Organizations around `center`, in the provider's relevance order
    fn search(&self, center: GeoPoint, span: (f64, f64)) -> Result<Vec<OrganizationCandidate>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_query_pairs_without_marker() {
        let request = MapRequest::from_viewport(&ViewportState::default(), 600, 450);
        let pairs = request.query_pairs();

        assert_eq!(lookup(&pairs, "ll"), Some("37.6176,55.7558"));
        assert_eq!(lookup(&pairs, "z"), Some("10"));
        assert_eq!(lookup(&pairs, "l"), Some("map"));
        assert_eq!(lookup(&pairs, "size"), Some("600,450"));
        assert_eq!(lookup(&pairs, "theme"), Some("light"));
        assert_eq!(lookup(&pairs, "pt"), None);
    }

    #[test]
    fn test_query_pairs_with_marker() {
        let state = ViewportState::default()
            .with_map_type(MapType::SatelliteLabels)
            .with_theme(Theme::Dark)
            .replace_marker(GeoPoint::new(30.5, 59.25));
        let pairs = MapRequest::from_viewport(&state, 650, 450).query_pairs();

        assert_eq!(lookup(&pairs, "pt"), Some("30.5,59.25,pm2rdl"));
        assert_eq!(lookup(&pairs, "l"), Some("sat,skl"));
        assert_eq!(lookup(&pairs, "theme"), Some("dark"));
    }

    #[test]
    fn test_decode_png() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(4, 3, image::Rgba([10, 20, 30, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let map = MapImage::decode(png).unwrap();
        assert_eq!((map.width(), map.height()), (4, 3));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(MapImage::decode(b"<html>quota exceeded</html>".to_vec()).is_err());
    }
}
