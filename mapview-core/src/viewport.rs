use crate::geo::{lat_in_bounds, lon_in_bounds, GeoPoint};

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 17;
pub const DEFAULT_ZOOM: u8 = 10;

/// Zoom applied after a successful text search
pub const SEARCH_ZOOM: u8 = 15;

/// Moscow city center
pub const DEFAULT_CENTER: GeoPoint = GeoPoint::new(37.6176, 55.7558);

/// Fraction of the visible span moved by one pan step
const PAN_FACTOR: f64 = 0.5;

/// Map layer combination requested from the static map service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapType {
    #[default]
    Base,
    Satellite,
    SatelliteLabels,
    Traffic,
    Transit,
    Admin,
}

impl MapType {
    pub const ALL: [MapType; 6] = [
        MapType::Base,
        MapType::Satellite,
        MapType::SatelliteLabels,
        MapType::Traffic,
        MapType::Transit,
        MapType::Admin,
    ];

    /// Layer code understood by the static map service (`l` parameter)
    pub fn layer_code(&self) -> &'static str {
        match self {
            MapType::Base => "map",
            MapType::Satellite => "sat",
            MapType::SatelliteLabels => "sat,skl",
            MapType::Traffic => "map,trf",
            MapType::Transit => "map,trf,pt",
            MapType::Admin => "map,adm",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MapType::Base => "Base map",
            MapType::Satellite => "Satellite",
            MapType::SatelliteLabels => "Satellite + labels",
            MapType::Traffic => "Traffic",
            MapType::Transit => "Public transit",
            MapType::Admin => "Administrative",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "base" | "map" => Some(MapType::Base),
            "satellite" | "sat" => Some(MapType::Satellite),
            "satellite-labels" | "hybrid" | "sat,skl" => Some(MapType::SatelliteLabels),
            "traffic" | "map,trf" => Some(MapType::Traffic),
            "transit" | "map,trf,pt" => Some(MapType::Transit),
            "admin" | "map,adm" => Some(MapType::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn code(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }
}

/// The visible map region plus layer selectors and the optional marker.
///
/// Every transition consumes the current state and returns the next one, so
/// the owner holds a single slot and re-renders after each assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub center: GeoPoint,
    pub zoom: u8,
    pub map_type: MapType,
    pub theme: Theme,
    pub marker: Option<GeoPoint>,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            map_type: MapType::default(),
            theme: Theme::default(),
            marker: None,
        }
    }
}

impl ViewportState {
    /// Approximate visible span in degrees as (longitude, latitude).
    ///
    /// Degrees per pixel depend on zoom only; latitude compression of the
    /// Mercator projection is ignored.
    pub fn span(&self) -> (f64, f64) {
        let scale = 2f64.powi(i32::from(self.zoom));
        (360.0 / scale, 180.0 / scale)
    }

    /// Step the zoom by `delta`. Results outside [MIN_ZOOM, MAX_ZOOM] are
    /// ignored rather than clamped.
    pub fn change_zoom(self, delta: i32) -> Self {
        let new_zoom = i32::from(self.zoom) + delta;
        if (i32::from(MIN_ZOOM)..=i32::from(MAX_ZOOM)).contains(&new_zoom) {
            log::debug!("Zoom {} -> {}", self.zoom, new_zoom);
            Self {
                zoom: new_zoom as u8,
                ..self
            }
        } else {
            log::debug!("Zoom {} + {} out of range, ignored", self.zoom, delta);
            self
        }
    }

    /// Move the center by half a span along each requested axis.
    ///
    /// An axis whose new value would leave the map bounds keeps its old
    /// value; the other axis still moves.
    pub fn pan(self, dx: i8, dy: i8) -> Self {
        let (span_lon, span_lat) = self.span();
        let new_lon = self.center.longitude + f64::from(dx.signum()) * span_lon * PAN_FACTOR;
        let new_lat = self.center.latitude + f64::from(dy.signum()) * span_lat * PAN_FACTOR;

        let center = GeoPoint {
            longitude: if lon_in_bounds(new_lon) {
                new_lon
            } else {
                self.center.longitude
            },
            latitude: if lat_in_bounds(new_lat) {
                new_lat
            } else {
                self.center.latitude
            },
        };

        Self { center, ..self }
    }

    /// Convert a normalized screen position (-1..1 on both axes, +y up) to a
    /// geographic point inside the current view, clamped to the map bounds
    pub fn screen_to_geo(&self, norm_x: f64, norm_y: f64) -> GeoPoint {
        let (span_lon, span_lat) = self.span();
        GeoPoint::clamped(
            self.center.longitude + norm_x * span_lon / 2.0,
            self.center.latitude + norm_y * span_lat / 2.0,
        )
    }

    /// Jump to a resolved search result. The point comes from the geocoder
    /// and is trusted as-is.
    pub fn set_center_and_zoom(self, center: GeoPoint, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            ..self
        }
    }

    pub fn replace_marker(self, point: GeoPoint) -> Self {
        Self {
            marker: Some(point),
            ..self
        }
    }

    pub fn clear_marker(self) -> Self {
        Self {
            marker: None,
            ..self
        }
    }

    pub fn with_map_type(self, map_type: MapType) -> Self {
        Self { map_type, ..self }
    }

    pub fn with_theme(self, theme: Theme) -> Self {
        Self { theme, ..self }
    }
}

/// Convert a click at pixel (x, y) inside a `width` x `height` image, origin
/// top-left, to normalized coordinates with +y pointing up.
/// Returns None for clicks outside the image.
pub fn pixel_to_normalized(x: f64, y: f64, width: f64, height: f64) -> Option<(f64, f64)> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    if !(0.0..=width).contains(&x) || !(0.0..=height).contains(&y) {
        return None;
    }

    let half_w = width / 2.0;
    let half_h = height / 2.0;
    Some(((x - half_w) / half_w, -(y - half_h) / half_h))
}
