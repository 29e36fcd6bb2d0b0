//! Core of the mapview viewer: viewport math, organization matching and the
//! map service clients the GUI and CLI are built on.

pub mod address;
pub mod config;
pub mod geo;
pub mod matcher;
pub mod providers;
pub mod session;
pub mod viewport;

// Re-export the types front ends use most
pub use address::AddressResult;
pub use config::MapConfig;
pub use geo::{haversine_distance, GeoPoint};
pub use matcher::{find_nearest, OrganizationCandidate, DEFAULT_MATCH_RADIUS_METERS};
pub use providers::{GeocodeHit, MapImage, MapRequest, YandexClient};
pub use session::{ClickOutcome, KeyAction, MapSession, SearchOutcome};
pub use viewport::{MapType, Theme, ViewportState};
