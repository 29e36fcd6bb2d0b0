use crate::geo::{haversine_distance, GeoPoint};

/// Radius within which a clicked point is attributed to an organization
pub const DEFAULT_MATCH_RADIUS_METERS: f64 = 50.0;

/// A place returned by the organization search
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationCandidate {
    pub location: GeoPoint,
    pub name: String,
    pub address: String,
}

impl OrganizationCandidate {
    /// Two-line text shown in the address box
    pub fn summary(&self) -> String {
        format!("{}\n{}", self.name, self.address)
    }
}

/// Returns the first candidate, in provider order, lying within
/// `threshold_meters` of `target`.
///
/// A later candidate that is strictly closer does not win: the search
/// provider's relevance ranking takes precedence over distance.
pub fn find_nearest<'a>(
    target: GeoPoint,
    candidates: &'a [OrganizationCandidate],
    threshold_meters: f64,
) -> Option<&'a OrganizationCandidate> {
    candidates.iter().find(|candidate| {
        let distance = haversine_distance(target, candidate.location);
        log::debug!("{} is {:.1} m from {}", candidate.name, distance, target);
        distance <= threshold_meters
    })
}
