use crate::address::{display_address, AddressResult};
use crate::geo::GeoPoint;
use crate::matcher::{find_nearest, DEFAULT_MATCH_RADIUS_METERS};
use crate::providers::{
    Geocoder, MapImage, MapRenderer, MapRequest, PlaceSearch, ORGANIZATION_SEARCH_SPAN,
};
use crate::viewport::{MapType, Theme, ViewportState, SEARCH_ZOOM};
use anyhow::Result;

/// Discrete keyboard gestures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    ZoomIn,
    ZoomOut,
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Query was blank; nothing was sent
    EmptyQuery,
    Found(GeoPoint),
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    Address(AddressResult),
    Organization(GeoPoint),
    /// Organizations were returned but none lie within the match radius
    NoneWithinRadius,
    NothingFound,
}

/// The viewer's mutable state and the gesture handlers that drive it.
///
/// Provider errors are returned to the caller. A failed `search` leaves
/// the view and the previous address untouched. A failed click lookup
/// keeps the new marker, but the previous address is already cleared.
pub struct MapSession<P> {
    provider: P,
    state: ViewportState,
    address: Option<AddressResult>,
    include_postal_code: bool,
    status: Option<String>,
    map_size: (u32, u32),
}

impl<P> MapSession<P>
where
    P: MapRenderer + Geocoder + PlaceSearch,
{
    pub fn new(provider: P, map_size: (u32, u32)) -> Self {
        Self {
            provider,
            state: ViewportState::default(),
            address: None,
            include_postal_code: false,
            status: None,
            map_size,
        }
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn address(&self) -> Option<&AddressResult> {
        self.address.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn include_postal_code(&self) -> bool {
        self.include_postal_code
    }

    pub fn set_include_postal_code(&mut self, include: bool) {
        self.include_postal_code = include;
    }

    /// Address box text
    pub fn address_line(&self) -> String {
        display_address(self.address.as_ref(), self.include_postal_code)
    }

    pub fn key(&mut self, action: KeyAction) -> &ViewportState {
        self.state = match action {
            KeyAction::ZoomIn => self.state.change_zoom(1),
            KeyAction::ZoomOut => self.state.change_zoom(-1),
            KeyAction::PanUp => self.state.pan(0, 1),
            KeyAction::PanDown => self.state.pan(0, -1),
            KeyAction::PanLeft => self.state.pan(-1, 0),
            KeyAction::PanRight => self.state.pan(1, 0),
        };
        &self.state
    }

    pub fn set_map_type(&mut self, map_type: MapType) {
        self.state = self.state.with_map_type(map_type);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.state = self.state.with_theme(theme);
    }

    /// Forward-geocode `query` and jump to the result
    pub fn search(&mut self, query: &str) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchOutcome::EmptyQuery);
        }

        match self.provider.geocode(query)? {
            Some(hit) => {
                log::info!("Found '{}' at {}", query, hit.point);
                self.state = self
                    .state
                    .set_center_and_zoom(hit.point, SEARCH_ZOOM)
                    .replace_marker(hit.point);
                self.address = Some(hit.address);
                self.status = None;
                Ok(SearchOutcome::Found(hit.point))
            }
            None => {
                log::info!("Nothing found for '{}'", query);
                self.status = Some("Object not found".to_string());
                Ok(SearchOutcome::NotFound)
            }
        }
    }

    /// Mark the clicked point and resolve it to an address
    pub fn click_reverse(&mut self, norm_x: f64, norm_y: f64) -> Result<ClickOutcome> {
        let point = self.mark_click(norm_x, norm_y);

        match self.provider.reverse(point)? {
            Some(address) => {
                self.address = Some(address.clone());
                Ok(ClickOutcome::Address(address))
            }
            None => Ok(ClickOutcome::NothingFound),
        }
    }

    /// Mark the clicked point and look for an organization standing on it
    pub fn click_organization(&mut self, norm_x: f64, norm_y: f64) -> Result<ClickOutcome> {
        let point = self.mark_click(norm_x, norm_y);

        let candidates = self.provider.search(point, ORGANIZATION_SEARCH_SPAN)?;
        if candidates.is_empty() {
            self.status = Some("No organizations found".to_string());
            return Ok(ClickOutcome::NothingFound);
        }

        match find_nearest(point, &candidates, DEFAULT_MATCH_RADIUS_METERS) {
            Some(org) => {
                log::info!("Matched organization '{}'", org.name);
                self.state = self.state.replace_marker(org.location);
                self.address = Some(AddressResult::new(org.summary(), None));
                Ok(ClickOutcome::Organization(org.location))
            }
            None => {
                self.status = Some(format!(
                    "Organization not found (within {} m)",
                    DEFAULT_MATCH_RADIUS_METERS
                ));
                Ok(ClickOutcome::NoneWithinRadius)
            }
        }
    }

    /// Drop the marker and any search result
    pub fn reset(&mut self) {
        self.state = self.state.clear_marker();
        self.address = None;
        self.status = None;
    }

    pub fn map_request(&self) -> MapRequest {
        MapRequest::from_viewport(&self.state, self.map_size.0, self.map_size.1)
    }

    pub fn render(&self) -> Result<MapImage> {
        self.provider.render(&self.map_request())
    }

    fn mark_click(&mut self, norm_x: f64, norm_y: f64) -> GeoPoint {
        let point = self.state.screen_to_geo(norm_x, norm_y);
        self.state = self.state.replace_marker(point);
        self.address = None;
        self.status = None;
        point
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::OrganizationCandidate;
    use crate::providers::GeocodeHit;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeProvider {
        hit: Option<GeocodeHit>,
        address: Option<AddressResult>,
        candidates: Vec<OrganizationCandidate>,
        fail: bool,
        searched_at: RefCell<Vec<GeoPoint>>,
    }

    impl MapRenderer for FakeProvider {
        fn render(&self, _request: &MapRequest) -> Result<MapImage> {
            anyhow::bail!("no rendering in tests")
        }
    }

    impl Geocoder for FakeProvider {
        fn geocode(&self, _query: &str) -> Result<Option<GeocodeHit>> {
            if self.fail {
                anyhow::bail!("geocoder down");
            }
            Ok(self.hit.clone())
        }

        fn reverse(&self, _point: GeoPoint) -> Result<Option<AddressResult>> {
            if self.fail {
                anyhow::bail!("geocoder down");
            }
            Ok(self.address.clone())
        }
    }

    impl PlaceSearch for FakeProvider {
        fn search(
            &self,
            center: GeoPoint,
            _span: (f64, f64),
        ) -> Result<Vec<OrganizationCandidate>> {
            self.searched_at.borrow_mut().push(center);
            if self.fail {
                anyhow::bail!("search down");
            }
            Ok(self.candidates.clone())
        }
    }

    fn session(provider: FakeProvider) -> MapSession<FakeProvider> {
        MapSession::new(provider, (600, 450))
    }

    #[test]
    fn test_keys_drive_viewport() {
        let mut s = session(FakeProvider::default());
        assert_eq!(s.key(KeyAction::ZoomIn).zoom, 11);
        assert_eq!(s.key(KeyAction::ZoomOut).zoom, 10);

        let before = s.state().center;
        let after = s.key(KeyAction::PanUp).center;
        assert!(after.latitude > before.latitude);
        assert_eq!(after.longitude, before.longitude);
        let after = s.key(KeyAction::PanLeft).center;
        assert!(after.longitude < before.longitude);
    }

    #[test]
    fn test_empty_query_is_not_sent() {
        let mut s = session(FakeProvider {
            fail: true,
            ..FakeProvider::default()
        });
        assert_eq!(s.search("   ").unwrap(), SearchOutcome::EmptyQuery);
    }

    #[test]
    fn test_search_found_moves_view() {
        let point = GeoPoint::new(30.3159, 59.9391);
        let mut s = session(FakeProvider {
            hit: Some(GeocodeHit {
                point,
                address: AddressResult::new("Saint Petersburg", Some("190000".to_string())),
            }),
            ..FakeProvider::default()
        });

        assert_eq!(s.search("Питер").unwrap(), SearchOutcome::Found(point));
        assert_eq!(s.state().center, point);
        assert_eq!(s.state().zoom, SEARCH_ZOOM);
        assert_eq!(s.state().marker, Some(point));
        assert_eq!(s.address_line(), "Saint Petersburg");

        s.set_include_postal_code(true);
        assert_eq!(s.address_line(), "Saint Petersburg, 190000");
    }

    #[test]
    fn test_search_not_found_keeps_view() {
        let mut s = session(FakeProvider::default());
        assert_eq!(s.search("nowhere").unwrap(), SearchOutcome::NotFound);
        assert_eq!(s.state(), &ViewportState::default());
        assert_eq!(s.status(), Some("Object not found"));
    }

    #[test]
    fn test_search_error_propagates() {
        let mut s = session(FakeProvider {
            fail: true,
            ..FakeProvider::default()
        });
        assert!(s.search("Moscow").is_err());
        assert_eq!(s.state(), &ViewportState::default());
    }

    #[test]
    fn test_failed_search_keeps_address() {
        let mut s = session(FakeProvider {
            fail: true,
            ..FakeProvider::default()
        });
        s.address = Some(AddressResult::new("Arbat, 10", None));

        assert!(s.search("Moscow").is_err());
        assert_eq!(s.address_line(), "Arbat, 10");
    }

    #[test]
    fn test_failed_click_lookup_clears_address_keeps_marker() {
        let mut s = session(FakeProvider {
            fail: true,
            ..FakeProvider::default()
        });

        s.address = Some(AddressResult::new("Arbat, 10", None));
        assert!(s.click_reverse(0.0, 0.0).is_err());
        assert!(s.address().is_none());
        assert_eq!(s.state().marker, Some(s.state().center));

        s.address = Some(AddressResult::new("Arbat, 10", None));
        assert!(s.click_organization(0.5, 0.5).is_err());
        assert!(s.address().is_none());
        assert_eq!(s.state().marker, Some(s.state().screen_to_geo(0.5, 0.5)));
    }

    #[test]
    fn test_click_reverse_sets_marker_and_address() {
        let mut s = session(FakeProvider {
            address: Some(AddressResult::new("Tverskaya, 1", None)),
            ..FakeProvider::default()
        });

        let outcome = s.click_reverse(0.0, 0.0).unwrap();
        assert_eq!(
            outcome,
            ClickOutcome::Address(AddressResult::new("Tverskaya, 1", None))
        );
        assert_eq!(s.state().marker, Some(s.state().center));
        assert_eq!(s.address_line(), "Tverskaya, 1");
    }

    #[test]
    fn test_click_reverse_replaces_previous_result() {
        let mut s = session(FakeProvider::default());
        s.address = Some(AddressResult::new("old", None));

        assert_eq!(s.click_reverse(1.0, 1.0).unwrap(), ClickOutcome::NothingFound);
        assert!(s.address().is_none());
        assert!(s.state().marker.is_some());
    }

    #[test]
    fn test_click_organization_match_moves_marker() {
        let org_location = GeoPoint::new(37.6176 + 0.0002, 55.7558);
        let mut s = session(FakeProvider {
            candidates: vec![OrganizationCandidate {
                location: org_location,
                name: "Bookshop".to_string(),
                address: "Nikolskaya, 3".to_string(),
            }],
            ..FakeProvider::default()
        });

        let outcome = s.click_organization(0.0, 0.0).unwrap();
        assert_eq!(outcome, ClickOutcome::Organization(org_location));
        assert_eq!(s.state().marker, Some(org_location));
        assert_eq!(s.address_line(), "Bookshop\nNikolskaya, 3");
        assert_eq!(
            s.provider.searched_at.borrow().as_slice(),
            &[ViewportState::default().center]
        );
    }

    #[test]
    fn test_click_organization_out_of_radius() {
        let mut s = session(FakeProvider {
            candidates: vec![OrganizationCandidate {
                location: GeoPoint::new(37.7, 55.8),
                name: "Far away".to_string(),
                address: "Elsewhere".to_string(),
            }],
            ..FakeProvider::default()
        });

        let outcome = s.click_organization(0.0, 0.0).unwrap();
        assert_eq!(outcome, ClickOutcome::NoneWithinRadius);
        assert_eq!(s.state().marker, Some(ViewportState::default().center));
        assert_eq!(s.status(), Some("Organization not found (within 50 m)"));
    }

    #[test]
    fn test_click_organization_nothing_returned() {
        let mut s = session(FakeProvider::default());
        assert_eq!(
            s.click_organization(0.5, -0.5).unwrap(),
            ClickOutcome::NothingFound
        );
        assert_eq!(s.status(), Some("No organizations found"));
    }

    #[test]
    fn test_reset_clears_result() {
        let mut s = session(FakeProvider {
            address: Some(AddressResult::new("Arbat, 10", None)),
            ..FakeProvider::default()
        });
        s.set_theme(Theme::Dark);
        s.click_reverse(0.2, 0.2).unwrap();
        s.reset();

        assert_eq!(s.state().marker, None);
        assert!(s.address().is_none());
        assert_eq!(s.state().theme, Theme::Dark);
        assert_eq!(s.address_line(), crate::address::ADDRESS_NOT_FOUND);
    }

    #[test]
    fn test_map_request_follows_state() {
        let mut s = session(FakeProvider::default());
        s.set_map_type(MapType::Traffic);
        s.key(KeyAction::ZoomIn);
        let request = s.map_request();
        assert_eq!(request.zoom, 11);
        assert_eq!(request.map_type, MapType::Traffic);
        assert_eq!((request.width, request.height), (600, 450));
        assert!(s.render().is_err());
    }
}
