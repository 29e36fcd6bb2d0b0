use crate::address::AddressResult;
use crate::config::MapConfig;
use crate::geo::GeoPoint;
use crate::matcher::OrganizationCandidate;
use crate::providers::responses::{GeocoderResponse, SearchResponse};
use crate::providers::{GeocodeHit, Geocoder, MapImage, MapRenderer, MapRequest, PlaceSearch};
use anyhow::{Context, Result};
use std::time::Duration;

/// Number of organizations requested per search
const SEARCH_RESULTS: u32 = 5;

/// Blocking client for the Yandex static maps, geocoder and search APIs
pub struct YandexClient {
    config: MapConfig,
    http: reqwest::blocking::Client,
}

impl YandexClient {
    pub fn new(config: MapConfig) -> Result<Self> {
        let user_agent = format!("mapview/{}", env!("CARGO_PKG_VERSION"));

        let http = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { config, http })
    }

    /// Full static map URL for a request, including the API key
    pub fn map_url(&self, request: &MapRequest) -> Result<reqwest::Url> {
        let mut params = vec![("apikey", self.config.static_api_key.clone())];
        params.extend(request.query_pairs());
        reqwest::Url::parse_with_params(&self.config.static_maps_url, &params)
            .context("Invalid static maps URL")
    }

    fn get(&self, url: &str, params: &[(&str, String)]) -> Result<reqwest::blocking::Response> {
        let response = self
            .http
            .get(url)
            .query(params)
            .send()
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("{} returned status: {}", url, response.status());
        }

        Ok(response)
    }

    /// Geocoder query: key, JSON format, single result, then `extra`
    pub fn geocoder_params(
        &self,
        extra: Vec<(&'static str, String)>,
    ) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("apikey", self.config.geocoder_api_key.clone()),
            ("format", "json".to_string()),
            ("results", "1".to_string()),
        ];
        query.extend(extra);
        query
    }

    /// Reverse geocoding asks for the nearest building rather than the
    /// enclosing district
    pub fn reverse_params(&self, point: GeoPoint) -> Vec<(&'static str, String)> {
        self.geocoder_params(vec![
            ("geocode", point.to_string()),
            ("kind", "house".to_string()),
        ])
    }

    pub fn search_params(
        &self,
        center: GeoPoint,
        span: (f64, f64),
    ) -> Vec<(&'static str, String)> {
        vec![
            ("apikey", self.config.search_api_key.clone()),
            ("text", self.config.organization_query.clone()),
            ("ll", center.to_string()),
            ("spn", format!("{},{}", span.0, span.1)),
            ("type", "biz".to_string()),
            ("results", SEARCH_RESULTS.to_string()),
            ("lang", self.config.lang.clone()),
        ]
    }

    fn geocoder_request(&self, query: &[(&str, String)]) -> Result<GeocoderResponse> {
        let body = self
            .get(&self.config.geocoder_url, query)?
            .text()
            .context("Failed to read geocoder response")?;
        GeocoderResponse::parse(&body)
    }
}

impl MapRenderer for YandexClient {
    fn render(&self, request: &MapRequest) -> Result<MapImage> {
        let url = self.map_url(request)?;
        log::debug!(
            "Rendering map at {} z{} ({})",
            request.center,
            request.zoom,
            request.map_type.layer_code()
        );

        let response = self
            .http
            .get(url)
            .send()
            .context("Failed to send map request")?;

        if !response.status().is_success() {
            anyhow::bail!("Static maps API returned status: {}", response.status());
        }

        let bytes = response.bytes().context("Failed to read map image")?;
        MapImage::decode(bytes.to_vec())
    }
}

impl Geocoder for YandexClient {
    fn geocode(&self, query: &str) -> Result<Option<GeocodeHit>> {
        log::debug!("Geocoding '{}'", query);
        let params = self.geocoder_params(vec![("geocode", query.to_string())]);
        self.geocoder_request(&params)?.into_hit()
    }

    fn reverse(&self, point: GeoPoint) -> Result<Option<AddressResult>> {
        log::debug!("Reverse geocoding {}", point);
        Ok(self
            .geocoder_request(&self.reverse_params(point))?
            .into_address())
    }
}

impl PlaceSearch for YandexClient {
    fn search(&self, center: GeoPoint, span: (f64, f64)) -> Result<Vec<OrganizationCandidate>> {
        log::debug!("Searching organizations near {}", center);
        let body = self
            .get(&self.config.search_url, &self.search_params(center, span))?
            .text()
            .context("Failed to read search response")?;

        Ok(SearchResponse::parse(&body)?.into_candidates())
    }
}
