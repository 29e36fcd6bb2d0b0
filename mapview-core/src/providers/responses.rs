//! Serde views of the geocoder and organization search JSON.
//!
//! Every nested field is optional so partial responses deserialize cleanly;
//! defaults are applied when converting to domain types.

use crate::address::{AddressResult, ADDRESS_NOT_FOUND};
use crate::geo::GeoPoint;
use crate::matcher::OrganizationCandidate;
use crate::providers::GeocodeHit;
use anyhow::{Context, Result};
use serde::Deserialize;

pub const UNKNOWN_ORGANIZATION: &str = "Unknown organization";
pub const ADDRESS_NOT_SPECIFIED: &str = "Address not specified";

#[derive(Debug, Default, Deserialize)]
pub struct GeocoderResponse {
    #[serde(default)]
    pub response: Option<GeocoderBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeocoderBody {
    #[serde(rename = "GeoObjectCollection", default)]
    pub collection: GeoObjectCollection,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeoObjectCollection {
    #[serde(rename = "featureMember", default)]
    pub feature_member: Vec<FeatureMember>,
}

#[derive(Debug, Deserialize)]
pub struct FeatureMember {
    #[serde(rename = "GeoObject")]
    pub geo_object: GeoObject,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeoObject {
    #[serde(rename = "Point", default)]
    pub point: Option<Point>,
    #[serde(rename = "metaDataProperty", default)]
    pub meta: Option<MetaDataProperty>,
}

#[derive(Debug, Deserialize)]
pub struct Point {
    pub pos: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct MetaDataProperty {
    #[serde(rename = "GeocoderMetaData", default)]
    pub geocoder: Option<GeocoderMetaData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeocoderMetaData {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "Address", default)]
    pub address: Option<GeocoderAddress>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeocoderAddress {
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl GeoObject {
    /// Address text and postal code, with the placeholder for missing text
    pub fn address(&self) -> AddressResult {
        let meta = self.meta.as_ref().and_then(|m| m.geocoder.as_ref());
        let text = meta
            .and_then(|m| m.text.clone())
            .unwrap_or_else(|| ADDRESS_NOT_FOUND.to_string());
        let postal_code = meta
            .and_then(|m| m.address.as_ref())
            .and_then(|a| a.postal_code.clone());

        AddressResult::new(text, postal_code)
    }

    pub fn position(&self) -> Option<Result<GeoPoint>> {
        self.point.as_ref().map(|p| GeoPoint::from_pos(&p.pos))
    }
}

impl GeocoderResponse {
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body).context("Failed to parse geocoder response")
    }

    pub fn into_first(self) -> Option<GeoObject> {
        self.response?
            .collection
            .feature_member
            .into_iter()
            .next()
            .map(|member| member.geo_object)
    }

    /// First result as a forward geocoding hit
    pub fn into_hit(self) -> Result<Option<GeocodeHit>> {
        let Some(object) = self.into_first() else {
            return Ok(None);
        };

        let point = object
            .position()
            .context("Geocoder result has no position")??;

        Ok(Some(GeocodeHit {
            point,
            address: object.address(),
        }))
    }

    /// First result's address, for reverse geocoding
    pub fn into_address(self) -> Option<AddressResult> {
        self.into_first().map(|object| object.address())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub features: Vec<SearchFeature>,
}

#[derive(Debug, Deserialize)]
pub struct SearchFeature {
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<SearchProperties>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchProperties {
    #[serde(rename = "CompanyMetaData", default)]
    pub company: Option<CompanyMetaData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompanyMetaData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl SearchResponse {
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body).context("Failed to parse search response")
    }

    /// Features as candidates, keeping provider order.
    /// Features without a usable [lon, lat] pair are skipped.
    pub fn into_candidates(self) -> Vec<OrganizationCandidate> {
        self.features
            .into_iter()
            .filter_map(|feature| {
                let location = match feature.geometry.as_ref().map(|g| g.coordinates.as_slice()) {
                    Some([lon, lat, ..]) => GeoPoint::new(*lon, *lat),
                    _ => {
                        log::debug!("Skipping search feature without coordinates");
                        return None;
                    }
                };

                let company = feature.properties.and_then(|p| p.company);
                let (name, address) = match company {
                    Some(c) => (c.name, c.address),
                    None => (None, None),
                };

                Some(OrganizationCandidate {
                    location,
                    name: name.unwrap_or_else(|| UNKNOWN_ORGANIZATION.to_string()),
                    address: address.unwrap_or_else(|| ADDRESS_NOT_SPECIFIED.to_string()),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORWARD: &str = r#"{
        "response": {
            "GeoObjectCollection": {
                "metaDataProperty": {"GeocoderResponseMetaData": {"found": "1"}},
                "featureMember": [{
                    "GeoObject": {
                        "metaDataProperty": {
                            "GeocoderMetaData": {
                                "kind": "street",
                                "text": "Россия, Москва, Красная площадь",
                                "Address": {"country_code": "RU", "postal_code": "109012"}
                            }
                        },
                        "name": "Красная площадь",
                        "Point": {"pos": "37.621031 55.753595"}
                    }
                }]
            }
        }
    }"#;

    #[test]
    fn test_forward_hit() {
        let hit = GeocoderResponse::parse(FORWARD)
            .unwrap()
            .into_hit()
            .unwrap()
            .unwrap();
        assert_eq!(hit.point, GeoPoint::new(37.621031, 55.753595));
        assert_eq!(hit.address.text, "Россия, Москва, Красная площадь");
        assert_eq!(hit.address.postal_code.as_deref(), Some("109012"));
    }

    #[test]
    fn test_missing_postal_code_and_text() {
        let body = r#"{"response": {"GeoObjectCollection": {"featureMember": [
            {"GeoObject": {"metaDataProperty": {"GeocoderMetaData": {}}, "Point": {"pos": "1 2"}}}
        ]}}}"#;
        let address = GeocoderResponse::parse(body).unwrap().into_address().unwrap();
        assert_eq!(address.text, ADDRESS_NOT_FOUND);
        assert_eq!(address.postal_code, None);
    }

    #[test]
    fn test_empty_collection() {
        let body = r#"{"response": {"GeoObjectCollection": {"featureMember": []}}}"#;
        assert!(GeocoderResponse::parse(body).unwrap().into_hit().unwrap().is_none());
        let body = r#"{"statusCode": 403, "error": "Forbidden"}"#;
        assert!(GeocoderResponse::parse(body).unwrap().into_address().is_none());
    }

    #[test]
    fn test_forward_hit_without_point_is_error() {
        let body = r#"{"response": {"GeoObjectCollection": {"featureMember": [
            {"GeoObject": {"metaDataProperty": {"GeocoderMetaData": {"text": "x"}}}}
        ]}}}"#;
        assert!(GeocoderResponse::parse(body).unwrap().into_hit().is_err());
    }

    #[test]
    fn test_non_finite_position_is_error() {
        let body = r#"{"response": {"GeoObjectCollection": {"featureMember": [
            {"GeoObject": {"Point": {"pos": "nan nan"}}}
        ]}}}"#;
        assert!(GeocoderResponse::parse(body).unwrap().into_hit().is_err());
    }

    #[test]
    fn test_search_candidates_keep_order() {
        let body = r#"{"type": "FeatureCollection", "features": [
            {"geometry": {"type": "Point", "coordinates": [37.62, 55.75]},
             "properties": {"CompanyMetaData": {"name": "Cafe", "address": "Main st, 1"}}},
            {"geometry": {"type": "Point"}, "properties": {}},
            {"geometry": {"type": "Point", "coordinates": [37.63, 55.76]},
             "properties": {"CompanyMetaData": {}}}
        ]}"#;
        let candidates = SearchResponse::parse(body).unwrap().into_candidates();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].name, "Cafe");
        assert_eq!(candidates[0].address, "Main st, 1");
        assert_eq!(candidates[0].location, GeoPoint::new(37.62, 55.75));
        assert_eq!(candidates[1].name, UNKNOWN_ORGANIZATION);
        assert_eq!(candidates[1].address, ADDRESS_NOT_SPECIFIED);
    }

    #[test]
    fn test_search_without_features() {
        let candidates = SearchResponse::parse("{}").unwrap().into_candidates();
        assert!(candidates.is_empty());
    }
}
