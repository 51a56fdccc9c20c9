//! OpenTripMap adapter
//!
//! Attractions only. Geocodes the city, runs a radius search filtered by
//! "kinds" derived from the traveller's interests, then fetches details for
//! each hit so there is a description and preview image to show.

use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use std::time::Duration;

use super::{check_status, http_client, ProviderAdapter, ProviderQuery};
use crate::errors::ProviderError;
use crate::models::candidate::{maps_search_url, Attraction, CandidateItem, ResourceCategory};
use crate::models::trip::ActivityInterest;

const OPENTRIPMAP_API_URL: &str = "https://api.opentripmap.com/0.1/en";
const SEARCH_RADIUS_METERS: u32 = 5000;
const MIN_RATE: u8 = 2;
const DEFAULT_KINDS: &str = "interesting_places";

#[derive(Debug, Deserialize)]
struct GeonameResponse {
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RadiusResponse {
    #[serde(default)]
    features: Vec<RadiusFeature>,
}

#[derive(Debug, Deserialize)]
struct RadiusFeature {
    properties: RadiusProperties,
}

#[derive(Debug, Deserialize)]
struct RadiusProperties {
    xid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
    #[serde(default)]
    name: String,
    #[serde(default)]
    kinds: String,
    wikipedia_extracts: Option<TextBlock>,
    info: Option<InfoBlock>,
    preview: Option<PreviewBlock>,
    point: Option<Point>,
}

#[derive(Debug, Deserialize)]
struct TextBlock {
    text: String,
}

#[derive(Debug, Deserialize)]
struct InfoBlock {
    descr: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PreviewBlock {
    source: String,
}

#[derive(Debug, Deserialize)]
struct Point {
    lat: f64,
    lon: f64,
}

pub struct OpenTripMapProvider {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenTripMapProvider {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: http_client(timeout)?,
            api_key,
            base_url: OPENTRIPMAP_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn geocode(&self, query: &ProviderQuery) -> Result<(f64, f64), ProviderError> {
        let label = query.location_label();
        let response = self
            .http_client
            .get(format!("{}/places/geoname", self.base_url))
            .query(&[("name", label.as_str()), ("apikey", self.api_key.as_str())])
            .send()
            .await?;
        let geoname: GeonameResponse = check_status(response).await?.json().await?;

        match (geoname.lat, geoname.lon) {
            (Some(lat), Some(lon)) => Ok((lat, lon)),
            _ => Err(ProviderError::NotFound(label)),
        }
    }

    async fn place_details(&self, xid: &str) -> Result<PlaceDetails, ProviderError> {
        let response = self
            .http_client
            .get(format!("{}/places/xid/{}", self.base_url, xid))
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }
}

#[async_trait]
impl ProviderAdapter for OpenTripMapProvider {
    fn name(&self) -> &'static str {
        "opentripmap"
    }

    fn supports(&self, category: ResourceCategory) -> bool {
        category == ResourceCategory::Attraction
    }

    async fn query(&self, query: &ProviderQuery) -> Result<Vec<CandidateItem>, ProviderError> {
        if query.kind.category() != ResourceCategory::Attraction {
            return Ok(Vec::new());
        }

        let (lat, lon) = self.geocode(query).await?;
        let limit = query.pool_size();
        let response = self
            .http_client
            .get(format!("{}/places/radius", self.base_url))
            .query(&[
                ("radius", SEARCH_RADIUS_METERS.to_string()),
                ("lon", lon.to_string()),
                ("lat", lat.to_string()),
                ("kinds", kinds_for_interests(&query.interests)),
                ("rate", MIN_RATE.to_string()),
                ("limit", limit.to_string()),
                ("format", "geojson".to_string()),
                ("apikey", self.api_key.clone()),
            ])
            .send()
            .await?;
        let radius: RadiusResponse = check_status(response).await?.json().await?;

        let xids: Vec<String> = radius
            .features
            .into_iter()
            .filter_map(|f| f.properties.xid)
            .take(limit)
            .collect();

        let details = join_all(xids.iter().map(|xid| self.place_details(xid))).await;

        let mut attractions = Vec::new();
        for (xid, result) in xids.iter().zip(details) {
            match result {
                Ok(place) => {
                    if let Some(attraction) = place_to_attraction(place) {
                        attractions.push(CandidateItem::Attraction(attraction));
                    }
                }
                // one bad place should not sink the whole search
                Err(e) => log::debug!("OpenTripMap details for {} failed: {}", xid, e),
            }
        }
        Ok(attractions)
    }
}

fn place_to_attraction(place: PlaceDetails) -> Option<Attraction> {
    let name = place.name.trim();
    if name.is_empty() {
        return None;
    }

    let description = place
        .wikipedia_extracts
        .map(|w| w.text)
        .or_else(|| place.info.and_then(|i| i.descr))
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| "Point of interest".to_string());

    let map_url = match &place.point {
        Some(point) => maps_search_url(&format!("{},{}", point.lat, point.lon)),
        None => maps_search_url(name),
    };

    Some(Attraction {
        name: name.to_string(),
        description,
        cost: estimate_cost(&place.kinds),
        duration: estimate_duration(&place.kinds).to_string(),
        image_url: place.preview.map(|p| p.source),
        map_url: Some(map_url),
        tags: place
            .kinds
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect(),
    })
}

fn interest_kinds(interest: ActivityInterest) -> &'static [&'static str] {
    match interest {
        ActivityInterest::Sightseeing => &["interesting_places", "tourist_facilities"],
        ActivityInterest::Cultural => &["museums", "cultural", "historic", "architecture"],
        ActivityInterest::Adventure => &["natural", "sport", "amusements"],
        ActivityInterest::Relaxation => &["beaches", "natural", "gardens_and_parks"],
        ActivityInterest::Shopping => &["commercial", "shops"],
        ActivityInterest::Nightlife => &["foods", "adult"],
        ActivityInterest::TempleVisits => &["religion"],
        ActivityInterest::HeritageSites => &["historic", "architecture", "cultural"],
        ActivityInterest::AyurvedaWellness => &["sport", "foods"],
        ActivityInterest::WildlifeSafari => &["natural", "zoos"],
        ActivityInterest::Backwaters => &["natural", "beaches"],
        ActivityInterest::StreetFoodTours => &["foods"],
        ActivityInterest::Handicrafts => &["shops", "commercial"],
        ActivityInterest::YogaMeditation => &["sport", "religion"],
        ActivityInterest::HillStations => &["natural", "mountains"],
        ActivityInterest::DesertExploration => &["natural"],
    }
}

/// Comma-separated OpenTripMap kinds for a set of interests, deduplicated in
/// first-seen order.
pub fn kinds_for_interests(interests: &[ActivityInterest]) -> String {
    let mut kinds: Vec<&str> = Vec::new();
    for kind in interests.iter().flat_map(|i| interest_kinds(*i)) {
        if !kinds.contains(kind) {
            kinds.push(kind);
        }
    }
    if kinds.is_empty() {
        DEFAULT_KINDS.to_string()
    } else {
        kinds.join(",")
    }
}

pub fn estimate_cost(kinds: &str) -> f64 {
    if kinds.contains("museums") {
        15.0
    } else if kinds.contains("historic") {
        10.0
    } else if kinds.contains("amusements") {
        30.0
    } else if kinds.contains("zoos") {
        20.0
    } else if ["religion", "natural", "beaches", "gardens_and_parks"]
        .iter()
        .any(|free| kinds.contains(free))
    {
        0.0
    } else {
        10.0
    }
}

pub fn estimate_duration(kinds: &str) -> &'static str {
    if kinds.contains("museums") {
        "2-3 hours"
    } else if kinds.contains("historic") {
        "1-2 hours"
    } else if kinds.contains("amusements") {
        "3-4 hours"
    } else if kinds.contains("zoos") {
        "2-3 hours"
    } else if kinds.contains("religion") {
        "1 hour"
    } else if kinds.contains("natural") {
        "2 hours"
    } else if kinds.contains("beaches") {
        "3 hours"
    } else if kinds.contains("gardens_and_parks") {
        "1-2 hours"
    } else {
        "1 hour"
    }
}
