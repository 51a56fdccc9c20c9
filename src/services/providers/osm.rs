//! OpenStreetMap adapter
//!
//! Keyless. Nominatim turns the city into coordinates, then an Overpass
//! `around:` query pulls tagged nodes/ways nearby. OSM has no prices, so
//! cost, duration and rating are estimated from tags.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use super::{check_status, http_client, ProviderAdapter, ProviderQuery};
use crate::errors::ProviderError;
use crate::models::candidate::{
    maps_search_url, Accommodation, Attraction, CandidateItem, FoodPlace, ResourceCategory,
    ResourceKind,
};
use crate::models::trip::{AccommodationTier, FoodTier};

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
const SEARCH_RADIUS_METERS: u32 = 5000;
// many elements come back without a name, so ask for more than we need
const OVERSAMPLE: usize = 5;

const ATTRACTION_FILTERS: &[&str] = &[
    "tourism=attraction",
    "tourism=museum",
    "tourism=gallery",
    "tourism=viewpoint",
    "historic=monument",
    "historic=castle",
    "historic=ruins",
    "leisure=park",
];

const INDIA_ATTRACTION_FILTERS: &[&str] = &[
    "historic=temple",
    "historic=fort",
    "historic=palace",
    "natural=beach",
    "amenity=place_of_worship",
];

type Tags = HashMap<String, String>;

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<Center>,
    #[serde(default)]
    tags: Tags,
}

#[derive(Debug, Deserialize)]
struct Center {
    lat: f64,
    lon: f64,
}

impl Element {
    fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon, &self.center) {
            (Some(lat), Some(lon), _) => Some((lat, lon)),
            (_, _, Some(center)) => Some((center.lat, center.lon)),
            _ => None,
        }
    }
}

pub struct OsmProvider {
    http_client: reqwest::Client,
    nominatim_url: String,
    overpass_url: String,
}

impl OsmProvider {
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: http_client(timeout)?,
            nominatim_url: NOMINATIM_URL.to_string(),
            overpass_url: OVERPASS_URL.to_string(),
        })
    }

    /// Point both Nominatim and Overpass at other hosts, e.g. a mirror or a
    /// local mock.
    pub fn with_endpoints(
        mut self,
        nominatim_url: impl Into<String>,
        overpass_url: impl Into<String>,
    ) -> Self {
        self.nominatim_url = nominatim_url.into();
        self.overpass_url = overpass_url.into();
        self
    }

    async fn geocode(&self, query: &ProviderQuery) -> Result<(f64, f64), ProviderError> {
        let label = query.location_label();
        let response = self
            .http_client
            .get(format!("{}/search", self.nominatim_url))
            .query(&[("format", "json"), ("limit", "1"), ("q", label.as_str())])
            .send()
            .await?;
        let places: Vec<NominatimPlace> = check_status(response).await?.json().await?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NotFound(label.clone()))?;
        let lat = place
            .lat
            .parse::<f64>()
            .map_err(|_| ProviderError::Decode(format!("bad latitude for {}", label)))?;
        let lon = place
            .lon
            .parse::<f64>()
            .map_err(|_| ProviderError::Decode(format!("bad longitude for {}", label)))?;
        Ok((lat, lon))
    }

    async fn elements(
        &self,
        filters: &[&str],
        center: (f64, f64),
        limit: usize,
    ) -> Result<Vec<Element>, ProviderError> {
        let query = overpass_query(filters, center, SEARCH_RADIUS_METERS, limit);
        let response = self
            .http_client
            .post(&self.overpass_url)
            .form(&[("data", query)])
            .send()
            .await?;
        let body: OverpassResponse = check_status(response).await?.json().await?;
        Ok(body.elements)
    }
}

#[async_trait]
impl ProviderAdapter for OsmProvider {
    fn name(&self) -> &'static str {
        "osm"
    }

    fn supports(&self, _category: ResourceCategory) -> bool {
        true
    }

    async fn query(&self, query: &ProviderQuery) -> Result<Vec<CandidateItem>, ProviderError> {
        let india = query.is_india();
        let filters: Vec<&str> = match query.kind {
            ResourceKind::Attraction if india => ATTRACTION_FILTERS
                .iter()
                .chain(INDIA_ATTRACTION_FILTERS)
                .copied()
                .collect(),
            ResourceKind::Attraction => ATTRACTION_FILTERS.to_vec(),
            ResourceKind::Accommodation(tier) => accommodation_filters(tier).to_vec(),
            ResourceKind::Food(tier) => food_filters(tier).to_vec(),
        };

        let center = self.geocode(query).await?;
        let pool = query.pool_size();
        let elements = self.elements(&filters, center, pool * OVERSAMPLE).await?;

        let items = elements
            .into_iter()
            .filter_map(|element| {
                let (lat, lon) = element.coordinates()?;
                let name = element.tags.get("name")?.trim().to_string();
                if name.is_empty() {
                    return None;
                }
                let map_url = Some(maps_search_url(&format!("{},{}", lat, lon)));
                let tags = element.tags;
                let item = match query.kind {
                    ResourceKind::Attraction => CandidateItem::Attraction(Attraction {
                        description: describe(&tags),
                        cost: estimate_visit_cost(&tags),
                        duration: estimate_visit_duration(&tags).to_string(),
                        image_url: image_url(&tags),
                        map_url,
                        tags: poi_tags(&tags),
                        name,
                    }),
                    ResourceKind::Accommodation(tier) => {
                        CandidateItem::Accommodation(Accommodation {
                            description: describe(&tags),
                            cost_per_night: estimate_nightly_cost(&tags, tier, india),
                            rating: estimate_lodging_rating(&tags),
                            image_url: image_url(&tags),
                            map_url,
                            name,
                        })
                    }
                    ResourceKind::Food(tier) => CandidateItem::Food(FoodPlace {
                        description: describe_eatery(&tags),
                        cost: estimate_meal_cost(&tags, tier, india),
                        rating: None,
                        review_count: None,
                        image_url: image_url(&tags),
                        map_url,
                        name,
                    }),
                };
                Some(item)
            })
            .take(pool)
            .collect();
        Ok(items)
    }
}

fn accommodation_filters(tier: AccommodationTier) -> &'static [&'static str] {
    match tier {
        AccommodationTier::Budget => &["tourism=hostel", "tourism=guest_house", "tourism=motel"],
        AccommodationTier::MidRange => &["tourism=hotel", "tourism=apartment"],
        AccommodationTier::Luxury => &["tourism=hotel"],
    }
}

fn food_filters(tier: FoodTier) -> &'static [&'static str] {
    match tier {
        FoodTier::Budget => &["amenity=fast_food", "amenity=food_court"],
        FoodTier::Local => &["amenity=restaurant"],
        FoodTier::Fine => &["amenity=restaurant", "cuisine=fine_dining"],
    }
}

pub fn overpass_query(filters: &[&str], center: (f64, f64), radius: u32, limit: usize) -> String {
    let (lat, lon) = center;
    let mut body = String::new();
    for filter in filters {
        let Some((key, value)) = filter.split_once('=') else {
            continue;
        };
        for element in ["node", "way", "relation"] {
            body.push_str(&format!(
                "{}[\"{}\"=\"{}\"](around:{},{},{});",
                element, key, value, radius, lat, lon
            ));
        }
    }
    format!("[out:json][timeout:25];({});out center {};", body, limit)
}

fn tag<'a>(tags: &'a Tags, key: &str) -> Option<&'a str> {
    tags.get(key).map(String::as_str)
}

fn tagged(tags: &Tags, key: &str, value: &str) -> bool {
    tag(tags, key) == Some(value)
}

fn image_url(tags: &Tags) -> Option<String> {
    tag(tags, "image")
        .filter(|url| url.starts_with("http"))
        .map(String::from)
}

fn poi_tags(tags: &Tags) -> Vec<String> {
    ["tourism", "historic", "leisure", "amenity", "natural", "religion"]
        .iter()
        .filter_map(|key| tag(tags, key))
        .map(String::from)
        .collect()
}

pub fn describe(tags: &Tags) -> String {
    if let Some(description) = tag(tags, "description").filter(|d| !d.trim().is_empty()) {
        return description.to_string();
    }
    let mut parts = Vec::new();
    if let Some(historic) = tag(tags, "historic") {
        parts.push(format!("Historic {}", historic));
    }
    if let Some(architecture) = tag(tags, "architecture") {
        parts.push(format!("{} architecture", architecture));
    }
    if let Some(tourism) = tag(tags, "tourism") {
        parts.push(format!("Tourist {}", tourism.replace('_', " ")));
    }
    if let Some(amenity) = tag(tags, "amenity") {
        parts.push(amenity.replace('_', " "));
    }
    if parts.is_empty() {
        "Point of interest".to_string()
    } else {
        parts.join(", ")
    }
}

fn describe_eatery(tags: &Tags) -> String {
    let cuisine = tag(tags, "cuisine")
        .and_then(|c| c.split(';').next())
        .map(|c| c.trim().replace('_', " "))
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "Local cuisine".to_string());
    let kind = if tagged(tags, "amenity", "restaurant") {
        "restaurant"
    } else {
        "eatery"
    };
    format!("{} {}", cuisine, kind)
}

pub fn estimate_visit_duration(tags: &Tags) -> &'static str {
    if tagged(tags, "tourism", "museum") {
        "2-3 hours"
    } else if tagged(tags, "tourism", "gallery") {
        "1-2 hours"
    } else if tagged(tags, "historic", "castle") || tagged(tags, "historic", "fort") {
        "2-3 hours"
    } else if tagged(tags, "leisure", "park") {
        "1-2 hours"
    } else if tagged(tags, "tourism", "viewpoint") || tagged(tags, "historic", "monument") {
        "30 minutes"
    } else {
        "1 hour"
    }
}

fn fee_amount_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\d+(\.\d+)?").ok())
        .as_ref()
}

/// First number in a free-form `fee:amount` tag such as "EUR 17" or "₹50".
pub fn parse_fee_amount(raw: &str) -> Option<f64> {
    fee_amount_pattern()?
        .find(raw)
        .and_then(|m| m.as_str().parse().ok())
}

pub fn estimate_visit_cost(tags: &Tags) -> f64 {
    if let Some(amount) = tag(tags, "fee:amount").and_then(parse_fee_amount) {
        return amount;
    }
    if tagged(tags, "fee", "no") || tagged(tags, "access", "yes") {
        return 0.0;
    }
    if tagged(tags, "tourism", "museum") {
        15.0
    } else if tagged(tags, "tourism", "gallery") {
        12.0
    } else if tagged(tags, "historic", "castle") {
        20.0
    } else if tagged(tags, "tourism", "attraction") {
        10.0
    } else if tagged(tags, "leisure", "park") || tagged(tags, "tourism", "viewpoint") {
        0.0
    } else {
        10.0
    }
}

fn tagged_india(tags: &Tags) -> bool {
    matches!(tag(tags, "addr:country"), Some("India") | Some("IN"))
        || tagged(tags, "country", "India")
}

fn stars(tags: &Tags) -> Option<f64> {
    tag(tags, "stars").and_then(|s| {
        s.trim()
            .trim_end_matches(|c: char| !c.is_ascii_digit())
            .parse::<f64>()
            .ok()
    })
}

pub fn estimate_nightly_cost(tags: &Tags, tier: AccommodationTier, india: bool) -> f64 {
    let india = india || tagged_india(tags);
    let (budget, mid_range, luxury) = if india {
        (30.0, 75.0, 150.0)
    } else {
        (50.0, 120.0, 250.0)
    };

    if india {
        if tagged(tags, "tourism", "heritage_hotel") || tagged(tags, "building", "haveli") {
            return (luxury * 1.2_f64).round();
        }
        if tagged(tags, "tourism", "guest_house") || tagged(tags, "tourism", "hostel") {
            return (budget * 0.7_f64).round();
        }
        let ashram = tagged(tags, "amenity", "ashram")
            || tag(tags, "name").map_or(false, |n| n.to_lowercase().contains("ashram"));
        if ashram {
            return (budget * 0.8_f64).round();
        }
    }

    let mut multiplier = match stars(tags).map(f64::floor) {
        Some(s) if s <= 2.0 => 0.8,
        Some(s) if s < 4.0 => 1.0,
        Some(s) if s < 5.0 => 1.3,
        Some(_) => 1.8,
        None => 1.0,
    };
    let central = tagged(tags, "location", "city_center")
        || tag(tags, "addr:district").map_or(false, |d| d.to_lowercase().contains("central"));
    if central {
        multiplier *= 1.2;
    }

    let base = match tier {
        AccommodationTier::Budget => budget,
        AccommodationTier::MidRange => mid_range,
        AccommodationTier::Luxury => luxury,
    };
    (base * multiplier).round()
}

pub fn estimate_lodging_rating(tags: &Tags) -> f64 {
    if let Some(stars) = stars(tags) {
        return stars.clamp(1.0, 5.0);
    }
    match tag(tags, "tourism") {
        Some("hotel") => 4.0,
        Some("hostel") => 3.5,
        Some("guest_house") => 3.7,
        Some("apartment") => 4.2,
        _ => 3.8,
    }
}

fn cuisine_multiplier(cuisines: &[&str]) -> f64 {
    const MULTIPLIERS: &[(&str, f64)] = &[
        ("fine_dining", 2.0),
        ("sushi", 1.5),
        ("seafood", 1.3),
        ("italian", 1.3),
        ("french", 1.4),
        ("indian", 1.0),
        ("north_indian", 1.1),
        ("south_indian", 0.9),
        ("gujarati", 0.9),
        ("bengali", 1.0),
        ("punjabi", 1.1),
        ("kerala", 1.0),
        ("goan", 1.2),
        ("fast_food", 0.7),
        ("street_food", 0.6),
        ("dhaba", 0.5),
    ];
    MULTIPLIERS
        .iter()
        .find(|(cuisine, _)| cuisines.contains(cuisine))
        .map_or(1.0, |(_, m)| *m)
}

pub fn estimate_meal_cost(tags: &Tags, tier: FoodTier, india: bool) -> f64 {
    let india = india || tagged_india(tags);
    let base = match (tier, india) {
        (FoodTier::Budget, false) => 8.0,
        (FoodTier::Local, false) => 20.0,
        (FoodTier::Fine, false) => 50.0,
        (FoodTier::Budget, true) => 4.0,
        (FoodTier::Local, true) => 10.0,
        (FoodTier::Fine, true) => 25.0,
    };
    let cuisines: Vec<&str> = tag(tags, "cuisine")
        .map(|c| c.split(';').map(str::trim).collect())
        .unwrap_or_default();
    (base * cuisine_multiplier(&cuisines)).round()
}
