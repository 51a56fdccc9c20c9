//! Geoapify adapter
//!
//! Accommodation and food. Geoapify lists places but not prices, so cost and
//! rating are spread across a per-tier range using the place id. The same
//! place always gets the same numbers.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{check_status, http_client, spread_from_id, ProviderAdapter, ProviderQuery};
use crate::errors::ProviderError;
use crate::models::candidate::{
    maps_search_url, Accommodation, CandidateItem, FoodPlace, ResourceCategory, ResourceKind,
};
use crate::models::trip::{AccommodationTier, FoodTier};

const GEOAPIFY_API_URL: &str = "https://api.geoapify.com";
const INDIA_LODGING_FACTOR: f64 = 0.6;
const INDIA_FOOD_FACTOR: f64 = 0.5;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: PlaceProperties,
}

#[derive(Debug, Deserialize, Default)]
struct PlaceProperties {
    name: Option<String>,
    #[serde(default)]
    place_id: String,
    #[serde(default)]
    categories: Vec<String>,
    city: Option<String>,
    suburb: Option<String>,
    country: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl PlaceProperties {
    fn locality(&self) -> &str {
        self.city
            .as_deref()
            .or(self.suburb.as_deref())
            .unwrap_or_default()
    }

    fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    fn map_url(&self, name: &str) -> String {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => maps_search_url(&format!("{},{}", lat, lon)),
            _ => maps_search_url(name),
        }
    }

    fn in_india(&self) -> bool {
        self.country.as_deref() == Some("India")
    }
}

pub struct GeoapifyProvider {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeoapifyProvider {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: http_client(timeout)?,
            api_key,
            base_url: GEOAPIFY_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolve the city to a Geoapify place id usable in a `place:` filter.
    async fn place_id(&self, query: &ProviderQuery) -> Result<String, ProviderError> {
        let label = query.location_label();
        let response = self
            .http_client
            .get(format!("{}/v1/geocode/search", self.base_url))
            .query(&[
                ("text", label.as_str()),
                ("type", "city"),
                ("limit", "1"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;
        let found: FeatureCollection = check_status(response).await?.json().await?;

        found
            .features
            .into_iter()
            .map(|f| f.properties.place_id)
            .find(|id| !id.is_empty())
            .ok_or(ProviderError::NotFound(label))
    }
}

#[async_trait]
impl ProviderAdapter for GeoapifyProvider {
    fn name(&self) -> &'static str {
        "geoapify"
    }

    fn supports(&self, category: ResourceCategory) -> bool {
        matches!(
            category,
            ResourceCategory::Accommodation | ResourceCategory::Food
        )
    }

    async fn query(&self, query: &ProviderQuery) -> Result<Vec<CandidateItem>, ProviderError> {
        let categories = match query.kind {
            ResourceKind::Accommodation(tier) => accommodation_categories(tier),
            ResourceKind::Food(tier) => food_categories(tier),
            ResourceKind::Attraction => return Ok(Vec::new()),
        };

        let place_id = self.place_id(query).await?;
        let response = self
            .http_client
            .get(format!("{}/v2/places", self.base_url))
            .query(&[
                ("categories", categories.to_string()),
                ("filter", format!("place:{}", place_id)),
                ("limit", query.pool_size().to_string()),
                ("apiKey", self.api_key.clone()),
            ])
            .send()
            .await?;
        let places: FeatureCollection = check_status(response).await?.json().await?;

        let india = query.is_india();
        Ok(places
            .features
            .into_iter()
            .filter_map(|f| match query.kind {
                ResourceKind::Accommodation(tier) => {
                    to_accommodation(f.properties, tier, india).map(CandidateItem::Accommodation)
                }
                ResourceKind::Food(tier) => {
                    to_food(f.properties, tier, india).map(CandidateItem::Food)
                }
                ResourceKind::Attraction => None,
            })
            .collect())
    }
}

fn accommodation_categories(tier: AccommodationTier) -> &'static str {
    match tier {
        AccommodationTier::Budget => "accommodation.hostel,accommodation.guest_house",
        AccommodationTier::MidRange => "accommodation.hotel",
        AccommodationTier::Luxury => "accommodation.hotel.luxury",
    }
}

fn food_categories(tier: FoodTier) -> &'static str {
    match tier {
        FoodTier::Budget => "catering.fast_food,catering.food_court",
        FoodTier::Local => "catering.restaurant",
        FoodTier::Fine => "catering.restaurant.gourmet",
    }
}

/// (base, span) for nightly cost and (base rating in tenths, span).
fn accommodation_ranges(tier: AccommodationTier) -> ((f64, u32), (f64, u32)) {
    match tier {
        AccommodationTier::Budget => ((40.0, 30), (30.0, 10)),
        AccommodationTier::MidRange => ((100.0, 50), (35.0, 10)),
        AccommodationTier::Luxury => ((200.0, 150), (40.0, 10)),
    }
}

fn food_range(tier: FoodTier) -> (f64, u32) {
    match tier {
        FoodTier::Budget => (5.0, 5),
        FoodTier::Local => (15.0, 10),
        FoodTier::Fine => (40.0, 30),
    }
}

pub fn estimate_nightly_cost(place_id: &str, tier: AccommodationTier, india: bool) -> f64 {
    let ((base, span), _) = accommodation_ranges(tier);
    let cost = spread_from_id(place_id, base, span);
    if india {
        (cost * INDIA_LODGING_FACTOR).round()
    } else {
        cost
    }
}

pub fn estimate_rating(place_id: &str, tier: AccommodationTier) -> f64 {
    let (_, (tenths, span)) = accommodation_ranges(tier);
    spread_from_id(place_id, tenths, span) / 10.0
}

pub fn estimate_meal_cost(place_id: &str, tier: FoodTier, india: bool) -> f64 {
    let (base, span) = food_range(tier);
    let cost = spread_from_id(place_id, base, span);
    if india {
        (cost * INDIA_FOOD_FACTOR).round()
    } else {
        cost
    }
}

fn to_accommodation(
    props: PlaceProperties,
    tier: AccommodationTier,
    india: bool,
) -> Option<Accommodation> {
    let name = props.name.clone().filter(|n| !n.trim().is_empty())?;
    let kind = if props.has_category("accommodation.hotel.luxury") {
        Some("Luxury hotel")
    } else if props.has_category("accommodation.hotel") {
        Some("Hotel")
    } else if props.has_category("accommodation.hostel") {
        Some("Hostel")
    } else if props.has_category("accommodation.guest_house") {
        Some("Guest house")
    } else {
        None
    };
    let description = match kind {
        Some(kind) => match props.locality().trim() {
            "" => kind.to_string(),
            locality => format!("{} in {}", kind, locality),
        },
        None => name.clone(),
    };

    Some(Accommodation {
        description,
        cost_per_night: estimate_nightly_cost(&props.place_id, tier, india || props.in_india()),
        rating: estimate_rating(&props.place_id, tier),
        image_url: None,
        map_url: Some(props.map_url(&name)),
        name,
    })
}

/// `catering.restaurant.north_indian` becomes "North indian".
fn cuisine_label(categories: &[String]) -> String {
    categories
        .iter()
        .find_map(|c| c.strip_prefix("catering.restaurant."))
        .map(|cuisine| {
            let cuisine = cuisine.replacen('_', " ", 1);
            let mut chars = cuisine.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .filter(|label| !label.is_empty())
        .unwrap_or_else(|| "Local cuisine".to_string())
}

fn to_food(props: PlaceProperties, tier: FoodTier, india: bool) -> Option<FoodPlace> {
    let name = props.name.clone().filter(|n| !n.trim().is_empty())?;
    Some(FoodPlace {
        description: format!("{} restaurant", cuisine_label(&props.categories)),
        cost: estimate_meal_cost(&props.place_id, tier, india || props.in_india()),
        rating: None,
        review_count: None,
        image_url: None,
        map_url: Some(props.map_url(&name)),
        name,
    })
}
