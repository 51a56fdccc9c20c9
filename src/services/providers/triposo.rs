//! Triposo adapter
//!
//! One `poi.json` endpoint covers all three categories; the tag label picks
//! hotels or eateries and the price-tier annotation narrows by tier.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{check_status, http_client, ProviderAdapter, ProviderQuery};
use crate::errors::ProviderError;
use crate::models::candidate::{
    maps_search_url, Accommodation, Attraction, CandidateItem, FoodPlace, ResourceCategory,
    ResourceKind,
};
use crate::models::trip::{AccommodationTier, FoodTier};

const TRIPOSO_API_URL: &str = "https://www.triposo.com/api/20220104";
const POI_FIELDS: &str = "id,name,snippet,intro,images,coordinates,score,price_tier,tag_labels";

#[derive(Debug, Deserialize)]
struct PoiResponse {
    #[serde(default)]
    results: Vec<Poi>,
}

#[derive(Debug, Deserialize)]
struct Poi {
    #[serde(default)]
    name: String,
    snippet: Option<String>,
    intro: Option<String>,
    #[serde(default)]
    images: Vec<PoiImage>,
    score: Option<f64>,
    price_tier: Option<u8>,
    #[serde(default)]
    tag_labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PoiImage {
    sizes: ImageSizes,
}

#[derive(Debug, Deserialize)]
struct ImageSizes {
    medium: Option<ImageSize>,
}

#[derive(Debug, Deserialize)]
struct ImageSize {
    url: String,
}

impl Poi {
    fn image_url(&self) -> Option<String> {
        self.images
            .first()
            .and_then(|img| img.sizes.medium.as_ref())
            .map(|m| m.url.clone())
    }

    fn description(&self, fallback: &str) -> String {
        self.snippet
            .clone()
            .or_else(|| self.intro.clone())
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    fn has_tag(&self, tag: &str) -> bool {
        self.tag_labels.iter().any(|t| t == tag)
    }
}

pub struct TriposoProvider {
    http_client: reqwest::Client,
    account: String,
    token: String,
    base_url: String,
}

impl TriposoProvider {
    pub fn new(account: String, token: String, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: http_client(timeout)?,
            account,
            token,
            base_url: TRIPOSO_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ProviderAdapter for TriposoProvider {
    fn name(&self) -> &'static str {
        "triposo"
    }

    fn supports(&self, _category: ResourceCategory) -> bool {
        true
    }

    async fn query(&self, query: &ProviderQuery) -> Result<Vec<CandidateItem>, ProviderError> {
        let mut params: Vec<(&str, String)> = vec![
            ("location_id", location_id(&query.city, query.country.as_deref())),
            ("count", query.pool_size().to_string()),
            ("fields", POI_FIELDS.to_string()),
            ("order_by", "-score".to_string()),
            ("account", self.account.clone()),
            ("token", self.token.clone()),
        ];
        match query.kind {
            ResourceKind::Attraction => {}
            ResourceKind::Accommodation(tier) => {
                params.push(("tag_labels", "hotels".to_string()));
                params.push(("annotate", accommodation_price_filter(tier).to_string()));
            }
            ResourceKind::Food(tier) => {
                params.push(("tag_labels", "eating".to_string()));
                params.push(("annotate", food_price_filter(tier).to_string()));
            }
        }

        let response = self
            .http_client
            .get(format!("{}/poi.json", self.base_url))
            .query(&params)
            .send()
            .await?;
        let pois: PoiResponse = check_status(response).await?.json().await?;

        let location = query.location_label();
        Ok(pois
            .results
            .into_iter()
            .filter(|poi| !poi.name.trim().is_empty())
            .map(|poi| match query.kind {
                ResourceKind::Attraction => CandidateItem::Attraction(poi_to_attraction(poi, &location)),
                ResourceKind::Accommodation(tier) => {
                    CandidateItem::Accommodation(poi_to_accommodation(poi, tier, &location))
                }
                ResourceKind::Food(tier) => CandidateItem::Food(poi_to_food(poi, tier, &location)),
            })
            .collect())
    }
}

/// Triposo ids look like `paris` or `new_york_city`.
pub fn location_id(city: &str, country: Option<&str>) -> String {
    let raw = match country {
        Some(country) => format!("{}_{}", city.trim(), country.trim()),
        None => city.trim().to_string(),
    };
    raw.to_lowercase().replace(' ', "_")
}

fn accommodation_price_filter(tier: AccommodationTier) -> &'static str {
    match tier {
        AccommodationTier::Budget => "price_tier:1,price_tier:2",
        AccommodationTier::MidRange => "price_tier:3",
        AccommodationTier::Luxury => "price_tier:4,price_tier:5",
    }
}

fn food_price_filter(tier: FoodTier) -> &'static str {
    match tier {
        FoodTier::Budget => "price_tier:1,price_tier:2",
        FoodTier::Local => "price_tier:2,price_tier:3",
        FoodTier::Fine => "price_tier:4,price_tier:5",
    }
}

pub fn attraction_cost(price_tier: Option<u8>) -> f64 {
    match price_tier {
        Some(2) => 10.0,
        Some(3) => 20.0,
        Some(4) => 35.0,
        Some(5) => 50.0,
        _ => 0.0,
    }
}

pub fn nightly_cost(price_tier: Option<u8>, tier: AccommodationTier) -> f64 {
    match price_tier {
        Some(1) => 30.0,
        Some(2) => 60.0,
        Some(3) => 120.0,
        Some(4) => 200.0,
        Some(5) => 350.0,
        _ => match tier {
            AccommodationTier::Budget => 50.0,
            AccommodationTier::MidRange => 100.0,
            AccommodationTier::Luxury => 250.0,
        },
    }
}

pub fn meal_cost(price_tier: Option<u8>, tier: FoodTier) -> f64 {
    match price_tier {
        Some(1) => 8.0,
        Some(2) => 15.0,
        Some(3) => 25.0,
        Some(4) => 45.0,
        Some(5) => 75.0,
        _ => match tier {
            FoodTier::Budget => 10.0,
            FoodTier::Local => 20.0,
            FoodTier::Fine => 60.0,
        },
    }
}

/// Scores run roughly 0-10; ratings are 1-5.
pub fn rating_from_score(score: Option<f64>) -> f64 {
    match score {
        Some(score) => ((score / 2.0).clamp(1.0, 5.0) * 10.0).round() / 10.0,
        None => 3.5,
    }
}

fn attraction_duration(poi: &Poi) -> &'static str {
    if poi.has_tag("museums") {
        "2-3 hours"
    } else if poi.has_tag("amusement_parks") {
        "3-4 hours"
    } else if poi.has_tag("monuments") {
        "30 minutes"
    } else if poi.has_tag("natural") {
        "2-3 hours"
    } else {
        "1-2 hours"
    }
}

fn poi_to_attraction(poi: Poi, location: &str) -> Attraction {
    Attraction {
        description: poi.description("A popular attraction"),
        cost: attraction_cost(poi.price_tier),
        duration: attraction_duration(&poi).to_string(),
        image_url: poi.image_url(),
        map_url: Some(maps_search_url(&format!("{} {}", poi.name, location))),
        tags: poi.tag_labels,
        name: poi.name,
    }
}

fn poi_to_accommodation(poi: Poi, tier: AccommodationTier, location: &str) -> Accommodation {
    Accommodation {
        description: poi.description("A comfortable place to stay"),
        cost_per_night: nightly_cost(poi.price_tier, tier),
        rating: rating_from_score(poi.score),
        image_url: poi.image_url(),
        map_url: Some(maps_search_url(&format!("{} {}", poi.name, location))),
        name: poi.name,
    }
}

fn poi_to_food(poi: Poi, tier: FoodTier, location: &str) -> FoodPlace {
    FoodPlace {
        description: poi.description("Local eatery"),
        cost: meal_cost(poi.price_tier, tier),
        rating: Some(rating_from_score(poi.score)),
        review_count: None,
        image_url: poi.image_url(),
        map_url: Some(maps_search_url(&format!("{} {}", poi.name, location))),
        name: poi.name,
    }
}
