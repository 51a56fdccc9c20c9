//! Yelp Fusion adapter for restaurants and hotels.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{check_status, http_client, ProviderAdapter, ProviderQuery};
use crate::errors::ProviderError;
use crate::models::candidate::{
    maps_search_url, Accommodation, CandidateItem, FoodPlace, ResourceCategory, ResourceKind,
};
use crate::models::trip::{AccommodationTier, FoodTier};

const YELP_API_URL: &str = "https://api.yelp.com/v3";
// Yelp rejects limits above 50
const MAX_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    businesses: Vec<Business>,
}

#[derive(Debug, Deserialize)]
struct Business {
    #[serde(default)]
    name: String,
    price: Option<String>,
    rating: Option<f64>,
    review_count: Option<u32>,
    image_url: Option<String>,
    #[serde(default)]
    categories: Vec<Category>,
    location: Option<Location>,
}

#[derive(Debug, Deserialize)]
struct Category {
    title: String,
}

#[derive(Debug, Deserialize)]
struct Location {
    #[serde(default)]
    display_address: Vec<String>,
}

impl Business {
    fn address(&self) -> String {
        self.location
            .as_ref()
            .map(|l| l.display_address.join(" "))
            .unwrap_or_default()
    }

    fn first_category(&self) -> Option<&str> {
        self.categories.first().map(|c| c.title.as_str())
    }
}

pub struct YelpProvider {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YelpProvider {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            http_client: http_client(timeout)?,
            api_key,
            base_url: YELP_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ProviderAdapter for YelpProvider {
    fn name(&self) -> &'static str {
        "yelp"
    }

    fn supports(&self, category: ResourceCategory) -> bool {
        matches!(
            category,
            ResourceCategory::Accommodation | ResourceCategory::Food
        )
    }

    async fn query(&self, query: &ProviderQuery) -> Result<Vec<CandidateItem>, ProviderError> {
        let (term, categories, price) = match query.kind {
            ResourceKind::Food(tier) => ("restaurants", food_categories(tier), food_price(tier)),
            ResourceKind::Accommodation(tier) => ("hotels", "hotels", accommodation_price(tier)),
            ResourceKind::Attraction => return Ok(Vec::new()),
        };

        let response = self
            .http_client
            .get(format!("{}/businesses/search", self.base_url))
            .bearer_auth(&self.api_key)
            .query(&[
                ("location", query.location_label()),
                ("term", term.to_string()),
                ("categories", categories.to_string()),
                ("price", price.to_string()),
                ("limit", query.pool_size().min(MAX_LIMIT).to_string()),
                ("sort_by", "rating".to_string()),
            ])
            .send()
            .await?;
        let search: SearchResponse = check_status(response).await?.json().await?;

        Ok(search
            .businesses
            .into_iter()
            .filter(|b| !b.name.trim().is_empty())
            .filter_map(|b| match query.kind {
                ResourceKind::Food(tier) => Some(CandidateItem::Food(to_food(b, tier))),
                ResourceKind::Accommodation(tier) => {
                    Some(CandidateItem::Accommodation(to_accommodation(b, tier)))
                }
                ResourceKind::Attraction => None,
            })
            .collect())
    }
}

fn food_categories(tier: FoodTier) -> &'static str {
    match tier {
        FoodTier::Fine => "restaurants,gourmet",
        _ => "restaurants",
    }
}

fn food_price(tier: FoodTier) -> &'static str {
    match tier {
        FoodTier::Budget => "1,2",
        FoodTier::Local => "1,2,3",
        FoodTier::Fine => "3,4",
    }
}

fn accommodation_price(tier: AccommodationTier) -> &'static str {
    match tier {
        AccommodationTier::Budget => "1,2",
        AccommodationTier::MidRange => "2,3",
        AccommodationTier::Luxury => "3,4",
    }
}

pub fn meal_cost(price: Option<&str>, tier: FoodTier) -> f64 {
    match price {
        Some("$") => 10.0,
        Some("$$") => 20.0,
        Some("$$$") => 40.0,
        Some("$$$$") => 80.0,
        _ => match tier {
            FoodTier::Budget => 10.0,
            FoodTier::Local => 20.0,
            FoodTier::Fine => 60.0,
        },
    }
}

pub fn nightly_cost(price: Option<&str>, tier: AccommodationTier) -> f64 {
    match price {
        Some("$") => 60.0,
        Some("$$") => 120.0,
        Some("$$$") => 220.0,
        Some("$$$$") => 380.0,
        _ => match tier {
            AccommodationTier::Budget => 50.0,
            AccommodationTier::MidRange => 120.0,
            AccommodationTier::Luxury => 250.0,
        },
    }
}

fn to_food(business: Business, tier: FoodTier) -> FoodPlace {
    let map_query = format!("{} {}", business.name, business.address());
    FoodPlace {
        description: format!(
            "{} restaurant",
            business.first_category().unwrap_or("Local cuisine")
        ),
        cost: meal_cost(business.price.as_deref(), tier),
        rating: business.rating,
        review_count: business.review_count,
        map_url: Some(maps_search_url(map_query.trim())),
        image_url: business.image_url.filter(|u| !u.is_empty()),
        name: business.name,
    }
}

fn to_accommodation(business: Business, tier: AccommodationTier) -> Accommodation {
    let map_query = format!("{} {}", business.name, business.address());
    Accommodation {
        description: business
            .first_category()
            .map(|c| format!("{} stay", c))
            .unwrap_or_else(|| "A comfortable place to stay".to_string()),
        cost_per_night: nightly_cost(business.price.as_deref(), tier),
        rating: business.rating.unwrap_or(3.5).clamp(1.0, 5.0),
        map_url: Some(maps_search_url(map_query.trim())),
        image_url: business.image_url.filter(|u| !u.is_empty()),
        name: business.name,
    }
}
