use serde::{Deserialize, Serialize};

use super::trip::{AccommodationTier, FoodTier};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attraction {
    pub name: String,
    pub description: String,
    pub cost: f64,
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Accommodation {
    pub name: String,
    pub description: String,
    pub cost_per_night: f64,
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodPlace {
    pub name: String,
    pub description: String,
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceCategory {
    Attraction,
    Accommodation,
    Food,
}

impl ResourceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceCategory::Attraction => "attraction",
            ResourceCategory::Accommodation => "accommodation",
            ResourceCategory::Food => "food",
        }
    }
}

impl std::fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a resolution step is looking for: the category plus the tier that
/// narrows it, where the category has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Attraction,
    Accommodation(AccommodationTier),
    Food(FoodTier),
}

impl ResourceKind {
    pub fn category(&self) -> ResourceCategory {
        match self {
            ResourceKind::Attraction => ResourceCategory::Attraction,
            ResourceKind::Accommodation(_) => ResourceCategory::Accommodation,
            ResourceKind::Food(_) => ResourceCategory::Food,
        }
    }
}

/// Normalized item produced by a provider adapter or the static catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateItem {
    Attraction(Attraction),
    Accommodation(Accommodation),
    Food(FoodPlace),
}

impl CandidateItem {
    pub fn name(&self) -> &str {
        match self {
            CandidateItem::Attraction(a) => &a.name,
            CandidateItem::Accommodation(a) => &a.name,
            CandidateItem::Food(f) => &f.name,
        }
    }

    pub fn category(&self) -> ResourceCategory {
        match self {
            CandidateItem::Attraction(_) => ResourceCategory::Attraction,
            CandidateItem::Accommodation(_) => ResourceCategory::Accommodation,
            CandidateItem::Food(_) => ResourceCategory::Food,
        }
    }

    pub fn into_attraction(self) -> Option<Attraction> {
        match self {
            CandidateItem::Attraction(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_accommodation(self) -> Option<Accommodation> {
        match self {
            CandidateItem::Accommodation(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_food(self) -> Option<FoodPlace> {
        match self {
            CandidateItem::Food(f) => Some(f),
            _ => None,
        }
    }
}

/// Google Maps search link used by adapters that have a name or coordinates.
pub fn maps_search_url(query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("https://www.google.com/maps/search/?api=1&query={}", encoded)
}
