//! Static catalog
//!
//! Hand-authored sample data used when every provider in a chain comes back
//! empty. Loaded once at startup and shared read-only. Lookups are
//! case-insensitive and land on the `"default"` entry for unknown cities.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::errors::CatalogError;
use crate::models::candidate::{Accommodation, Attraction, CandidateItem, FoodPlace, ResourceKind};
use crate::models::trip::{AccommodationTier, FoodTier};

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");
const DEFAULT_CITY: &str = "default";

const ACCOMMODATION_TIERS: [AccommodationTier; 3] = [
    AccommodationTier::Budget,
    AccommodationTier::MidRange,
    AccommodationTier::Luxury,
];
const FOOD_TIERS: [FoodTier; 3] = [FoodTier::Budget, FoodTier::Local, FoodTier::Fine];

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CityCatalog {
    #[serde(default)]
    pub attractions: Vec<Attraction>,
    #[serde(default)]
    pub accommodation: HashMap<String, Vec<Accommodation>>,
    #[serde(default)]
    pub food: HashMap<String, Vec<FoodPlace>>,
}

#[derive(Debug, Clone)]
pub struct StaticCatalog {
    cities: HashMap<String, CityCatalog>,
}

impl StaticCatalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let parsed: HashMap<String, CityCatalog> = serde_json::from_str(raw)?;
        Self::from_cities(parsed)
    }

    pub fn from_cities(cities: HashMap<String, CityCatalog>) -> Result<Self, CatalogError> {
        let cities = cities
            .into_iter()
            .map(|(name, entry)| (name.trim().to_lowercase(), entry))
            .collect();
        let catalog = Self { cities };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The default entry must cover every category and tier, otherwise the
    /// fallback chain could run dry.
    fn validate(&self) -> Result<(), CatalogError> {
        let default = self
            .cities
            .get(DEFAULT_CITY)
            .ok_or(CatalogError::MissingDefault)?;

        if default.attractions.is_empty() {
            return Err(CatalogError::EmptyDefaultBucket("attractions".to_string()));
        }
        for tier in ACCOMMODATION_TIERS {
            if default
                .accommodation
                .get(tier.as_str())
                .map_or(true, |bucket| bucket.is_empty())
            {
                return Err(CatalogError::EmptyDefaultBucket(format!(
                    "accommodation/{}",
                    tier.as_str()
                )));
            }
        }
        for tier in FOOD_TIERS {
            if default
                .food
                .get(tier.as_str())
                .map_or(true, |bucket| bucket.is_empty())
            {
                return Err(CatalogError::EmptyDefaultBucket(format!(
                    "food/{}",
                    tier.as_str()
                )));
            }
        }
        Ok(())
    }

    pub fn has_city(&self, city: &str) -> bool {
        let key = city.trim().to_lowercase();
        key != DEFAULT_CITY && self.cities.contains_key(&key)
    }

    pub fn city_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .cities
            .keys()
            .map(String::as_str)
            .filter(|name| *name != DEFAULT_CITY)
            .collect();
        names.sort_unstable();
        names
    }

    fn default_entry(&self) -> &CityCatalog {
        // validate() guarantees the default entry exists
        &self.cities[DEFAULT_CITY]
    }

    fn entry(&self, city: &str) -> Option<&CityCatalog> {
        self.cities.get(&city.trim().to_lowercase())
    }

    pub fn attractions(&self, city: &str) -> &[Attraction] {
        match self.entry(city) {
            Some(entry) if !entry.attractions.is_empty() => &entry.attractions,
            _ => &self.default_entry().attractions,
        }
    }

    pub fn accommodations(&self, city: &str, tier: AccommodationTier) -> &[Accommodation] {
        self.entry(city)
            .and_then(|entry| entry.accommodation.get(tier.as_str()))
            .filter(|bucket| !bucket.is_empty())
            .or_else(|| self.default_entry().accommodation.get(tier.as_str()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn food(&self, city: &str, tier: FoodTier) -> &[FoodPlace] {
        self.entry(city)
            .and_then(|entry| entry.food.get(tier.as_str()))
            .filter(|bucket| !bucket.is_empty())
            .or_else(|| self.default_entry().food.get(tier.as_str()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every catalog item for a city that matches the requested kind.
    pub fn candidates(&self, city: &str, kind: ResourceKind) -> Vec<CandidateItem> {
        match kind {
            ResourceKind::Attraction => self
                .attractions(city)
                .iter()
                .cloned()
                .map(CandidateItem::Attraction)
                .collect(),
            ResourceKind::Accommodation(tier) => self
                .accommodations(city, tier)
                .iter()
                .cloned()
                .map(CandidateItem::Accommodation)
                .collect(),
            ResourceKind::Food(tier) => self
                .food(city, tier)
                .iter()
                .cloned()
                .map(CandidateItem::Food)
                .collect(),
        }
    }
}
