//! Provider adapters
//!
//! Each adapter wraps one external places/lodging/food source and maps its
//! native response into [`CandidateItem`]s. Adapters report failures as
//! errors; the fallback resolver decides what to do with them.

pub mod geoapify;
pub mod opentripmap;
pub mod osm;
pub mod triposo;
pub mod yelp;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ProviderCredentials;
use crate::errors::ProviderError;
use crate::models::candidate::{CandidateItem, ResourceCategory, ResourceKind};
use crate::models::trip::ActivityInterest;

use geoapify::GeoapifyProvider;
use opentripmap::OpenTripMapProvider;
use osm::OsmProvider;
use triposo::TriposoProvider;
use yelp::YelpProvider;

/// Minimum number of candidates requested from a provider per call, so the
/// resolver has something to pick from.
pub const DEFAULT_POOL_SIZE: usize = 10;

const USER_AGENT: &str = concat!("travelbuddy-api/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ProviderQuery {
    pub city: String,
    pub country: Option<String>,
    pub kind: ResourceKind,
    pub interests: Vec<ActivityInterest>,
    pub desired_count: usize,
}

impl ProviderQuery {
    /// "City, Country" or just "City".
    pub fn location_label(&self) -> String {
        match &self.country {
            Some(country) => format!("{}, {}", self.city, country),
            None => self.city.clone(),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.desired_count.max(DEFAULT_POOL_SIZE)
    }

    pub fn is_india(&self) -> bool {
        self.country
            .as_deref()
            .map_or(false, |c| c.trim().eq_ignore_ascii_case("india"))
    }
}

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    fn supports(&self, category: ResourceCategory) -> bool;

    /// An empty list means the provider had nothing for this query.
    async fn query(&self, query: &ProviderQuery) -> Result<Vec<CandidateItem>, ProviderError>;
}

pub type SharedAdapter = Arc<dyn ProviderAdapter>;

/// Priority-ordered adapters for each resource category.
#[derive(Clone, Default)]
pub struct ProviderChains {
    attraction: Vec<SharedAdapter>,
    accommodation: Vec<SharedAdapter>,
    food: Vec<SharedAdapter>,
}

impl ProviderChains {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the deployment chains from whatever credentials are configured:
    ///
    /// - attraction: OpenTripMap, Triposo, OSM
    /// - accommodation: Triposo, Geoapify, Yelp, OSM
    /// - food: Triposo, Geoapify, Yelp, OSM
    pub fn from_credentials(credentials: &ProviderCredentials, timeout: Duration) -> Self {
        let opentripmap = credentials.opentripmap_api_key.as_ref().and_then(|key| {
            adapter_or_log("opentripmap", OpenTripMapProvider::new(key.clone(), timeout))
        });
        let triposo = match (&credentials.triposo_account, &credentials.triposo_api_token) {
            (Some(account), Some(token)) => adapter_or_log(
                "triposo",
                TriposoProvider::new(account.clone(), token.clone(), timeout),
            ),
            _ => None,
        };
        let geoapify = credentials.geoapify_api_key.as_ref().and_then(|key| {
            adapter_or_log("geoapify", GeoapifyProvider::new(key.clone(), timeout))
        });
        let yelp = credentials
            .yelp_api_key
            .as_ref()
            .and_then(|key| adapter_or_log("yelp", YelpProvider::new(key.clone(), timeout)));
        let osm = if credentials.osm_enabled {
            adapter_or_log("osm", OsmProvider::new(timeout))
        } else {
            None
        };

        let attraction_order = [&opentripmap, &triposo, &osm];
        let lodging_order = [&triposo, &geoapify, &yelp, &osm];

        let mut chains = Self::empty();
        for adapter in attraction_order.into_iter().flatten() {
            chains.push(ResourceCategory::Attraction, adapter.clone());
        }
        for adapter in lodging_order.iter().copied().flatten() {
            chains.push(ResourceCategory::Accommodation, adapter.clone());
        }
        for adapter in lodging_order.into_iter().flatten() {
            chains.push(ResourceCategory::Food, adapter.clone());
        }

        for category in [
            ResourceCategory::Attraction,
            ResourceCategory::Accommodation,
            ResourceCategory::Food,
        ] {
            log::info!(
                "{} provider chain: {:?}",
                category,
                chains.names(category)
            );
        }
        chains
    }

    /// Append an adapter to the end of a category's chain. Adapters that do
    /// not support the category are ignored.
    pub fn push(&mut self, category: ResourceCategory, adapter: SharedAdapter) {
        if !adapter.supports(category) {
            log::warn!(
                "Provider {} does not serve {}, skipping",
                adapter.name(),
                category
            );
            return;
        }
        match category {
            ResourceCategory::Attraction => self.attraction.push(adapter),
            ResourceCategory::Accommodation => self.accommodation.push(adapter),
            ResourceCategory::Food => self.food.push(adapter),
        }
    }

    pub fn with(mut self, category: ResourceCategory, adapter: SharedAdapter) -> Self {
        self.push(category, adapter);
        self
    }

    pub fn chain(&self, category: ResourceCategory) -> &[SharedAdapter] {
        match category {
            ResourceCategory::Attraction => &self.attraction,
            ResourceCategory::Accommodation => &self.accommodation,
            ResourceCategory::Food => &self.food,
        }
    }

    pub fn names(&self, category: ResourceCategory) -> Vec<&'static str> {
        self.chain(category).iter().map(|a| a.name()).collect()
    }
}

fn adapter_or_log<A>(name: &str, adapter: Result<A, ProviderError>) -> Option<SharedAdapter>
where
    A: ProviderAdapter + 'static,
{
    match adapter {
        Ok(adapter) => Some(Arc::new(adapter)),
        Err(e) => {
            log::warn!("Provider {} not available: {}", name, e);
            None
        }
    }
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

/// Turn a non-2xx response into a [`ProviderError::Status`].
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ProviderError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Stable pseudo-random value in `[low, low + span)` derived from a string
/// id, for providers that do not publish prices.
pub(crate) fn spread_from_id(id: &str, low: f64, span: u32) -> f64 {
    let hash = id.chars().map(|c| c as u32).fold(0u32, u32::wrapping_add);
    low + f64::from(hash % span.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str, ResourceCategory);

    #[async_trait]
    impl ProviderAdapter for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn supports(&self, category: ResourceCategory) -> bool {
            category == self.1
        }

        async fn query(&self, _query: &ProviderQuery) -> Result<Vec<CandidateItem>, ProviderError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_chain_keeps_insertion_order() {
        let chains = ProviderChains::empty()
            .with(
                ResourceCategory::Food,
                Arc::new(Named("first", ResourceCategory::Food)),
            )
            .with(
                ResourceCategory::Food,
                Arc::new(Named("second", ResourceCategory::Food)),
            );
        assert_eq!(chains.names(ResourceCategory::Food), vec!["first", "second"]);
        assert!(chains.chain(ResourceCategory::Attraction).is_empty());
    }

    #[test]
    fn test_unsupported_category_is_skipped() {
        let chains = ProviderChains::empty().with(
            ResourceCategory::Attraction,
            Arc::new(Named("food-only", ResourceCategory::Food)),
        );
        assert!(chains.chain(ResourceCategory::Attraction).is_empty());
    }

    #[test]
    fn test_chains_from_credentials() {
        let credentials = ProviderCredentials {
            opentripmap_api_key: Some("otm".to_string()),
            triposo_account: Some("acct".to_string()),
            triposo_api_token: None,
            geoapify_api_key: None,
            yelp_api_key: Some("yelp".to_string()),
            osm_enabled: true,
        };
        let chains = ProviderChains::from_credentials(&credentials, Duration::from_secs(2));
        assert_eq!(
            chains.names(ResourceCategory::Attraction),
            vec!["opentripmap", "osm"]
        );
        assert_eq!(
            chains.names(ResourceCategory::Accommodation),
            vec!["yelp", "osm"]
        );
        assert_eq!(chains.names(ResourceCategory::Food), vec!["yelp", "osm"]);
    }

    #[test]
    fn test_spread_from_id_is_stable_and_bounded() {
        let a = spread_from_id("place-123", 40.0, 30);
        let b = spread_from_id("place-123", 40.0, 30);
        assert_eq!(a, b);
        assert!((40.0..70.0).contains(&a));
    }

    #[test]
    fn test_location_label() {
        let query = ProviderQuery {
            city: "Jaipur".to_string(),
            country: Some("India".to_string()),
            kind: ResourceKind::Attraction,
            interests: vec![],
            desired_count: 2,
        };
        assert_eq!(query.location_label(), "Jaipur, India");
        assert!(query.is_india());
        assert_eq!(query.pool_size(), DEFAULT_POOL_SIZE);
    }
}
