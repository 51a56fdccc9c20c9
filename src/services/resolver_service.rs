//! Fallback resolver
//!
//! Walks a category's provider chain in priority order and stops at the first
//! adapter that returns something usable. Adapter errors and timeouts are
//! logged and treated as "nothing here". When the whole chain comes up empty
//! the static catalog answers instead.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::models::candidate::{Accommodation, Attraction, CandidateItem, FoodPlace};
use crate::services::catalog_service::StaticCatalog;
use crate::services::providers::{ProviderChains, ProviderQuery};

/// Where a candidate pool came from. Reported in logs and used by tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolSource {
    Provider(&'static str),
    Catalog,
}

pub struct FallbackResolver {
    chains: ProviderChains,
    catalog: Arc<StaticCatalog>,
    provider_timeout: Duration,
}

impl FallbackResolver {
    pub fn new(chains: ProviderChains, catalog: Arc<StaticCatalog>, provider_timeout: Duration) -> Self {
        Self {
            chains,
            catalog,
            provider_timeout,
        }
    }

    /// Resolver with no providers at all; every lookup is served by the catalog.
    pub fn catalog_only(catalog: Arc<StaticCatalog>) -> Self {
        Self::new(ProviderChains::empty(), catalog, Duration::from_secs(1))
    }

    pub fn chains(&self) -> &ProviderChains {
        &self.chains
    }

    pub fn catalog(&self) -> &StaticCatalog {
        &self.catalog
    }

    /// First non-empty pool for the query, with its source.
    pub async fn candidate_pool(&self, query: &ProviderQuery) -> (Vec<CandidateItem>, PoolSource) {
        let category = query.kind.category();

        for adapter in self.chains.chain(category) {
            match tokio::time::timeout(self.provider_timeout, adapter.query(query)).await {
                Ok(Ok(items)) => {
                    let items: Vec<CandidateItem> = items
                        .into_iter()
                        .filter(|item| item.category() == category)
                        .collect();
                    if !items.is_empty() {
                        log::debug!(
                            "{} {} candidates for {} from {}",
                            items.len(),
                            category,
                            query.city,
                            adapter.name()
                        );
                        return (items, PoolSource::Provider(adapter.name()));
                    }
                    log::debug!("{} returned no {} for {}", adapter.name(), category, query.city);
                }
                Ok(Err(e)) => {
                    log::warn!(
                        "Provider {} failed for {} in {}: {}",
                        adapter.name(),
                        category,
                        query.city,
                        e
                    );
                }
                Err(_) => {
                    log::warn!(
                        "Provider {} timed out after {:?} for {} in {}",
                        adapter.name(),
                        self.provider_timeout,
                        category,
                        query.city
                    );
                }
            }
        }

        log::debug!("Using static catalog for {} in {}", category, query.city);
        (self.catalog.candidates(&query.city, query.kind), PoolSource::Catalog)
    }

    /// Pick from the first usable pool: one item at random, or up to
    /// `desired_count` distinct-by-name items without replacement.
    pub async fn resolve<R: Rng + ?Sized>(
        &self,
        query: &ProviderQuery,
        rng: &mut R,
    ) -> Vec<CandidateItem> {
        let (pool, _) = self.candidate_pool(query).await;
        select(pool, query.desired_count, rng)
    }

    pub async fn resolve_attractions<R: Rng + ?Sized>(
        &self,
        query: &ProviderQuery,
        rng: &mut R,
    ) -> Vec<Attraction> {
        self.resolve(query, rng)
            .await
            .into_iter()
            .filter_map(CandidateItem::into_attraction)
            .collect()
    }

    pub async fn resolve_accommodation<R: Rng + ?Sized>(
        &self,
        query: &ProviderQuery,
        rng: &mut R,
    ) -> Option<Accommodation> {
        self.resolve(query, rng)
            .await
            .into_iter()
            .find_map(CandidateItem::into_accommodation)
    }

    pub async fn resolve_food<R: Rng + ?Sized>(
        &self,
        query: &ProviderQuery,
        rng: &mut R,
    ) -> Option<FoodPlace> {
        self.resolve(query, rng)
            .await
            .into_iter()
            .find_map(CandidateItem::into_food)
    }
}

pub fn select<R: Rng + ?Sized>(
    mut pool: Vec<CandidateItem>,
    desired_count: usize,
    rng: &mut R,
) -> Vec<CandidateItem> {
    if pool.is_empty() || desired_count == 0 {
        return Vec::new();
    }
    if desired_count == 1 {
        let index = rng.gen_range(0..pool.len());
        return vec![pool.swap_remove(index)];
    }

    pool.shuffle(rng);
    let mut seen = HashSet::new();
    pool.into_iter()
        .filter(|item| seen.insert(item.name().to_string()))
        .take(desired_count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProviderError;
    use crate::models::candidate::{ResourceCategory, ResourceKind};
    use crate::models::trip::{AccommodationTier, FoodTier};
    use crate::services::providers::ProviderAdapter;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    enum Behaviour {
        Fail,
        Empty,
        Hang,
        Attractions(Vec<&'static str>),
        WrongCategory,
    }

    struct MockAdapter {
        name: &'static str,
        behaviour: Behaviour,
    }

    fn attraction(name: &str) -> CandidateItem {
        CandidateItem::Attraction(Attraction {
            name: name.to_string(),
            description: "Test".to_string(),
            cost: 5.0,
            duration: "1 hour".to_string(),
            image_url: None,
            map_url: None,
            tags: vec![],
        })
    }

    #[async_trait]
    impl ProviderAdapter for MockAdapter {
        fn name(&self) -> &'static str {
            self.name
        }

        fn supports(&self, _category: ResourceCategory) -> bool {
            true
        }

        async fn query(&self, _query: &ProviderQuery) -> Result<Vec<CandidateItem>, ProviderError> {
            match &self.behaviour {
                Behaviour::Fail => Err(ProviderError::Decode("boom".to_string())),
                Behaviour::Empty => Ok(Vec::new()),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(vec![attraction("Too Late")])
                }
                Behaviour::Attractions(names) => Ok(names.iter().map(|n| attraction(n)).collect()),
                Behaviour::WrongCategory => Ok(vec![CandidateItem::Food(FoodPlace {
                    name: "Snack Bar".to_string(),
                    description: "Not an attraction".to_string(),
                    cost: 3.0,
                    rating: None,
                    review_count: None,
                    image_url: None,
                    map_url: None,
                })]),
            }
        }
    }

    fn mock(name: &'static str, behaviour: Behaviour) -> Arc<dyn ProviderAdapter> {
        Arc::new(MockAdapter { name, behaviour })
    }

    fn resolver(chain: Vec<Arc<dyn ProviderAdapter>>) -> FallbackResolver {
        let mut chains = ProviderChains::empty();
        for adapter in chain {
            chains.push(ResourceCategory::Attraction, adapter.clone());
            chains.push(ResourceCategory::Accommodation, adapter.clone());
            chains.push(ResourceCategory::Food, adapter);
        }
        let catalog = Arc::new(StaticCatalog::builtin().unwrap());
        FallbackResolver::new(chains, catalog, Duration::from_millis(50))
    }

    fn query(city: &str, kind: ResourceKind, desired_count: usize) -> ProviderQuery {
        ProviderQuery {
            city: city.to_string(),
            country: None,
            kind,
            interests: vec![],
            desired_count,
        }
    }

    #[test]
    fn test_first_non_empty_provider_wins() {
        let resolver = resolver(vec![
            mock("broken", Behaviour::Fail),
            mock("empty", Behaviour::Empty),
            mock("good", Behaviour::Attractions(vec!["Alpha", "Beta"])),
            mock("never", Behaviour::Attractions(vec!["Gamma"])),
        ]);
        let (pool, source) = tokio_test::block_on(
            resolver.candidate_pool(&query("Paris", ResourceKind::Attraction, 2)),
        );
        assert_eq!(source, PoolSource::Provider("good"));
        let names: Vec<&str> = pool.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_total_failure_uses_catalog() {
        let resolver = resolver(vec![
            mock("broken", Behaviour::Fail),
            mock("slow", Behaviour::Hang),
        ]);
        let mut rng = StdRng::seed_from_u64(7);
        let food = tokio_test::block_on(resolver.resolve_food(
            &query("Nowhereville", ResourceKind::Food(FoodTier::Fine), 1),
            &mut rng,
        ));
        let food = food.unwrap();
        let default_fine: Vec<&str> = resolver
            .catalog()
            .food("default", FoodTier::Fine)
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert!(default_fine.contains(&food.name.as_str()));
    }

    #[test]
    fn test_timeout_advances_to_next_provider() {
        let resolver = resolver(vec![
            mock("slow", Behaviour::Hang),
            mock("fast", Behaviour::Attractions(vec!["Quick Stop"])),
        ]);
        let (pool, source) = tokio_test::block_on(
            resolver.candidate_pool(&query("Tokyo", ResourceKind::Attraction, 1)),
        );
        assert_eq!(source, PoolSource::Provider("fast"));
        assert_eq!(pool[0].name(), "Quick Stop");
    }

    #[test]
    fn test_items_of_wrong_category_are_ignored() {
        let resolver = resolver(vec![mock("confused", Behaviour::WrongCategory)]);
        let (pool, source) = tokio_test::block_on(
            resolver.candidate_pool(&query("Paris", ResourceKind::Attraction, 1)),
        );
        assert_eq!(source, PoolSource::Catalog);
        assert!(pool.iter().all(|c| c.category() == ResourceCategory::Attraction));
    }

    #[test]
    fn test_catalog_only_resolver() {
        let catalog = Arc::new(StaticCatalog::builtin().unwrap());
        let resolver = FallbackResolver::catalog_only(catalog);
        let mut rng = StdRng::seed_from_u64(1);
        let stay = tokio_test::block_on(resolver.resolve_accommodation(
            &query("paris", ResourceKind::Accommodation(AccommodationTier::Luxury), 1),
            &mut rng,
        ));
        assert!(stay.is_some());
    }

    #[test]
    fn test_select_many_is_distinct_by_name() {
        let pool = vec![
            attraction("Alpha"),
            attraction("Alpha"),
            attraction("Beta"),
            attraction("Gamma"),
        ];
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = select(pool.clone(), 3, &mut rng);
            let mut names: Vec<&str> = picked.iter().map(|c| c.name()).collect();
            names.sort_unstable();
            assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);
        }
    }

    #[test]
    fn test_select_is_repeatable_with_same_seed() {
        let pool = vec![attraction("Alpha"), attraction("Beta"), attraction("Gamma")];
        let first = select(pool.clone(), 1, &mut StdRng::seed_from_u64(42));
        let second = select(pool, 1, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn test_select_from_empty_pool() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(select(Vec::new(), 2, &mut rng).is_empty());
    }
}
