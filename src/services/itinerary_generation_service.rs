use rand::Rng;
use std::sync::Arc;

use crate::errors::GenerationError;
use crate::models::itinerary::{DateRange, GeneratedItinerary};
use crate::models::trip::TripPlan;
use crate::services::budget_service::BudgetService;
use crate::services::day_service::DayAssembler;
use crate::services::resolver_service::FallbackResolver;

/// Drives the day assembler over a whole trip.
pub struct ItineraryGenerator {
    resolver: Arc<FallbackResolver>,
}

impl ItineraryGenerator {
    pub fn new(resolver: Arc<FallbackResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &FallbackResolver {
        &self.resolver
    }

    /// Allocate once, then build days 1..=plan.days in order. Any failure
    /// discards the whole itinerary.
    pub async fn generate_itinerary<R: Rng + ?Sized>(
        &self,
        plan: &TripPlan,
        rng: &mut R,
    ) -> Result<GeneratedItinerary, GenerationError> {
        let budget_allocation = BudgetService::allocate(
            plan.total_budget,
            plan.preferences.accommodation,
            plan.preferences.food,
        );
        let daily = BudgetService::daily_amounts(&budget_allocation, plan.days);

        log::info!(
            "Generating {}-day itinerary for {} (budget {}, allocation {:?})",
            plan.days,
            plan.destination,
            plan.total_budget,
            budget_allocation
        );

        // Sequential on purpose: one rng, and output order is day order
        let assembler = DayAssembler::new(&self.resolver);
        let mut itinerary_days = Vec::with_capacity(plan.days as usize);
        for day_index in 1..=plan.days {
            let day = assembler.assemble_day(day_index, plan, &daily, rng).await?;
            itinerary_days.push(day);
        }

        Ok(GeneratedItinerary {
            destination: plan.destination.clone(),
            country: plan.country.clone(),
            days: plan.days,
            total_budget: plan.total_budget,
            budget_allocation,
            preferences: plan.preferences.clone(),
            date_range: DateRange {
                start: plan.start_date,
                end: plan.end_date,
            },
            itinerary_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::itinerary::{BudgetAllocation, MealSlot};
    use crate::models::trip::{AccommodationTier, ActivityInterest, FoodTier, Preferences, TripRequest};
    use crate::services::catalog_service::StaticCatalog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generator() -> ItineraryGenerator {
        let catalog = Arc::new(StaticCatalog::builtin().unwrap());
        ItineraryGenerator::new(Arc::new(FallbackResolver::catalog_only(catalog)))
    }

    fn request(destination: &str, days: i64) -> TripRequest {
        TripRequest {
            destination: destination.to_string(),
            country: None,
            start_date: None,
            end_date: None,
            days: Some(days),
            total_budget: 1500,
            preferences: Preferences {
                accommodation: AccommodationTier::MidRange,
                food: FoodTier::Local,
                activities: vec![ActivityInterest::Sightseeing, ActivityInterest::Cultural],
            },
        }
    }

    #[actix_rt::test]
    async fn test_paris_three_days() {
        let plan = request("Paris, France", 3).validate().unwrap();
        let mut rng = StdRng::seed_from_u64(2024);
        let itinerary = generator().generate_itinerary(&plan, &mut rng).await.unwrap();

        assert_eq!(
            itinerary.budget_allocation,
            BudgetAllocation {
                accommodation: 525,
                food: 375,
                activities: 375,
                transportation: 225,
            }
        );
        assert_eq!(itinerary.country.as_deref(), Some("France"));
        assert_eq!(itinerary.itinerary_days.len(), 3);
        for (i, day) in itinerary.itinerary_days.iter().enumerate() {
            assert_eq!(day.day_index, i as u32 + 1);
            assert_eq!(day.meals.len(), 3);
            assert_eq!(day.activities.len(), 2);
        }
    }

    #[actix_rt::test]
    async fn test_unknown_city_still_fully_generated() {
        let plan = request("Nowhereville", 5).validate().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let itinerary = generator().generate_itinerary(&plan, &mut rng).await.unwrap();

        let defaults: Vec<String> = generator()
            .resolver()
            .catalog()
            .attractions("default")
            .iter()
            .map(|a| a.name.clone())
            .collect();
        let indices: Vec<u32> = itinerary.itinerary_days.iter().map(|d| d.day_index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
        for day in &itinerary.itinerary_days {
            assert!(day.activities.iter().all(|a| defaults.contains(&a.name)));
            let slots: Vec<MealSlot> = day.meals.iter().map(|m| m.slot).collect();
            assert_eq!(slots, MealSlot::ALL.to_vec());
        }
    }

    #[actix_rt::test]
    async fn test_same_seed_same_itinerary() {
        let plan = request("Tokyo, Japan", 4).validate().unwrap();
        let first = generator()
            .generate_itinerary(&plan, &mut StdRng::seed_from_u64(99))
            .await
            .unwrap();
        let second = generator()
            .generate_itinerary(&plan, &mut StdRng::seed_from_u64(99))
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[actix_rt::test]
    async fn test_output_serializes_with_wire_names() {
        let mut req = request("Paris, France", 1);
        req.start_date = Some("2025-03-10".to_string());
        let plan = req.validate().unwrap();
        let itinerary = generator()
            .generate_itinerary(&plan, &mut StdRng::seed_from_u64(3))
            .await
            .unwrap();
        let json = serde_json::to_value(&itinerary).unwrap();
        assert_eq!(json["totalBudget"], 1500);
        assert_eq!(json["budgetAllocation"]["transportation"], 225);
        assert_eq!(json["dates"]["start"], "2025-03-10");
        assert_eq!(json["itineraryDays"][0]["day"], 1);
        assert_eq!(json["itineraryDays"][0]["date"], "2025-03-10");
        assert_eq!(json["itineraryDays"][0]["meals"][1]["type"], "lunch");
        assert_eq!(json["itineraryDays"][0]["transportation"]["type"], "Local Transit");
        assert!(json["itineraryDays"][0]["accommodation"]["costPerNight"].is_number());
    }
}
