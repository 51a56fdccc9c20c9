use rand::Rng;

use crate::errors::GenerationError;
use crate::models::candidate::{Attraction, ResourceCategory, ResourceKind};
use crate::models::itinerary::{DayPlan, Meal, MealSlot, Transportation};
use crate::models::trip::TripPlan;
use crate::services::budget_service::DailyAmounts;
use crate::services::providers::ProviderQuery;
use crate::services::resolver_service::FallbackResolver;

pub const ACTIVITIES_PER_DAY: usize = 2;
// Extra single-item lookups before giving up on a second distinct activity
const MAX_ACTIVITY_RETRIES: usize = 4;

const TRANSIT_TYPE: &str = "Local Transit";
const TRANSIT_DESCRIPTION: &str = "Daily public transportation";

/// Builds one day of a trip from resolved candidates and the per-day budget.
pub struct DayAssembler<'a> {
    resolver: &'a FallbackResolver,
}

impl<'a> DayAssembler<'a> {
    pub fn new(resolver: &'a FallbackResolver) -> Self {
        Self { resolver }
    }

    pub async fn assemble_day<R: Rng + ?Sized>(
        &self,
        day_index: u32,
        plan: &TripPlan,
        daily: &DailyAmounts,
        rng: &mut R,
    ) -> Result<DayPlan, GenerationError> {
        let activities = self.pick_activities(plan, rng).await?;

        let accommodation_query = query_for(
            plan,
            ResourceKind::Accommodation(plan.preferences.accommodation),
            1,
        );
        let accommodation = self
            .resolver
            .resolve_accommodation(&accommodation_query, rng)
            .await
            .ok_or_else(|| empty(ResourceCategory::Accommodation, plan))?;

        let food_query = query_for(plan, ResourceKind::Food(plan.preferences.food), 1);
        let mut meals = Vec::with_capacity(MealSlot::ALL.len());
        for slot in MealSlot::ALL {
            let place = self
                .resolver
                .resolve_food(&food_query, rng)
                .await
                .ok_or_else(|| empty(ResourceCategory::Food, plan))?;
            meals.push(Meal { slot, place });
        }

        let title = format!("Day {}: {}", day_index, activities[0].name);
        let summary = format!(
            "Explore {} with a visit to {} and {}. Stay at {} and enjoy local cuisine.",
            plan.destination, activities[0].name, activities[1].name, accommodation.name
        );

        Ok(DayPlan {
            day_index,
            date: plan.date_for_day(day_index),
            title,
            accommodation,
            meals,
            activities,
            transportation: Transportation {
                kind: TRANSIT_TYPE.to_string(),
                description: TRANSIT_DESCRIPTION.to_string(),
                cost: daily.transportation,
            },
            daily_cost: daily.total(),
            summary,
        })
    }

    /// Two activities, distinct by name when the pool allows it. After the
    /// retry cap a duplicate is accepted rather than looping.
    async fn pick_activities<R: Rng + ?Sized>(
        &self,
        plan: &TripPlan,
        rng: &mut R,
    ) -> Result<Vec<Attraction>, GenerationError> {
        let query = query_for(plan, ResourceKind::Attraction, ACTIVITIES_PER_DAY);
        let mut activities = self.resolver.resolve_attractions(&query, rng).await;

        let single = query_for(plan, ResourceKind::Attraction, 1);
        let mut retries = 0;
        while activities.len() < ACTIVITIES_PER_DAY && retries < MAX_ACTIVITY_RETRIES {
            retries += 1;
            for candidate in self.resolver.resolve_attractions(&single, rng).await {
                if !activities.iter().any(|a| a.name == candidate.name) {
                    activities.push(candidate);
                }
            }
        }

        let first = activities
            .first()
            .cloned()
            .ok_or_else(|| empty(ResourceCategory::Attraction, plan))?;
        while activities.len() < ACTIVITIES_PER_DAY {
            log::debug!(
                "Only one distinct attraction for {}, repeating {}",
                plan.city,
                first.name
            );
            activities.push(first.clone());
        }
        activities.truncate(ACTIVITIES_PER_DAY);
        Ok(activities)
    }
}

pub fn query_for(plan: &TripPlan, kind: ResourceKind, desired_count: usize) -> ProviderQuery {
    ProviderQuery {
        city: plan.city.clone(),
        country: plan.country.clone(),
        kind,
        interests: plan.preferences.activities.clone(),
        desired_count,
    }
}

fn empty(category: ResourceCategory, plan: &TripPlan) -> GenerationError {
    GenerationError::EmptyCandidates {
        category,
        city: plan.city.clone(),
    }
}
