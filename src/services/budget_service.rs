use crate::models::itinerary::BudgetAllocation;
use crate::models::trip::{AccommodationTier, FoodTier};

// Shares are in basis points so rounding is exact and repeatable
const BASIS_POINTS: i64 = 10_000;
const ACTIVITIES_SHARE: i64 = 2_500;

pub struct BudgetService;

/// Per-day slice of each category, used by the day assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyAmounts {
    pub accommodation: i64,
    pub food: i64,
    pub activities: i64,
    pub transportation: i64,
}

impl DailyAmounts {
    pub fn total(&self) -> i64 {
        self.accommodation + self.food + self.activities + self.transportation
    }
}

impl BudgetService {
    pub fn accommodation_share(tier: AccommodationTier) -> i64 {
        match tier {
            AccommodationTier::Budget => 2_500,
            AccommodationTier::MidRange => 3_500,
            AccommodationTier::Luxury => 4_500,
        }
    }

    pub fn food_share(tier: FoodTier) -> i64 {
        match tier {
            FoodTier::Budget => 1_500,
            FoodTier::Local => 2_500,
            FoodTier::Fine => 3_500,
        }
    }

    /// Split the total four ways. Transportation gets whatever is left so the
    /// shares always add back up to the total. When the fixed shares overrun
    /// the budget, transportation is floored at zero and the overrun comes out
    /// of activities, then food, then accommodation.
    pub fn allocate(
        total_budget: i64,
        accommodation_tier: AccommodationTier,
        food_tier: FoodTier,
    ) -> BudgetAllocation {
        // Widened so the fixed shares of a huge total cannot overflow
        let total = i128::from(total_budget);
        let mut accommodation = percent_of(total, Self::accommodation_share(accommodation_tier));
        let mut food = percent_of(total, Self::food_share(food_tier));
        let mut activities = percent_of(total, ACTIVITIES_SHARE);
        let mut transportation = total - accommodation - food - activities;

        if transportation < 0 {
            let mut overrun = -transportation;
            transportation = 0;
            for share in [&mut activities, &mut food, &mut accommodation] {
                let taken = overrun.min(*share);
                *share -= taken;
                overrun -= taken;
            }
        }

        // Every share now lies in 0..=total_budget
        BudgetAllocation {
            accommodation: accommodation as i64,
            food: food as i64,
            activities: activities as i64,
            transportation: transportation as i64,
        }
    }

    pub fn daily_amounts(allocation: &BudgetAllocation, days: u32) -> DailyAmounts {
        let days = i64::from(days.max(1));
        DailyAmounts {
            accommodation: divide_rounded(allocation.accommodation, days),
            food: divide_rounded(allocation.food, days),
            activities: divide_rounded(allocation.activities, days),
            transportation: divide_rounded(allocation.transportation, days),
        }
    }
}

/// round(total * bp / 10000), halves rounded up.
fn percent_of(total: i128, basis_points: i64) -> i128 {
    let basis_points = i128::from(basis_points);
    let scale = i128::from(BASIS_POINTS);
    (total * basis_points * 2 + scale).div_euclid(scale * 2)
}

fn divide_rounded(amount: i64, days: i64) -> i64 {
    let days = i128::from(days);
    // Never larger than amount, so it fits back into i64
    ((i128::from(amount) * 2 + days).div_euclid(days * 2)) as i64
}
