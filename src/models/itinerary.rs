use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::candidate::{Accommodation, Attraction, FoodPlace};
use super::trip::Preferences;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct BudgetAllocation {
    pub accommodation: i64,
    pub food: i64,
    pub activities: i64,
    pub transportation: i64,
}

impl BudgetAllocation {
    pub fn total(&self) -> i64 {
        self.accommodation + self.food + self.activities + self.transportation
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Meal {
    #[serde(rename = "type")]
    pub slot: MealSlot,
    #[serde(flatten)]
    pub place: FoodPlace,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Transportation {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub cost: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    #[serde(rename = "day")]
    pub day_index: u32,
    pub date: Option<NaiveDate>,
    pub title: String,
    pub accommodation: Accommodation,
    pub meals: Vec<Meal>,
    pub activities: Vec<Attraction>,
    pub transportation: Transportation,
    pub daily_cost: i64,
    pub summary: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedItinerary {
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub days: u32,
    pub total_budget: i64,
    pub budget_allocation: BudgetAllocation,
    pub preferences: Preferences,
    #[serde(rename = "dates")]
    pub date_range: DateRange,
    pub itinerary_days: Vec<DayPlan>,
}

/// Body of a save request: the generated itinerary handed back verbatim.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SaveItineraryRequest {
    pub itinerary_data: Option<GeneratedItinerary>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Fields the store needs to create a record. Scalars are echoed out of the
/// itinerary so stored records can be queried without opening the payload.
#[derive(Debug, Clone)]
pub struct NewItinerary {
    pub user_id: Option<i64>,
    pub itinerary: GeneratedItinerary,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredItinerary {
    pub id: i64,
    pub user_id: Option<i64>,
    pub destination: String,
    pub country: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_budget: i64,
    pub days: u32,
    pub preferences: Preferences,
    pub itinerary_data: GeneratedItinerary,
    pub created_at: DateTime<Utc>,
}

impl StoredItinerary {
    pub fn from_new(id: i64, new: NewItinerary, created_at: DateTime<Utc>) -> Self {
        let itinerary = new.itinerary;
        Self {
            id,
            user_id: new.user_id,
            destination: itinerary.destination.clone(),
            country: itinerary.country.clone(),
            start_date: itinerary.date_range.start,
            end_date: itinerary.date_range.end,
            total_budget: itinerary.total_budget,
            days: itinerary.days,
            preferences: itinerary.preferences.clone(),
            itinerary_data: itinerary,
            created_at,
        }
    }
}
