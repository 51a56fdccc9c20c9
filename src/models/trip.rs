use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

pub const MIN_DESTINATION_CHARS: usize = 3;
pub const MIN_TRIP_DAYS: i64 = 1;
pub const MAX_TRIP_DAYS: i64 = 30;
pub const MIN_TOTAL_BUDGET: i64 = 200;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AccommodationTier {
    Budget,
    MidRange,
    Luxury,
}

impl AccommodationTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccommodationTier::Budget => "budget",
            AccommodationTier::MidRange => "mid-range",
            AccommodationTier::Luxury => "luxury",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FoodTier {
    Budget,
    Local,
    Fine,
}

impl FoodTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodTier::Budget => "budget",
            FoodTier::Local => "local",
            FoodTier::Fine => "fine",
        }
    }
}

/// Activity tags a traveller can pick, including the India-specific set.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityInterest {
    Sightseeing,
    Cultural,
    Adventure,
    Relaxation,
    Shopping,
    Nightlife,
    TempleVisits,
    HeritageSites,
    AyurvedaWellness,
    WildlifeSafari,
    Backwaters,
    StreetFoodTours,
    Handicrafts,
    YogaMeditation,
    HillStations,
    DesertExploration,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Preferences {
    pub accommodation: AccommodationTier,
    pub food: FoodTier,
    pub activities: Vec<ActivityInterest>,
}

/// Raw generation request as posted by the planner wizard.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<i64>,
    pub total_budget: i64,
    pub preferences: Preferences,
}

/// A request that passed validation. Day count and dates always agree here.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    pub destination: String,
    pub city: String,
    pub country: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub days: u32,
    pub total_budget: i64,
    pub preferences: Preferences,
}

impl TripRequest {
    /// Validate field by field, stopping at the first violation.
    pub fn validate(self) -> Result<TripPlan, ValidationError> {
        let destination = self.destination.trim().to_string();
        if destination.chars().count() < MIN_DESTINATION_CHARS {
            return Err(ValidationError::new(
                "destination",
                "Destination must be at least 3 characters",
            ));
        }

        let start_date = parse_date("startDate", self.start_date.as_deref())?;
        let end_date = parse_date("endDate", self.end_date.as_deref())?;

        let days = match (start_date, end_date) {
            (Some(start), Some(end)) => {
                if end < start {
                    return Err(ValidationError::new(
                        "endDate",
                        "End date must not be before start date",
                    ));
                }
                // Dates win over any caller supplied day count
                (end - start).num_days() + 1
            }
            _ => self
                .days
                .ok_or_else(|| ValidationError::new("days", "Trip length is required"))?,
        };
        if days < MIN_TRIP_DAYS {
            return Err(ValidationError::new("days", "Trip must be at least 1 day"));
        }
        if days > MAX_TRIP_DAYS {
            return Err(ValidationError::new("days", "Trip cannot exceed 30 days"));
        }

        if self.total_budget < MIN_TOTAL_BUDGET {
            return Err(ValidationError::new(
                "totalBudget",
                "Budget must be at least $200",
            ));
        }

        if self.preferences.activities.is_empty() {
            return Err(ValidationError::new(
                "preferences.activities",
                "Select at least one activity",
            ));
        }

        let (city, derived_country) = split_destination(&destination);
        let country = self
            .country
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .or(derived_country);

        Ok(TripPlan {
            destination,
            city,
            country,
            start_date,
            end_date,
            days: days as u32,
            total_budget: self.total_budget,
            preferences: self.preferences,
        })
    }
}

impl TripPlan {
    /// Calendar date of a 1-based day index, when the trip has a start date.
    pub fn date_for_day(&self, day_index: u32) -> Option<NaiveDate> {
        self.start_date
            .map(|start| start + Duration::days(i64::from(day_index) - 1))
    }
}

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => {
            // Accept full ISO timestamps by keeping only the date part
            let date_part = raw.split('T').next().unwrap_or(raw);
            NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| ValidationError::new(field, "Date must be in YYYY-MM-DD format"))
        }
    }
}

/// "Paris, France" -> ("Paris", Some("France")).
pub fn split_destination(destination: &str) -> (String, Option<String>) {
    let mut parts = destination.splitn(2, ',');
    let city = parts.next().unwrap_or(destination).trim().to_string();
    let country = parts
        .next()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    (city, country)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TripRequest {
        TripRequest {
            destination: "Paris, France".to_string(),
            country: None,
            start_date: None,
            end_date: None,
            days: Some(3),
            total_budget: 1500,
            preferences: Preferences {
                accommodation: AccommodationTier::MidRange,
                food: FoodTier::Local,
                activities: vec![ActivityInterest::Sightseeing, ActivityInterest::Cultural],
            },
        }
    }

    #[test]
    fn test_country_derived_from_destination() {
        let plan = request().validate().unwrap();
        assert_eq!(plan.city, "Paris");
        assert_eq!(plan.country.as_deref(), Some("France"));
        assert_eq!(plan.destination, "Paris, France");
    }

    #[test]
    fn test_explicit_country_wins() {
        let mut req = request();
        req.destination = "Goa".to_string();
        req.country = Some("India".to_string());
        let plan = req.validate().unwrap();
        assert_eq!(plan.city, "Goa");
        assert_eq!(plan.country.as_deref(), Some("India"));
    }

    #[test]
    fn test_dates_override_day_count() {
        let mut req = request();
        req.days = Some(10);
        req.start_date = Some("2025-03-01".to_string());
        req.end_date = Some("2025-03-04".to_string());
        let plan = req.validate().unwrap();
        assert_eq!(plan.days, 4);
        assert_eq!(
            plan.date_for_day(4),
            NaiveDate::from_ymd_opt(2025, 3, 4)
        );
    }

    #[test]
    fn test_date_arithmetic_crosses_month_end() {
        let mut req = request();
        req.start_date = Some("2024-02-28".to_string());
        let plan = req.validate().unwrap();
        assert_eq!(plan.date_for_day(1), NaiveDate::from_ymd_opt(2024, 2, 28));
        assert_eq!(plan.date_for_day(2), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(plan.date_for_day(3), NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_first_violated_field_reported() {
        let mut req = request();
        req.destination = "Xy".to_string();
        req.total_budget = 10;
        let err = req.validate().unwrap_err();
        assert_eq!(err.field, "destination");

        let mut req = request();
        req.days = Some(31);
        req.total_budget = 10;
        assert_eq!(req.validate().unwrap_err().field, "days");

        let mut req = request();
        req.total_budget = 199;
        assert_eq!(req.validate().unwrap_err().field, "totalBudget");

        let mut req = request();
        req.preferences.activities.clear();
        assert_eq!(req.validate().unwrap_err().field, "preferences.activities");
    }

    #[test]
    fn test_date_range_too_long() {
        let mut req = request();
        req.start_date = Some("2025-01-01".to_string());
        req.end_date = Some("2025-02-15".to_string());
        assert_eq!(req.validate().unwrap_err().field, "days");
    }

    #[test]
    fn test_missing_days_without_dates() {
        let mut req = request();
        req.days = None;
        assert_eq!(req.validate().unwrap_err().field, "days");
    }

    #[test]
    fn test_bad_date_format() {
        let mut req = request();
        req.start_date = Some("03/01/2025".to_string());
        assert_eq!(req.validate().unwrap_err().field, "startDate");
    }

    #[test]
    fn test_tiers_use_wire_names() {
        let prefs: Preferences = serde_json::from_value(serde_json::json!({
            "accommodation": "mid-range",
            "food": "fine",
            "activities": ["temple-visits", "street-food-tours"]
        }))
        .unwrap();
        assert_eq!(prefs.accommodation, AccommodationTier::MidRange);
        assert_eq!(prefs.food, FoodTier::Fine);
        assert_eq!(prefs.activities[1], ActivityInterest::StreetFoodTours);
    }
}
