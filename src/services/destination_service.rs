use crate::errors::CatalogError;
use crate::models::destination::Destination;

const BUILTIN_DESTINATIONS: &str = include_str!("../../data/destinations.json");

/// Read-only directory of suggested destinations shown by the planner.
#[derive(Debug, Clone)]
pub struct DestinationService {
    destinations: Vec<Destination>,
}

impl DestinationService {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_DESTINATIONS)
    }

    /// Ids are assigned by position, starting at 1.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let mut destinations: Vec<Destination> = serde_json::from_str(raw)?;
        for (index, destination) in destinations.iter_mut().enumerate() {
            destination.id = index as i64 + 1;
        }
        Ok(Self { destinations })
    }

    pub fn all(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn by_name(&self, name: &str) -> Option<&Destination> {
        let name = name.trim();
        self.destinations
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    pub fn by_country(&self, country: &str) -> Vec<&Destination> {
        let country = country.trim();
        self.destinations
            .iter()
            .filter(|d| d.country.eq_ignore_ascii_case(country))
            .collect()
    }
}
