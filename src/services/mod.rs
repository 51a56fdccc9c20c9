pub mod budget_service;
pub mod catalog_service;
pub mod day_service;
pub mod destination_service;
pub mod itinerary_generation_service;
pub mod providers;
pub mod resolver_service;
