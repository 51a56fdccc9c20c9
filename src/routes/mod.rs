pub mod destination;
pub mod health;
pub mod itinerary;

use actix_web::web;
use std::sync::Arc;
use std::time::Duration;

use crate::db::itinerary_store::ItineraryStore;
use crate::errors::{ApiError, ValidationError};
use crate::services::destination_service::DestinationService;
use crate::services::itinerary_generation_service::ItineraryGenerator;

// Saved itineraries carry every day's payload, so allow more than the default
const JSON_LIMIT_BYTES: usize = 4 * 1024 * 1024;

/// Shared by every worker. Nothing in here is mutated per request except the
/// store, which handles its own locking.
pub struct AppState {
    pub generator: ItineraryGenerator,
    pub store: Arc<dyn ItineraryStore>,
    pub destinations: DestinationService,
    pub generation_timeout: Duration,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .route(
                    "/generate-itinerary",
                    web::post().to(itinerary::generate),
                )
                .route("/save-itinerary", web::post().to(itinerary::save))
                .route("/itineraries", web::get().to(itinerary::get_all))
                .route("/itineraries/{id}", web::get().to(itinerary::get_by_id))
                .route("/destinations", web::get().to(destination::get_all)),
        );
}

/// Malformed bodies (bad JSON, unknown tier names) are reported like any
/// other validation failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err, _req| {
            log::warn!("Rejected request body: {}", err);
            ApiError::Validation(ValidationError::new("body", err.to_string())).into()
        })
}
