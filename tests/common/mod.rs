#![allow(dead_code)]

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use travelbuddy_api::db::itinerary_store::MemoryItineraryStore;
use travelbuddy_api::routes::{self, AppState};
use travelbuddy_api::services::catalog_service::StaticCatalog;
use travelbuddy_api::services::destination_service::DestinationService;
use travelbuddy_api::services::itinerary_generation_service::ItineraryGenerator;
use travelbuddy_api::services::resolver_service::FallbackResolver;

pub struct TestApp {
    pub state: web::Data<AppState>,
}

impl TestApp {
    /// Built-in catalog, no providers, in-memory store.
    pub fn new() -> Self {
        let catalog = StaticCatalog::builtin().expect("built-in catalog should parse");
        Self::with_resolver(FallbackResolver::catalog_only(Arc::new(catalog)))
    }

    pub fn with_resolver(resolver: FallbackResolver) -> Self {
        Self::with_generation_timeout(resolver, Duration::from_secs(10))
    }

    pub fn with_generation_timeout(resolver: FallbackResolver, generation_timeout: Duration) -> Self {
        let state = AppState {
            generator: ItineraryGenerator::new(Arc::new(resolver)),
            store: Arc::new(MemoryItineraryStore::new()),
            destinations: DestinationService::builtin().expect("destinations should parse"),
            generation_timeout,
        };
        Self {
            state: web::Data::new(state),
        }
    }

    pub fn create_app(&self) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.state.clone())
            .app_data(routes::json_config())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::configure)
    }
}

pub fn trip_request(destination: &str, days: i64, total_budget: i64) -> Value {
    json!({
        "destination": destination,
        "days": days,
        "totalBudget": total_budget,
        "preferences": {
            "accommodation": "mid-range",
            "food": "local",
            "activities": ["sightseeing", "cultural"]
        }
    })
}
