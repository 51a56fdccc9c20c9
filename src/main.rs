use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use travelbuddy_api::config::AppConfig;
use travelbuddy_api::db::itinerary_store::{
    ItineraryStore, MemoryItineraryStore, MongoItineraryStore,
};
use travelbuddy_api::db::mongo::create_mongo_client;
use travelbuddy_api::routes::{self, AppState};
use travelbuddy_api::services::catalog_service::StaticCatalog;
use travelbuddy_api::services::destination_service::DestinationService;
use travelbuddy_api::services::itinerary_generation_service::ItineraryGenerator;
use travelbuddy_api::services::providers::ProviderChains;
use travelbuddy_api::services::resolver_service::FallbackResolver;

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    log::error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    println!("Application starting...");

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();

    let catalog = match &config.catalog_path {
        Some(path) => {
            log::info!("Loading static catalog from {}", path);
            StaticCatalog::from_file(path)
        }
        None => StaticCatalog::builtin(),
    }
    .map_err(|e| startup_error("Static catalog is invalid", e))?;
    log::info!("Static catalog covers {:?}", catalog.city_names());

    let destinations = DestinationService::builtin()
        .map_err(|e| startup_error("Destination directory is invalid", e))?;

    let store: Arc<dyn ItineraryStore> = match &config.mongo_uri {
        Some(uri) => {
            let client = create_mongo_client(uri)
                .await
                .map_err(|e| startup_error("Failed to create MongoDB client", e))?;
            Arc::new(MongoItineraryStore::new(client, config.mongo_database.clone()))
        }
        None => {
            log::warn!("MONGODB_URI not set, saved itineraries are kept in memory only");
            Arc::new(MemoryItineraryStore::new())
        }
    };

    let chains = ProviderChains::from_credentials(&config.providers, config.provider_timeout);
    let resolver = FallbackResolver::new(chains, Arc::new(catalog), config.provider_timeout);

    let state = web::Data::new(AppState {
        generator: ItineraryGenerator::new(Arc::new(resolver)),
        store,
        destinations,
        generation_timeout: config.generation_timeout,
    });

    log::info!("Starting HTTP server on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(routes::json_config())
            .configure(routes::configure)
    })
    .bind((config.host.clone(), config.port))?
    .run()
    .await
}
