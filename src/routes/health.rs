use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;
use std::env;

use super::AppState;
use crate::models::candidate::ResourceCategory;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    store: StoreStatus,
    providers: HashMap<String, Vec<&'static str>>,
    environment: String,
    version: String,
}

#[derive(Serialize)]
struct StoreStatus {
    name: &'static str,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        store: check_store(&state).await,
        providers: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let chains = state.generator.resolver().chains();
    for category in [
        ResourceCategory::Attraction,
        ResourceCategory::Accommodation,
        ResourceCategory::Food,
    ] {
        health
            .providers
            .insert(category.to_string(), chains.names(category));
    }

    // Providers are optional, only the store can degrade the service
    if health.store.status != "ok" {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

async fn check_store(state: &AppState) -> StoreStatus {
    let name = state.store.name();
    match state.store.ping().await {
        Ok(_) => StoreStatus {
            name,
            status: "ok".to_string(),
            details: None,
        },
        Err(e) => {
            log::error!("Store health check failed: {}", e);
            StoreStatus {
                name,
                status: "error".to_string(),
                details: Some(e.to_string()),
            }
        }
    }
}
