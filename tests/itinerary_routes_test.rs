mod common;

use actix_web::{http::StatusCode, test};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use common::{trip_request, TestApp};
use travelbuddy_api::errors::ProviderError;
use travelbuddy_api::models::candidate::{CandidateItem, ResourceCategory};
use travelbuddy_api::services::catalog_service::StaticCatalog;
use travelbuddy_api::services::providers::{ProviderAdapter, ProviderChains, ProviderQuery};
use travelbuddy_api::services::resolver_service::FallbackResolver;

/// Never answers within any sensible request deadline.
struct StalledProvider;

#[async_trait]
impl ProviderAdapter for StalledProvider {
    fn name(&self) -> &'static str {
        "stalled"
    }

    fn supports(&self, _category: ResourceCategory) -> bool {
        true
    }

    async fn query(&self, _query: &ProviderQuery) -> Result<Vec<CandidateItem>, ProviderError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }
}

#[actix_rt::test]
async fn test_generate_itinerary_for_paris() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/generate-itinerary")
        .set_json(trip_request("Paris, France", 3, 1500))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["destination"], "Paris, France");
    assert_eq!(body["country"], "France");
    assert_eq!(
        body["budgetAllocation"],
        json!({
            "accommodation": 525,
            "food": 375,
            "activities": 375,
            "transportation": 225
        })
    );

    let days = body["itineraryDays"].as_array().unwrap();
    assert_eq!(days.len(), 3);
    for (i, day) in days.iter().enumerate() {
        assert_eq!(day["day"], i + 1);
        assert_eq!(day["activities"].as_array().unwrap().len(), 2);
        assert_eq!(day["meals"].as_array().unwrap().len(), 3);
        assert_eq!(day["transportation"]["cost"], 75);
        assert_eq!(day["dailyCost"], 500);
        assert_ne!(day["activities"][0]["name"], day["activities"][1]["name"]);
    }
}

#[actix_rt::test]
async fn test_generate_itinerary_dates_override_days() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let mut request = trip_request("Tokyo, Japan", 10, 2000);
    request["startDate"] = json!("2025-04-01");
    request["endDate"] = json!("2025-04-04");

    let req = test::TestRequest::post()
        .uri("/api/generate-itinerary")
        .set_json(request)
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["days"], 4);
    assert_eq!(body["itineraryDays"][0]["date"], "2025-04-01");
    assert_eq!(body["itineraryDays"][3]["date"], "2025-04-04");
}

#[actix_rt::test]
async fn test_generate_itinerary_unknown_city_uses_default_catalog() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/generate-itinerary")
        .set_json(trip_request("Nowhereville", 5, 1000))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let days = body["itineraryDays"].as_array().unwrap();
    let indices: Vec<u64> = days.iter().map(|d| d["day"].as_u64().unwrap()).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5]);
}

#[actix_rt::test]
async fn test_generate_itinerary_rejects_small_budget() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/generate-itinerary")
        .set_json(trip_request("Paris, France", 3, 150))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["field"], "totalBudget");
}

#[actix_rt::test]
async fn test_generate_itinerary_rejects_long_trip() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/generate-itinerary")
        .set_json(trip_request("Paris, France", 31, 5000))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["field"], "days");
}

#[actix_rt::test]
async fn test_generate_itinerary_rejects_unknown_tier() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let mut request = trip_request("Paris, France", 3, 1500);
    request["preferences"]["accommodation"] = json!("palace");

    let req = test::TestRequest::post()
        .uri("/api/generate-itinerary")
        .set_json(request)
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["field"], "body");
}

#[actix_rt::test]
async fn test_save_list_and_get_itinerary() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/generate-itinerary")
        .set_json(trip_request("Paris, France", 2, 800))
        .to_request();
    let generated: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/save-itinerary")
        .set_json(json!({ "itineraryData": generated, "userId": 7 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let saved: Value = test::read_body_json(resp).await;
    assert_eq!(saved["id"], 1);
    assert_eq!(saved["userId"], 7);
    assert_eq!(saved["destination"], "Paris, France");
    assert_eq!(saved["totalBudget"], 800);
    assert_eq!(saved["itineraryData"], generated);

    let req = test::TestRequest::get()
        .uri("/api/itineraries?userId=7")
        .to_request();
    let mine: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/itineraries?userId=8")
        .to_request();
    let theirs: Value = test::call_and_read_body_json(&app, req).await;
    assert!(theirs.as_array().unwrap().is_empty());

    let req = test::TestRequest::get().uri("/api/itineraries/1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = test::read_body_json(resp).await;
    assert_eq!(fetched["id"], 1);
}

#[actix_rt::test]
async fn test_save_itinerary_requires_data() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/save-itinerary")
        .set_json(json!({ "userId": 3 }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["field"], "itineraryData");
}

#[actix_rt::test]
async fn test_get_itinerary_not_found() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/itineraries/42").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Itinerary not found");
}

#[actix_rt::test]
async fn test_get_itinerary_by_invalid_id() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/itineraries/not-a-number")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_generate_itinerary_times_out_without_partial_result() {
    let catalog = Arc::new(StaticCatalog::builtin().unwrap());
    let chains = ProviderChains::empty()
        .with(ResourceCategory::Attraction, Arc::new(StalledProvider))
        .with(ResourceCategory::Accommodation, Arc::new(StalledProvider));
    // Per-provider limit is far longer than the whole-request limit
    let resolver = FallbackResolver::new(chains, catalog, Duration::from_secs(30));
    let test_app = TestApp::with_generation_timeout(resolver, Duration::from_millis(50));
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/generate-itinerary")
        .set_json(trip_request("Paris, France", 3, 1500))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["itineraryDays"].is_null());
    assert!(body["budgetAllocation"].is_null());
    assert!(body["message"].as_str().unwrap().contains("timed out"));
}

#[actix_rt::test]
async fn test_generate_itinerary_with_very_large_budget() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/generate-itinerary")
        .set_json(trip_request("Paris, France", 2, 4_000_000_000_000_000))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let allocation = &body["budgetAllocation"];
    let sum: i64 = ["accommodation", "food", "activities", "transportation"]
        .iter()
        .map(|k| allocation[*k].as_i64().unwrap())
        .sum();
    assert_eq!(sum, 4_000_000_000_000_000);
    assert_eq!(body["itineraryDays"].as_array().unwrap().len(), 2);
}
