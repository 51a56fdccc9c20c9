use actix_web::{web, HttpResponse};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use super::AppState;
use crate::errors::{ApiError, GenerationError, ValidationError};
use crate::models::itinerary::{NewItinerary, SaveItineraryRequest};
use crate::models::trip::TripRequest;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    user_id: Option<i64>,
}

/*
    POST /api/generate-itinerary
*/
pub async fn generate(
    state: web::Data<AppState>,
    body: web::Json<TripRequest>,
) -> Result<HttpResponse, ApiError> {
    let plan = body.into_inner().validate()?;
    let mut rng = StdRng::from_entropy();

    let itinerary = tokio::time::timeout(
        state.generation_timeout,
        state.generator.generate_itinerary(&plan, &mut rng),
    )
    .await
    .map_err(|_| {
        log::error!(
            "Itinerary generation for {} exceeded {:?}",
            plan.destination,
            state.generation_timeout
        );
        GenerationError::Timeout
    })??;

    Ok(HttpResponse::Ok().json(itinerary))
}

/*
    POST /api/save-itinerary
*/
pub async fn save(
    state: web::Data<AppState>,
    body: web::Json<SaveItineraryRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    let itinerary = request.itinerary_data.ok_or_else(|| {
        ValidationError::new("itineraryData", "Itinerary data is required")
    })?;

    let record = state
        .store
        .create(NewItinerary {
            user_id: request.user_id,
            itinerary,
        })
        .await
        .map_err(ApiError::Save)?;

    Ok(HttpResponse::Created().json(record))
}

/*
    GET /api/itineraries?userId=
*/
pub async fn get_all(
    state: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, ApiError> {
    let records = state
        .store
        .list(params.user_id)
        .await
        .map_err(ApiError::Fetch)?;
    Ok(HttpResponse::Ok().json(records))
}

/*
    GET /api/itineraries/{id}
*/
pub async fn get_by_id(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id: i64 = path
        .into_inner()
        .parse()
        .map_err(|_| ValidationError::new("id", "Invalid itinerary id"))?;

    let record = state.store.get(id).await.map_err(ApiError::Fetch)?;
    Ok(HttpResponse::Ok().json(record))
}
