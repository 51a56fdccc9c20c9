use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use super::AppState;

#[derive(Deserialize)]
pub struct QueryParams {
    country: Option<String>,
}

/*
    GET /api/destinations
*/
pub async fn get_all(state: web::Data<AppState>, params: web::Query<QueryParams>) -> impl Responder {
    match params.country.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(country) => HttpResponse::Ok().json(state.destinations.by_country(country)),
        None => HttpResponse::Ok().json(state.destinations.all()),
    }
}
