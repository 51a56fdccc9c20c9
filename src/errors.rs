use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::models::candidate::ResourceCategory;

/// First violated field of a generation request.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failure inside a provider adapter. Never leaves the fallback resolver.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Location not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog has no \"default\" entry")]
    MissingDefault,

    #[error("Catalog \"default\" entry has an empty {0} bucket")]
    EmptyDefaultBucket(String),

    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("No {category} candidates available for {city}")]
    EmptyCandidates {
        category: ResourceCategory,
        city: String,
    },

    #[error("Itinerary generation timed out")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Itinerary {0} not found")]
    NotFound(i64),

    #[error("Could not allocate a new itinerary id")]
    IdAllocation,
}

/// Errors surfaced over HTTP.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to generate itinerary: {0}")]
    Generation(#[from] GenerationError),

    #[error("Failed to save itinerary: {0}")]
    Save(StoreError),

    #[error("Failed to fetch itineraries: {0}")]
    Fetch(StoreError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Generation(GenerationError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Save(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Fetch(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Fetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validation(err) => ErrorBody {
                message: err.message.clone(),
                field: Some(err.field.clone()),
            },
            ApiError::Fetch(StoreError::NotFound(_)) => ErrorBody {
                message: "Itinerary not found".to_string(),
                field: None,
            },
            ApiError::Save(err) => {
                log::error!("Failed to save itinerary: {}", err);
                ErrorBody {
                    message: "Failed to save itinerary".to_string(),
                    field: None,
                }
            }
            ApiError::Fetch(err) => {
                log::error!("Failed to fetch itineraries: {}", err);
                ErrorBody {
                    message: "Failed to fetch itineraries".to_string(),
                    field: None,
                }
            }
            other => ErrorBody {
                message: other.to_string(),
                field: None,
            },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
