//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use registro_core::store::StoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("invalid {field}: {message}")]
  Validation {
    field:   &'static str,
    message: String,
  },

  #[error("conflict: {0}")]
  Conflict(String),

  /// An extractor could not decode the request; keeps the extractor's status.
  #[error("rejected request: {message}")]
  Rejected {
    status:  StatusCode,
    message: String,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<registro_core::Error> for ApiError {
  fn from(e: registro_core::Error) -> Self {
    match e {
      registro_core::Error::Validation { field, message } => {
        ApiError::Validation { field, message }
      }
      registro_core::Error::InvalidPersonType(_) => {
        ApiError::BadRequest("Invalid person type".to_owned())
      }
      registro_core::Error::Serialization(e) => {
        ApiError::Validation { field: "details", message: e.to_string() }
      }
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self {
    ApiError::Rejected { status: r.status(), message: r.body_text() }
  }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self {
    ApiError::Rejected { status: r.status(), message: r.body_text() }
  }
}

impl From<PathRejection> for ApiError {
  fn from(r: PathRejection) -> Self {
    ApiError::Rejected { status: r.status(), message: r.body_text() }
  }
}

/// Map a store failure, surfacing uniqueness clashes as 409.
pub(crate) fn store_error<E: StoreError>(e: E) -> ApiError {
  if e.is_conflict() {
    ApiError::Conflict(e.to_string())
  } else {
    ApiError::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "detail": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "detail": m })),
      ApiError::Validation { field, message } => (
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "detail": message, "field": field }),
      ),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, json!({ "detail": m })),
      ApiError::Rejected { status, message } => (*status, json!({ "detail": message })),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "detail": e.to_string() }))
      }
    };
    (status, Json(body)).into_response()
  }
}
