//! Handlers for `/persons` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/persons/` | Body: [`CreateBody`]; 201, 400 on unknown type |
//! | `GET`    | `/persons/` | Optional `type`, `active`, `name`, `skip`, `limit` |
//! | `GET`    | `/persons/{id}` | Optional `include_deleted`; 404 if missing |
//! | `DELETE` | `/persons/{id}` | Soft delete; 404 if missing or already deleted |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use registro_core::{
  person::{NewPerson, NewPersonDetails, Page, Pagination, Person, PersonFilter, PersonKind},
  store::RecordStore,
};
use serde::Deserialize;

use crate::{
  error::{ApiError, store_error},
  extract::{Json, Path, Query},
};

fn not_found() -> ApiError { ApiError::NotFound("Person not found".to_owned()) }

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /persons/`.
///
/// `details` stays untyped until `type` has been checked, so an unknown type
/// is reported as such rather than as a shape mismatch.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  #[serde(rename = "type")]
  pub kind:    String,
  #[serde(default)]
  pub active:  Option<bool>,
  pub details: serde_json::Value,
}

impl TryFrom<CreateBody> for NewPerson {
  type Error = ApiError;

  fn try_from(b: CreateBody) -> Result<Self, ApiError> {
    let kind: PersonKind = b
      .kind
      .trim()
      .parse()
      .map_err(|_| registro_core::Error::InvalidPersonType(b.kind.clone()))?;
    let details = NewPersonDetails::from_json(kind, b.details)?;
    Ok(NewPerson::new(b.active.unwrap_or(true), details)?)
  }
}

/// `POST /persons/`: returns 201 and the assembled [`Person`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
{
  let input = NewPerson::try_from(body)?;
  let person = store.create_person(input).await.map_err(store_error)?;
  tracing::info!(person_id = person.id, kind = %person.kind(), "person created");
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /persons/[?type=...][&active=...][&name=...][&skip=...][&limit=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(filter): Query<PersonFilter>,
  Query(page): Query<Pagination>,
) -> Result<Json<Page<Person>>, ApiError>
where
  S: RecordStore,
{
  let page = page.validated()?;
  let persons = store
    .list_persons(&filter, page)
    .await
    .map_err(store_error)?;
  tracing::debug!(total = persons.total, returned = persons.items.len(), "persons listed");
  Ok(Json(persons))
}

// ─── Get ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct GetParams {
  /// Also return a soft-deleted person.
  #[serde(default)]
  pub include_deleted: bool,
}

/// `GET /persons/{id}[?include_deleted=true]`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Query(params): Query<GetParams>,
) -> Result<Json<Person>, ApiError>
where
  S: RecordStore,
{
  let person = store
    .get_person(id, params.include_deleted)
    .await
    .map_err(store_error)?
    .ok_or_else(not_found)?;
  Ok(Json(person))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /persons/{id}`: returns the tombstoned person.
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Person>, ApiError>
where
  S: RecordStore,
{
  let person = store
    .delete_person(id)
    .await
    .map_err(store_error)?
    .ok_or_else(not_found)?;
  tracing::info!(person_id = id, "person deleted");
  Ok(Json(person))
}
