//! Handlers for `/users` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/users/` | Body: [`NewUser`]; 201, 409 on duplicate username/email |
//! | `GET`   | `/users/` | Optional `skip`, `limit` |
//! | `GET`   | `/users/{id}` | 404 if not found |
//! | `PATCH` | `/users/{id}` | Body: [`UserUpdate`]; absent fields are kept, `"name": null` clears |

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use registro_core::{
  account::{NewUser, User, UserUpdate},
  person::{Page, Pagination},
  store::RecordStore,
};

use crate::{
  error::{ApiError, store_error},
  extract::{Json, Path, Query},
};

fn not_found() -> ApiError { ApiError::NotFound("User not found".to_owned()) }

/// `POST /users/`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
{
  let user = store
    .create_user(body.validated()?)
    .await
    .map_err(store_error)?;
  tracing::info!(user_id = user.id, username = %user.username, "user created");
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/[?skip=...][&limit=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(page): Query<Pagination>,
) -> Result<Json<Page<User>>, ApiError>
where
  S: RecordStore,
{
  let users = store
    .list_users(page.validated()?)
    .await
    .map_err(store_error)?;
  Ok(Json(users))
}

/// `GET /users/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<User>, ApiError>
where
  S: RecordStore,
{
  let user = store
    .get_user(id)
    .await
    .map_err(store_error)?
    .ok_or_else(not_found)?;
  Ok(Json(user))
}

/// `PATCH /users/{id}`
pub async fn update_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<UserUpdate>,
) -> Result<Json<User>, ApiError>
where
  S: RecordStore,
{
  let user = store
    .update_user(id, body.validated()?)
    .await
    .map_err(store_error)?
    .ok_or_else(not_found)?;
  tracing::info!(user_id = id, "user updated");
  Ok(Json(user))
}
