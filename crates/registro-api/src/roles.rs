//! Handlers for `/roles` and `/permissions`.
//!
//! Roles only record which permissions they carry; nothing checks them.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use registro_core::{
  account::{NewRole, Permission, Role},
  store::RecordStore,
};

use crate::{
  error::{ApiError, store_error},
  extract::{Json, Path},
};

/// `POST /roles/`, body: `{"name":"admin","permissions":["create_product"]}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewRole>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
{
  let role = store
    .create_role(body.validated()?)
    .await
    .map_err(store_error)?;
  tracing::info!(role_id = role.id, name = %role.name, "role created");
  Ok((StatusCode::CREATED, Json(role)))
}

/// `GET /roles/`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Role>>, ApiError>
where
  S: RecordStore,
{
  let roles = store.list_roles().await.map_err(store_error)?;
  Ok(Json(roles))
}

/// `GET /roles/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Role>, ApiError>
where
  S: RecordStore,
{
  let role = store
    .get_role(id)
    .await
    .map_err(store_error)?
    .ok_or_else(|| ApiError::NotFound("Role not found".to_owned()))?;
  Ok(Json(role))
}

/// `GET /permissions/`: every permission name, in declaration order.
pub async fn permissions() -> Json<Vec<Permission>> { Json(Permission::all().collect()) }
