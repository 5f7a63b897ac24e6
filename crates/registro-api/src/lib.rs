//! JSON REST API for registro.
//!
//! Exposes an axum [`Router`] backed by any [`registro_core::store::RecordStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = Router::new().merge(registro_api::api_router(store.clone()));
//! ```

pub mod error;
pub mod extract;
pub mod persons;
pub mod roles;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{MethodRouter, get},
};
use registro_core::store::RecordStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// Collection routes answer both with and without a trailing slash. The
/// returned `Router<()>` can be merged or nested into any parent router.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    // Persons
    .merge(collection("/persons", get(persons::list::<S>).post(persons::create::<S>)))
    .route("/persons/{id}", get(persons::get_one::<S>).delete(persons::delete_one::<S>))
    // Users
    .merge(collection("/users", get(users::list::<S>).post(users::create::<S>)))
    .route("/users/{id}", get(users::get_one::<S>).patch(users::update_one::<S>))
    // Roles and permissions
    .merge(collection("/roles", get(roles::list::<S>).post(roles::create::<S>)))
    .route("/roles/{id}", get(roles::get_one::<S>))
    .merge(collection("/permissions", get(roles::permissions)))
    .with_state(store)
}

/// Register `route` at `path` and `path/`.
fn collection<S>(path: &str, route: MethodRouter<Arc<S>>) -> Router<Arc<S>>
where
  S: RecordStore + 'static,
{
  Router::new()
    .route(path, route.clone())
    .route(&format!("{path}/"), route)
}
