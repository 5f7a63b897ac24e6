//! The `RecordStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `registro-store-sqlite`). The HTTP layer depends on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use crate::{
  account::{NewRole, NewUser, Role, User, UserUpdate},
  person::{NewPerson, Page, Pagination, Person, PersonFilter},
};

/// Errors produced by a [`RecordStore`].
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` when the operation clashed with a uniqueness constraint.
  fn is_conflict(&self) -> bool { false }
}

/// Abstraction over a registro storage backend.
///
/// Persons are never physically removed. Every read of persons excludes
/// soft-deleted rows unless the method says otherwise.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: StoreError;

  // ── Persons ───────────────────────────────────────────────────────────

  /// Persist a person and its detail record atomically, returning the
  /// assembled person including store-computed fields.
  fn create_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Retrieve a person by id. Soft-deleted persons are only returned when
  /// `include_deleted` is set.
  fn get_person(
    &self,
    id: i64,
    include_deleted: bool,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Filtered, id-ordered page of non-deleted persons plus the total match
  /// count before paging.
  fn list_persons<'a>(
    &'a self,
    filter: &'a PersonFilter,
    page: Pagination,
  ) -> impl Future<Output = Result<Page<Person>, Self::Error>> + Send + 'a;

  /// Soft-delete a person. Returns `None` if it does not exist or is already
  /// deleted.
  fn delete_person(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn list_users(
    &self,
    page: Pagination,
  ) -> impl Future<Output = Result<Page<User>, Self::Error>> + Send + '_;

  /// Apply a partial update. Returns `None` if the user does not exist.
  fn update_user(
    &self,
    id: i64,
    update: UserUpdate,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Roles ─────────────────────────────────────────────────────────────

  fn create_role(
    &self,
    input: NewRole,
  ) -> impl Future<Output = Result<Role, Self::Error>> + Send + '_;

  fn get_role(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Role>, Self::Error>> + Send + '_;

  fn list_roles(&self) -> impl Future<Output = Result<Vec<Role>, Self::Error>> + Send + '_;
}
