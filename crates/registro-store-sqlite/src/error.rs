//! Error type for `registro-store-sqlite`.

use registro_core::{person::PersonKind, store::StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] registro_core::Error),

  #[error("database error: {0}")]
  Database(#[source] tokio_rusqlite::Error),

  /// A UNIQUE constraint rejected the write.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown code in column {column}: {value:?}")]
  UnknownCode {
    column: &'static str,
    value:  String,
  },

  /// The base row exists but its detail row does not.
  #[error("{kind} person {id} has no detail record")]
  MissingDetails { id: i64, kind: PersonKind },
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, msg))
        if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
      {
        Error::Conflict(msg.unwrap_or_else(|| "unique constraint failed".to_owned()))
      }
      other => Error::Database(other),
    }
  }
}

impl StoreError for Error {
  fn is_conflict(&self) -> bool { matches!(self, Error::Conflict(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
