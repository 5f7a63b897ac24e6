//! Error types for `registro-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// An input field failed a boundary constraint (length, format, range).
  #[error("invalid {field}: {message}")]
  Validation {
    field:   &'static str,
    message: String,
  },

  #[error("unknown person type: {0:?}")]
  InvalidPersonType(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
    Self::Validation { field, message: message.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
