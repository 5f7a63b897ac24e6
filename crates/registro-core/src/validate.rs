//! Boundary constraints shared by every input shape.
//!
//! All string inputs are trimmed before their length is checked, and lengths
//! are counted in characters rather than bytes.

use crate::{Error, Result};

/// Trim `value` and require its length to fall within `min..=max`.
pub fn text(
  field: &'static str,
  value: String,
  min: usize,
  max: usize,
) -> Result<String> {
  let trimmed = value.trim();
  let len = trimmed.chars().count();

  if len < min || len > max {
    let message = match (min, max) {
      (0, _) => format!("must be at most {max} characters"),
      (a, b) if a == b => format!("must be exactly {a} characters"),
      _ => format!("must be between {min} and {max} characters"),
    };
    return Err(Error::validation(field, message));
  }

  Ok(trimmed.to_owned())
}

/// Like [`text`], but for optional fields. A value that is empty after
/// trimming is treated as absent.
pub fn optional_text(
  field: &'static str,
  value: Option<String>,
  max: usize,
) -> Result<Option<String>> {
  match value {
    Some(v) if !v.trim().is_empty() => text(field, v, 1, max).map(Some),
    _ => Ok(None),
  }
}

/// Trim and loosely check an email address: one `@`, a non-empty local part
/// and a dotted domain with no whitespace.
pub fn email(field: &'static str, value: String) -> Result<String> {
  let address = text(field, value, 3, 254)?;

  let valid = match address.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !address.chars().any(char::is_whitespace)
    }
    None => false,
  };

  if !valid {
    return Err(Error::validation(field, "is not a valid email address"));
  }
  Ok(address)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn text_trims_before_measuring() {
    let v = text("name", "  John  ".into(), 1, 4).unwrap();
    assert_eq!(v, "John");
  }

  #[test]
  fn text_counts_characters_not_bytes() {
    assert!(text("name", "Ñuñez".into(), 5, 5).is_ok());
  }

  #[test]
  fn text_rejects_out_of_range() {
    let err = text("curp", "SHORT".into(), 18, 18).unwrap_err();
    match err {
      Error::Validation { field, message } => {
        assert_eq!(field, "curp");
        assert!(message.contains("exactly 18"), "{message}");
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn optional_text_blank_is_none() {
    assert_eq!(optional_text("x", Some("   ".into()), 10).unwrap(), None);
    assert_eq!(optional_text("x", None, 10).unwrap(), None);
    assert_eq!(
      optional_text("x", Some(" Smith ".into()), 10).unwrap(),
      Some("Smith".into())
    );
  }

  #[test]
  fn email_accepts_plain_addresses() {
    assert_eq!(
      email("email", " alice@example.com ".into()).unwrap(),
      "alice@example.com"
    );
  }

  #[test]
  fn email_rejects_malformed_addresses() {
    for bad in ["alice", "@example.com", "alice@example", "a@b@c.com", "a b@c.com"] {
      assert!(email("email", bad.into()).is_err(), "{bad} accepted");
    }
  }
}
