//! Person types: the base identity record and its two subtype extensions.
//!
//! A person is either *natural* (an individual) or *juridical* (a legal
//! entity). The subtype is fixed at creation and selects which detail record
//! carries the extended attributes. Here that choice is a sum type: the
//! subtype is never stored next to the details, it *is* the details variant.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{Result, validate};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The subtype discriminator, serialised as `"natural"` / `"juridical"`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PersonKind {
  Natural,
  Juridical,
}

impl PersonKind {
  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Stored records ──────────────────────────────────────────────────────────

/// Extended record of a natural person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaturalPersonDetails {
  pub person_id:        i64,
  /// Population registry code; exactly 18 characters.
  pub curp:             String,
  /// Taxpayer registry code; 12 or 13 characters.
  pub rfc:              String,
  pub name:             String,
  pub first_last_name:  String,
  pub second_last_name: Option<String>,
  pub date_of_birth:    Option<NaiveDate>,
  pub created_at:       DateTime<Utc>,
  /// Computed by the store from the name parts; never accepted as input.
  pub full_name:        String,
}

/// Extended record of a juridical person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JuridicalPersonDetails {
  pub person_id:          i64,
  pub rfc:                String,
  pub legal_name:         String,
  pub incorporation_date: Option<NaiveDate>,
  pub created_at:         DateTime<Utc>,
}

/// The subtype-specific part of a [`Person`]. Serialises as
/// `"type": "...", "details": {...}` next to the base fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "lowercase")]
pub enum PersonDetails {
  Natural(NaturalPersonDetails),
  Juridical(JuridicalPersonDetails),
}

impl PersonDetails {
  pub fn kind(&self) -> PersonKind {
    match self {
      Self::Natural(_) => PersonKind::Natural,
      Self::Juridical(_) => PersonKind::Juridical,
    }
  }
}

/// A fully assembled person: base record plus its one detail record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:         i64,
  pub active:     bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  /// Soft-delete tombstone. Once set it is never cleared.
  pub deleted_at: Option<DateTime<Utc>>,
  #[serde(flatten)]
  pub details:    PersonDetails,
}

impl Person {
  pub fn kind(&self) -> PersonKind { self.details.kind() }

  pub fn is_deleted(&self) -> bool { self.deleted_at.is_some() }
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Caller-supplied fields of a natural person. Any `full_name` key in the
/// incoming JSON is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewNaturalPerson {
  pub curp:             String,
  pub rfc:              String,
  pub name:             String,
  pub first_last_name:  String,
  #[serde(default)]
  pub second_last_name: Option<String>,
  #[serde(default)]
  pub date_of_birth:    Option<NaiveDate>,
}

impl NewNaturalPerson {
  fn validated(self) -> Result<Self> {
    Ok(Self {
      curp:             validate::text("curp", self.curp, 18, 18)?,
      rfc:              validate::text("rfc", self.rfc, 12, 13)?,
      name:             validate::text("name", self.name, 0, 100)?,
      first_last_name:  validate::text("first_last_name", self.first_last_name, 0, 100)?,
      second_last_name: validate::optional_text(
        "second_last_name",
        self.second_last_name,
        100,
      )?,
      date_of_birth:    self.date_of_birth,
    })
  }
}

/// Caller-supplied fields of a juridical person.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJuridicalPerson {
  pub rfc:                String,
  pub legal_name:         String,
  #[serde(default)]
  pub incorporation_date: Option<NaiveDate>,
}

impl NewJuridicalPerson {
  fn validated(self) -> Result<Self> {
    Ok(Self {
      rfc:                validate::text("rfc", self.rfc, 12, 13)?,
      legal_name:         validate::text("legal_name", self.legal_name, 0, 200)?,
      incorporation_date: self.incorporation_date,
    })
  }
}

#[derive(Debug, Clone)]
pub enum NewPersonDetails {
  Natural(NewNaturalPerson),
  Juridical(NewJuridicalPerson),
}

impl NewPersonDetails {
  pub fn kind(&self) -> PersonKind {
    match self {
      Self::Natural(_) => PersonKind::Natural,
      Self::Juridical(_) => PersonKind::Juridical,
    }
  }

  /// Decode a `details` JSON object according to `kind`.
  pub fn from_json(kind: PersonKind, details: serde_json::Value) -> Result<Self> {
    Ok(match kind {
      PersonKind::Natural => Self::Natural(serde_json::from_value(details)?),
      PersonKind::Juridical => Self::Juridical(serde_json::from_value(details)?),
    })
  }
}

/// Input to [`crate::store::RecordStore::create_person`]. Timestamps and the
/// id are assigned by the store.
///
/// Only constructible through [`NewPerson::new`], so a value of this type has
/// always passed field validation.
#[derive(Debug, Clone)]
pub struct NewPerson {
  active:  bool,
  details: NewPersonDetails,
}

impl NewPerson {
  pub fn new(active: bool, details: NewPersonDetails) -> Result<Self> {
    let details = match details {
      NewPersonDetails::Natural(n) => NewPersonDetails::Natural(n.validated()?),
      NewPersonDetails::Juridical(j) => NewPersonDetails::Juridical(j.validated()?),
    };
    Ok(Self { active, details })
  }

  pub fn active(&self) -> bool { self.active }

  pub fn details(&self) -> &NewPersonDetails { &self.details }

  pub fn kind(&self) -> PersonKind { self.details.kind() }
}

// ─── Listing ─────────────────────────────────────────────────────────────────

/// Exact-match and substring filters for
/// [`crate::store::RecordStore::list_persons`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersonFilter {
  #[serde(rename = "type")]
  pub kind:   Option<PersonKind>,
  pub active: Option<bool>,
  /// Case-insensitive substring of a natural person's `name` or a juridical
  /// person's `legal_name`.
  pub name:   Option<String>,
}

impl PersonFilter {
  /// The name filter with surrounding whitespace removed, or `None` if it is
  /// blank.
  pub fn name_query(&self) -> Option<&str> {
    self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
  }
}

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// skip/limit window over an id-ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
  #[serde(default)]
  pub skip:  u32,
  #[serde(default = "default_limit")]
  pub limit: u32,
}

fn default_limit() -> u32 { DEFAULT_LIMIT }

impl Default for Pagination {
  fn default() -> Self { Self { skip: 0, limit: DEFAULT_LIMIT } }
}

impl Pagination {
  pub fn new(skip: u32, limit: u32) -> Result<Self> {
    Self { skip, limit }.validated()
  }

  /// Require `limit` to fall within `1..=MAX_LIMIT`.
  pub fn validated(self) -> Result<Self> {
    if self.limit == 0 || self.limit > MAX_LIMIT {
      return Err(crate::Error::validation(
        "limit",
        format!("must be between 1 and {MAX_LIMIT}"),
      ));
    }
    Ok(self)
  }
}

/// One page of results together with the total match count before paging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
  pub total: u64,
  pub items: Vec<T>,
}
