//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as `YYYY-MM-DD`,
//! and role permissions as a compact JSON array.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use registro_core::{
  account::{Permission, Role, User},
  person::{
    JuridicalPersonDetails, NaturalPersonDetails, Person, PersonDetails, PersonKind,
  },
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(e.to_string()))
}

// ─── PersonKind ──────────────────────────────────────────────────────────────

pub fn decode_person_kind(s: &str) -> Result<PersonKind> {
  s.parse().map_err(|_| Error::UnknownCode { column: "persons.kind", value: s.to_owned() })
}

// ─── Names ───────────────────────────────────────────────────────────────────

/// Upper-cased `name first_last_name [second_last_name]`, skipping empty
/// parts. SQLite's `UPPER()` only folds ASCII, so this runs in Rust.
pub fn full_name(name: &str, first_last_name: &str, second_last_name: Option<&str>) -> String {
  [Some(name), Some(first_last_name), second_last_name]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
    .to_uppercase()
}

/// Lower-cased copy of a searchable name, matched by the listing name filter.
pub fn fold_case(s: &str) -> String { s.to_lowercase() }

// ─── Permissions ─────────────────────────────────────────────────────────────

pub fn encode_permissions(p: &[Permission]) -> Result<String> {
  Ok(serde_json::to_string(p)?)
}

pub fn decode_permissions(s: &str) -> Result<Vec<Permission>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawPerson::from_row`]; `p` aliases the person
/// table or view.
pub const PERSON_COLUMNS: &str =
  "p.id, p.kind, p.active, p.created_at, p.updated_at, p.deleted_at";

/// Raw values read directly from a `persons` row.
pub struct RawPerson {
  pub id:         i64,
  pub kind:       String,
  pub active:     bool,
  pub created_at: String,
  pub updated_at: String,
  pub deleted_at: Option<String>,
}

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      kind:       row.get(1)?,
      active:     row.get(2)?,
      created_at: row.get(3)?,
      updated_at: row.get(4)?,
      deleted_at: row.get(5)?,
    })
  }

  fn into_person(self, details: PersonDetails) -> Result<Person> {
    Ok(Person {
      id: self.id,
      active: self.active,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      deleted_at: self.deleted_at.as_deref().map(decode_dt).transpose()?,
      details,
    })
  }
}

pub const NATURAL_COLUMNS: &str = "person_id, curp, rfc, name, first_last_name, \
   second_last_name, date_of_birth, created_at, full_name";

/// Raw values read from a `natural_person_details` row.
pub struct RawNaturalDetails {
  pub person_id:        i64,
  pub curp:             String,
  pub rfc:              String,
  pub name:             String,
  pub first_last_name:  String,
  pub second_last_name: Option<String>,
  pub date_of_birth:    Option<String>,
  pub created_at:       String,
  pub full_name:        String,
}

impl RawNaturalDetails {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:        row.get(0)?,
      curp:             row.get(1)?,
      rfc:              row.get(2)?,
      name:             row.get(3)?,
      first_last_name:  row.get(4)?,
      second_last_name: row.get(5)?,
      date_of_birth:    row.get(6)?,
      created_at:       row.get(7)?,
      full_name:        row.get(8)?,
    })
  }

  fn into_details(self) -> Result<NaturalPersonDetails> {
    Ok(NaturalPersonDetails {
      person_id:        self.person_id,
      curp:             self.curp,
      rfc:              self.rfc,
      name:             self.name,
      first_last_name:  self.first_last_name,
      second_last_name: self.second_last_name,
      date_of_birth:    self.date_of_birth.as_deref().map(decode_date).transpose()?,
      created_at:       decode_dt(&self.created_at)?,
      full_name:        self.full_name,
    })
  }
}

pub const JURIDICAL_COLUMNS: &str =
  "person_id, rfc, legal_name, incorporation_date, created_at";

/// Raw values read from a `juridical_person_details` row.
pub struct RawJuridicalDetails {
  pub person_id:          i64,
  pub rfc:                String,
  pub legal_name:         String,
  pub incorporation_date: Option<String>,
  pub created_at:         String,
}

impl RawJuridicalDetails {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:          row.get(0)?,
      rfc:                row.get(1)?,
      legal_name:         row.get(2)?,
      incorporation_date: row.get(3)?,
      created_at:         row.get(4)?,
    })
  }

  fn into_details(self) -> Result<JuridicalPersonDetails> {
    Ok(JuridicalPersonDetails {
      person_id:          self.person_id,
      rfc:                self.rfc,
      legal_name:         self.legal_name,
      incorporation_date: self
        .incorporation_date
        .as_deref()
        .map(decode_date)
        .transpose()?,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

/// Detail rows fetched for a batch of person ids.
#[derive(Default)]
pub struct RawDetails {
  pub natural:   Vec<RawNaturalDetails>,
  pub juridical: Vec<RawJuridicalDetails>,
}

/// Detail records keyed by person id, ready to be attached to base rows.
struct DetailLookup {
  natural:   HashMap<i64, RawNaturalDetails>,
  juridical: HashMap<i64, RawJuridicalDetails>,
}

impl From<RawDetails> for DetailLookup {
  fn from(details: RawDetails) -> Self {
    Self {
      natural:   details.natural.into_iter().map(|d| (d.person_id, d)).collect(),
      juridical: details.juridical.into_iter().map(|d| (d.person_id, d)).collect(),
    }
  }
}

impl DetailLookup {
  /// Attach the detail record selected by the row's kind.
  fn attach(&mut self, raw: RawPerson) -> Result<Person> {
    let kind = decode_person_kind(&raw.kind)?;
    let missing = Error::MissingDetails { id: raw.id, kind };
    let details = match kind {
      PersonKind::Natural => PersonDetails::Natural(
        self.natural.remove(&raw.id).ok_or(missing)?.into_details()?,
      ),
      PersonKind::Juridical => PersonDetails::Juridical(
        self.juridical.remove(&raw.id).ok_or(missing)?.into_details()?,
      ),
    };
    raw.into_person(details)
  }
}

/// Merge base rows with their detail rows, preserving the order of `rows`.
pub fn assemble(rows: Vec<RawPerson>, details: RawDetails) -> Result<Vec<Person>> {
  let mut lookup = DetailLookup::from(details);
  rows.into_iter().map(|raw| lookup.attach(raw)).collect()
}

pub fn assemble_one(row: RawPerson, details: RawDetails) -> Result<Person> {
  DetailLookup::from(details).attach(row)
}

pub const USER_COLUMNS: &str =
  "id, username, email, name, is_active, created_at, updated_at";

/// Raw values read from a `users` row.
pub struct RawUser {
  pub id:         i64,
  pub username:   String,
  pub email:      String,
  pub name:       Option<String>,
  pub is_active:  bool,
  pub created_at: String,
  pub updated_at: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      username:   row.get(1)?,
      email:      row.get(2)?,
      name:       row.get(3)?,
      is_active:  row.get(4)?,
      created_at: row.get(5)?,
      updated_at: row.get(6)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:         self.id,
      username:   self.username,
      email:      self.email,
      name:       self.name,
      is_active:  self.is_active,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

pub const ROLE_COLUMNS: &str = "id, name, description, permissions, created_at";

/// Raw values read from a `roles` row.
pub struct RawRole {
  pub id:          i64,
  pub name:        String,
  pub description: Option<String>,
  pub permissions: String,
  pub created_at:  String,
}

impl RawRole {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      name:        row.get(1)?,
      description: row.get(2)?,
      permissions: row.get(3)?,
      created_at:  row.get(4)?,
    })
  }

  pub fn into_role(self) -> Result<Role> {
    Ok(Role {
      id:          self.id,
      name:        self.name,
      description: self.description,
      permissions: decode_permissions(&self.permissions)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
