//! Users, roles and the permission catalogue.
//!
//! These are plain records: nothing in the system enforces a role's
//! permissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Result, validate};

// ─── Users ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:         i64,
  pub username:   String,
  pub email:      String,
  pub name:       Option<String>,
  pub is_active:  bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::RecordStore::create_user`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
  pub username:  String,
  pub email:     String,
  #[serde(default)]
  pub name:      Option<String>,
  #[serde(default = "default_true")]
  pub is_active: bool,
}

fn default_true() -> bool { true }

impl NewUser {
  pub fn validated(self) -> Result<Self> {
    Ok(Self {
      username:  validate::text("username", self.username, 1, 50)?,
      email:     validate::email("email", self.email)?,
      name:      validate::optional_text("name", self.name, 100)?,
      is_active: self.is_active,
    })
  }
}

/// Partial update; `None` leaves the stored value untouched.
///
/// `name` is nullable: an explicit JSON `null` (or a blank string) arrives as
/// `Some(None)` and clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
  #[serde(default)]
  pub username: Option<String>,
  #[serde(default)]
  pub email:    Option<String>,
  #[serde(default, deserialize_with = "present")]
  pub name:     Option<Option<String>>,
}

/// Mark a field that appeared in the body, even as `null`.
fn present<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(de).map(Some)
}

impl UserUpdate {
  pub fn validated(self) -> Result<Self> {
    Ok(Self {
      username: self
        .username
        .map(|u| validate::text("username", u, 1, 50))
        .transpose()?,
      email:    self.email.map(|e| validate::email("email", e)).transpose()?,
      name:     self
        .name
        .map(|n| validate::optional_text("name", n, 100))
        .transpose()?,
    })
  }

  pub fn is_empty(&self) -> bool {
    self.username.is_none() && self.email.is_none() && self.name.is_none()
  }
}

// ─── Permissions ─────────────────────────────────────────────────────────────

/// Every named permission a role may carry.
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
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Permission {
  ReadPerson,
  CreatePerson,
  DeletePerson,
  ReadUser,
  CreateUser,
  UpdateUser,
  ReadRole,
  CreateRole,
  CreateProduct,
  ReadProduct,
  AssessRisk,
  ManageBlacklist,
  CreateTransaction,
}

impl Permission {
  pub fn as_str(self) -> &'static str { self.into() }

  /// All permissions in declaration order.
  pub fn all() -> impl Iterator<Item = Self> { <Self as strum::IntoEnumIterator>::iter() }
}

// ─── Roles ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
  pub id:          i64,
  pub name:        String,
  pub description: Option<String>,
  pub permissions: Vec<Permission>,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::RecordStore::create_role`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewRole {
  pub name:        String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub permissions: Vec<Permission>,
}

impl NewRole {
  /// Trim the name and collapse repeated permissions, keeping the first
  /// occurrence of each.
  pub fn validated(self) -> Result<Self> {
    let mut permissions = Vec::with_capacity(self.permissions.len());
    for p in self.permissions {
      if !permissions.contains(&p) {
        permissions.push(p);
      }
    }

    Ok(Self {
      name: validate::text("name", self.name, 1, 50)?,
      description: validate::optional_text("description", self.description, 500)?,
      permissions,
    })
  }
}
