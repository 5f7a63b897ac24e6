//! [`SqliteStore`], the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::Utc;
use registro_core::{
  account::{NewRole, NewUser, Role, User, UserUpdate},
  person::{NewPerson, NewPersonDetails, Page, Pagination, Person, PersonFilter},
  store::RecordStore,
};
use rusqlite::{Connection, OptionalExtension as _};

use crate::{
  encode::{
    JURIDICAL_COLUMNS, NATURAL_COLUMNS, PERSON_COLUMNS, ROLE_COLUMNS, RawDetails,
    RawJuridicalDetails, RawNaturalDetails, RawPerson, RawRole, RawUser, USER_COLUMNS,
    assemble, assemble_one, encode_date, encode_dt, encode_permissions, fold_case,
    full_name,
  },
  schema::SCHEMA,
  Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A registro record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Synchronous helpers (run inside `Connection::call`) ────────────────────

/// Source for person reads: the soft-delete filtering view, or the base table
/// when tombstoned rows are wanted.
fn person_source(include_deleted: bool) -> &'static str {
  if include_deleted { "persons" } else { "live_persons" }
}

fn select_person(
  conn: &Connection,
  id: i64,
  include_deleted: bool,
) -> rusqlite::Result<Option<RawPerson>> {
  let sql = format!(
    "SELECT {PERSON_COLUMNS} FROM {} p WHERE p.id = ?1",
    person_source(include_deleted)
  );
  conn.query_row(&sql, rusqlite::params![id], RawPerson::from_row).optional()
}

/// Fetch detail rows for every id in `ids` with one query per detail table.
fn select_details(conn: &Connection, ids: &[i64]) -> rusqlite::Result<RawDetails> {
  if ids.is_empty() {
    return Ok(RawDetails::default());
  }

  let placeholders = vec!["?"; ids.len()].join(", ");

  let mut stmt = conn.prepare(&format!(
    "SELECT {NATURAL_COLUMNS} FROM natural_person_details
     WHERE person_id IN ({placeholders})"
  ))?;
  let natural = stmt
    .query_map(rusqlite::params_from_iter(ids), RawNaturalDetails::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut stmt = conn.prepare(&format!(
    "SELECT {JURIDICAL_COLUMNS} FROM juridical_person_details
     WHERE person_id IN ({placeholders})"
  ))?;
  let juridical = stmt
    .query_map(rusqlite::params_from_iter(ids), RawJuridicalDetails::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(RawDetails { natural, juridical })
}

/// Read one person with its details. `None` if the base row is not visible.
fn load_person(
  conn: &Connection,
  id: i64,
  include_deleted: bool,
) -> rusqlite::Result<Option<(RawPerson, RawDetails)>> {
  let Some(row) = select_person(conn, id, include_deleted)? else {
    return Ok(None);
  };
  let details = select_details(conn, &[id])?;
  Ok(Some((row, details)))
}

fn into_single(loaded: Option<(RawPerson, RawDetails)>) -> Result<Option<Person>> {
  loaded.map(|(row, details)| assemble_one(row, details)).transpose()
}

/// Case-fold `text` and escape LIKE wildcards so it matches the folded name
/// columns literally under `ESCAPE '\'`.
fn like_pattern(text: &str) -> String {
  let folded = fold_case(text);
  let mut escaped = String::with_capacity(folded.len() + 2);
  escaped.push('%');
  for c in folded.chars() {
    if matches!(c, '\\' | '%' | '_') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped.push('%');
  escaped
}

/// Shared FROM/WHERE for person listing. Parameters: `?1` kind, `?2` active,
/// `?3` LIKE pattern; each is ignored when NULL.
///
/// Both detail tables are outer-joined; `person_id` is UNIQUE in each, so the
/// join never multiplies rows.
const PERSON_LIST_FROM: &str = r"
  FROM live_persons p
  LEFT JOIN natural_person_details   n ON n.person_id = p.id
  LEFT JOIN juridical_person_details j ON j.person_id = p.id
  WHERE (?1 IS NULL OR p.kind = ?1)
    AND (?2 IS NULL OR p.active = ?2)
    AND (?3 IS NULL
         OR n.name_folded       LIKE ?3 ESCAPE '\'
         OR j.legal_name_folded LIKE ?3 ESCAPE '\')";

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn create_person(&self, input: NewPerson) -> Result<Person> {
    let now = encode_dt(Utc::now());

    let (row, details) = self
      .conn
      .call(move |conn| {
        // Dropping an uncommitted transaction rolls it back, so a failed
        // detail insert never leaves an orphaned base row.
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO persons (kind, active, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?3)",
          rusqlite::params![input.kind().as_str(), input.active(), now],
        )?;
        let id = tx.last_insert_rowid();

        match input.details() {
          NewPersonDetails::Natural(n) => {
            tx.execute(
              "INSERT INTO natural_person_details (
                 person_id, curp, rfc, name, first_last_name,
                 second_last_name, date_of_birth, created_at,
                 full_name, name_folded
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
              rusqlite::params![
                id,
                n.curp,
                n.rfc,
                n.name,
                n.first_last_name,
                n.second_last_name,
                n.date_of_birth.map(encode_date),
                now,
                full_name(&n.name, &n.first_last_name, n.second_last_name.as_deref()),
                fold_case(&n.name),
              ],
            )?;
          }
          NewPersonDetails::Juridical(j) => {
            tx.execute(
              "INSERT INTO juridical_person_details (
                 person_id, rfc, legal_name, incorporation_date, created_at,
                 legal_name_folded
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
              rusqlite::params![
                id,
                j.rfc,
                j.legal_name,
                j.incorporation_date.map(encode_date),
                now,
                fold_case(&j.legal_name),
              ],
            )?;
          }
        }

        let row = select_person(&tx, id, true)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        let details = select_details(&tx, &[id])?;
        tx.commit()?;
        Ok((row, details))
      })
      .await?;

    assemble_one(row, details)
  }

  async fn get_person(&self, id: i64, include_deleted: bool) -> Result<Option<Person>> {
    let loaded = self
      .conn
      .call(move |conn| Ok(load_person(conn, id, include_deleted)?))
      .await?;
    into_single(loaded)
  }

  async fn list_persons(
    &self,
    filter: &PersonFilter,
    page: Pagination,
  ) -> Result<Page<Person>> {
    let kind = filter.kind.map(|k| k.as_str());
    let active = filter.active;
    let pattern = filter.name_query().map(like_pattern);
    let limit = i64::from(page.limit);
    let offset = i64::from(page.skip);

    let (total, rows, details) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) {PERSON_LIST_FROM}"),
          rusqlite::params![kind, active, pattern],
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {PERSON_COLUMNS} {PERSON_LIST_FROM}
           ORDER BY p.id
           LIMIT ?4 OFFSET ?5"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![kind, active, pattern, limit, offset],
            RawPerson::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let details = select_details(conn, &ids)?;

        Ok((total, rows, details))
      })
      .await?;

    Ok(Page { total: total as u64, items: assemble(rows, details)? })
  }

  async fn delete_person(&self, id: i64) -> Result<Option<Person>> {
    let now = encode_dt(Utc::now());

    let loaded = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // The tombstone check and the write are one statement, so two
        // concurrent deletes cannot both succeed.
        let changed = tx.execute(
          "UPDATE persons SET deleted_at = ?2, updated_at = ?2
           WHERE id = ?1 AND deleted_at IS NULL",
          rusqlite::params![id, now],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let loaded = load_person(&tx, id, true)?;
        tx.commit()?;
        Ok(loaded)
      })
      .await?;

    into_single(loaded)
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let now = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (username, email, name, is_active, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![input.username, input.email, input.name, input.is_active, now],
        )?;
        let id = conn.last_insert_rowid();
        Ok(conn.query_row(
          &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
          rusqlite::params![id],
          RawUser::from_row,
        )?)
      })
      .await?;

    raw.into_user()
  }

  async fn get_user(&self, id: i64) -> Result<Option<User>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
              rusqlite::params![id],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self, page: Pagination) -> Result<Page<User>> {
    let limit = i64::from(page.limit);
    let offset = i64::from(page.skip);

    let (total, raws) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT ?1 OFFSET ?2"
        ))?;
        let raws = stmt
          .query_map(rusqlite::params![limit, offset], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((total, raws))
      })
      .await?;

    Ok(Page {
      total: total as u64,
      items: raws.into_iter().map(RawUser::into_user).collect::<Result<_>>()?,
    })
  }

  async fn update_user(&self, id: i64, update: UserUpdate) -> Result<Option<User>> {
    if update.is_empty() {
      return self.get_user(id).await;
    }

    let now = encode_dt(Utc::now());
    // `Some(None)` clears the name; `None` keeps it.
    let set_name = update.name.is_some();
    let name = update.name.flatten();

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE users SET
             username   = COALESCE(?2, username),
             email      = COALESCE(?3, email),
             name       = CASE WHEN ?4 THEN ?5 ELSE name END,
             updated_at = ?6
           WHERE id = ?1",
          rusqlite::params![id, update.username, update.email, set_name, name, now],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let raw = tx.query_row(
          &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
          rusqlite::params![id],
          RawUser::from_row,
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Roles ─────────────────────────────────────────────────────────────────

  async fn create_role(&self, input: NewRole) -> Result<Role> {
    let now = encode_dt(Utc::now());
    let permissions = encode_permissions(&input.permissions)?;

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO roles (name, description, permissions, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![input.name, input.description, permissions, now],
        )?;
        let id = conn.last_insert_rowid();
        Ok(conn.query_row(
          &format!("SELECT {ROLE_COLUMNS} FROM roles WHERE id = ?1"),
          rusqlite::params![id],
          RawRole::from_row,
        )?)
      })
      .await?;

    raw.into_role()
  }

  async fn get_role(&self, id: i64) -> Result<Option<Role>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ROLE_COLUMNS} FROM roles WHERE id = ?1"),
              rusqlite::params![id],
              RawRole::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRole::into_role).transpose()
  }

  async fn list_roles(&self) -> Result<Vec<Role>> {
    let raws = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {ROLE_COLUMNS} FROM roles ORDER BY id"))?;
        let raws = stmt
          .query_map([], RawRole::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(raws)
      })
      .await?;

    raws.into_iter().map(RawRole::into_role).collect()
  }
}
