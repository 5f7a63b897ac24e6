//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use registro_core::{
  account::{NewRole, NewUser, Permission, UserUpdate},
  person::{
    NewJuridicalPerson, NewNaturalPerson, NewPerson, NewPersonDetails, Pagination,
    PersonDetails, PersonFilter, PersonKind,
  },
  store::{RecordStore, StoreError},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn natural(name: &str, curp: &str) -> NewPerson {
  NewPerson::new(
    true,
    NewPersonDetails::Natural(NewNaturalPerson {
      curp:             curp.into(),
      rfc:              "RFC123456789".into(),
      name:             name.into(),
      first_last_name:  "Doe".into(),
      second_last_name: Some("Smith".into()),
      date_of_birth:    NaiveDate::from_ymd_opt(1990, 1, 1),
    }),
  )
  .unwrap()
}

fn juridical(legal_name: &str, active: bool) -> NewPerson {
  NewPerson::new(
    active,
    NewPersonDetails::Juridical(NewJuridicalPerson {
      rfc:                "RFC987654321".into(),
      legal_name:         legal_name.into(),
      incorporation_date: NaiveDate::from_ymd_opt(2000, 5, 15),
    }),
  )
  .unwrap()
}

fn curp(i: usize) -> String { format!("CURPXXXXXXXXXXXX{i:02}") }

fn all() -> PersonFilter { PersonFilter::default() }

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_natural_person_computes_full_name() {
  let s = store().await;

  let person = s.create_person(natural("John", &curp(0))).await.unwrap();
  assert_eq!(person.kind(), PersonKind::Natural);
  assert!(person.active);
  assert!(person.deleted_at.is_none());
  assert_eq!(person.created_at, person.updated_at);

  match &person.details {
    PersonDetails::Natural(d) => {
      assert_eq!(d.person_id, person.id);
      assert_eq!(d.curp, curp(0));
      assert_eq!(d.full_name, "JOHN DOE SMITH");
      assert_eq!(d.date_of_birth, NaiveDate::from_ymd_opt(1990, 1, 1));
    }
    other => panic!("unexpected details: {other:?}"),
  }
}

#[tokio::test]
async fn full_name_omits_missing_second_last_name() {
  let s = store().await;
  let input = NewPerson::new(
    true,
    NewPersonDetails::Natural(NewNaturalPerson {
      curp:             curp(1),
      rfc:              "RFC123456789".into(),
      name:             "Ana".into(),
      first_last_name:  "Ruiz".into(),
      second_last_name: None,
      date_of_birth:    None,
    }),
  )
  .unwrap();

  let person = s.create_person(input).await.unwrap();
  let PersonDetails::Natural(d) = person.details else {
    panic!("expected natural details");
  };
  assert_eq!(d.full_name, "ANA RUIZ");
  assert!(d.date_of_birth.is_none());
}

#[tokio::test]
async fn create_juridical_person() {
  let s = store().await;

  let person = s.create_person(juridical("Acme Corporation", false)).await.unwrap();
  assert_eq!(person.kind(), PersonKind::Juridical);
  assert!(!person.active);

  match &person.details {
    PersonDetails::Juridical(d) => {
      assert_eq!(d.legal_name, "Acme Corporation");
      assert_eq!(d.incorporation_date, NaiveDate::from_ymd_opt(2000, 5, 15));
    }
    other => panic!("unexpected details: {other:?}"),
  }
}

#[tokio::test]
async fn duplicate_curp_is_a_conflict_and_leaves_no_base_row() {
  let s = store().await;
  s.create_person(natural("John", &curp(0))).await.unwrap();

  let err = s.create_person(natural("Jane", &curp(0))).await.unwrap_err();
  assert!(err.is_conflict(), "{err}");

  // The failed create rolled back its base row too.
  let page = s.list_persons(&all(), Pagination::default()).await.unwrap();
  assert_eq!(page.total, 1);
  assert!(s.get_person(2, true).await.unwrap().is_none());
}

// ─── List ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_empty_store() {
  let s = store().await;
  let page = s.list_persons(&all(), Pagination::default()).await.unwrap();
  assert_eq!(page.total, 0);
  assert!(page.items.is_empty());
}

#[tokio::test]
async fn list_paginates_in_id_order() {
  let s = store().await;
  for i in 0..15 {
    s.create_person(natural(&format!("Person {i}"), &curp(i))).await.unwrap();
  }

  let first = s.list_persons(&all(), Pagination::new(0, 10).unwrap()).await.unwrap();
  assert_eq!(first.total, 15);
  assert_eq!(first.items.len(), 10);
  assert!(first.items.windows(2).all(|w| w[0].id < w[1].id));

  let second = s.list_persons(&all(), Pagination::new(10, 10).unwrap()).await.unwrap();
  assert_eq!(second.total, 15);
  assert_eq!(second.items.len(), 5);
  assert!(first.items.last().unwrap().id < second.items[0].id);

  let past_end = s.list_persons(&all(), Pagination::new(20, 10).unwrap()).await.unwrap();
  assert_eq!(past_end.total, 15);
  assert!(past_end.items.is_empty());
}

#[tokio::test]
async fn list_attaches_details_of_both_kinds() {
  let s = store().await;
  s.create_person(natural("John", &curp(0))).await.unwrap();
  s.create_person(juridical("Acme Corporation", true)).await.unwrap();
  s.create_person(natural("Jane", &curp(1))).await.unwrap();

  let page = s.list_persons(&all(), Pagination::default()).await.unwrap();
  let kinds: Vec<PersonKind> = page.items.iter().map(|p| p.kind()).collect();
  assert_eq!(
    kinds,
    vec![PersonKind::Natural, PersonKind::Juridical, PersonKind::Natural]
  );
  for p in &page.items {
    let person_id = match &p.details {
      PersonDetails::Natural(d) => d.person_id,
      PersonDetails::Juridical(d) => d.person_id,
    };
    assert_eq!(person_id, p.id);
  }
}

#[tokio::test]
async fn list_filters_by_kind_and_active() {
  let s = store().await;
  s.create_person(natural("John", &curp(0))).await.unwrap();
  s.create_person(juridical("Acme Corporation", false)).await.unwrap();

  let naturals = PersonFilter { kind: Some(PersonKind::Natural), ..all() };
  let page = s.list_persons(&naturals, Pagination::default()).await.unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.items[0].kind(), PersonKind::Natural);

  let inactive = PersonFilter { active: Some(false), ..all() };
  let page = s.list_persons(&inactive, Pagination::default()).await.unwrap();
  assert_eq!(page.total, 1);
  assert!(!page.items[0].active);

  let none = PersonFilter {
    kind: Some(PersonKind::Natural),
    active: Some(false),
    ..all()
  };
  let page = s.list_persons(&none, Pagination::default()).await.unwrap();
  assert_eq!(page.total, 0);
}

#[tokio::test]
async fn list_filters_by_name_across_both_detail_tables() {
  let s = store().await;
  s.create_person(natural("Alice Wonderland", &curp(0))).await.unwrap();
  s.create_person(juridical("Wonderland LLC", true)).await.unwrap();
  s.create_person(natural("Bob", &curp(1))).await.unwrap();

  let by_name = |n: &str| PersonFilter { name: Some(n.into()), ..all() };

  let page = s.list_persons(&by_name("alice"), Pagination::default()).await.unwrap();
  assert_eq!(page.total, 1);

  let page = s.list_persons(&by_name("WONDERLAND"), Pagination::default()).await.unwrap();
  assert_eq!(page.total, 2);
  assert_eq!(page.items.len(), 2);

  let page = s.list_persons(&by_name("Nobody"), Pagination::default()).await.unwrap();
  assert_eq!(page.total, 0);
}

#[tokio::test]
async fn accented_names_are_upper_cased_and_matched_without_case() {
  let s = store().await;
  let input = NewPerson::new(
    true,
    NewPersonDetails::Natural(NewNaturalPerson {
      curp:             curp(0),
      rfc:              "RFC123456789".into(),
      name:             "Ángela".into(),
      first_last_name:  "Núñez".into(),
      second_last_name: Some("Peña".into()),
      date_of_birth:    None,
    }),
  )
  .unwrap();
  let person = s.create_person(input).await.unwrap();
  let PersonDetails::Natural(d) = &person.details else {
    panic!("expected natural details");
  };
  assert_eq!(d.name, "Ángela");
  assert_eq!(d.full_name, "ÁNGELA NÚÑEZ PEÑA");

  s.create_person(juridical("Compañía Óptima", true)).await.unwrap();

  let by_name = |n: &str| PersonFilter { name: Some(n.into()), ..all() };
  for query in ["ángela", "ÁNGELA", "ÁnGeLa"] {
    let page = s.list_persons(&by_name(query), Pagination::default()).await.unwrap();
    assert_eq!(page.total, 1, "{query}");
    assert_eq!(page.items[0].id, person.id);
  }

  let page = s.list_persons(&by_name("COMPAÑÍA"), Pagination::default()).await.unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.items[0].kind(), PersonKind::Juridical);
}

#[tokio::test]
async fn name_filter_treats_wildcards_literally() {
  let s = store().await;
  s.create_person(juridical("100% Natural Foods", true)).await.unwrap();
  s.create_person(juridical("1000 Widgets", true)).await.unwrap();

  let filter = PersonFilter { name: Some("100%".into()), ..all() };
  let page = s.list_persons(&filter, Pagination::default()).await.unwrap();
  assert_eq!(page.total, 1);

  let filter = PersonFilter { name: Some("_".into()), ..all() };
  let page = s.list_persons(&filter, Pagination::default()).await.unwrap();
  assert_eq!(page.total, 0);
}

#[tokio::test]
async fn listing_is_repeatable() {
  let s = store().await;
  s.create_person(natural("John", &curp(0))).await.unwrap();
  s.create_person(juridical("Acme Corporation", true)).await.unwrap();

  let a = s.list_persons(&all(), Pagination::default()).await.unwrap();
  let b = s.list_persons(&all(), Pagination::default()).await.unwrap();
  assert_eq!(a.total, b.total);
  assert_eq!(a.items, b.items);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_sets_tombstone_once() {
  let s = store().await;
  let person = s.create_person(natural("John", &curp(0))).await.unwrap();

  let deleted = s.delete_person(person.id).await.unwrap().expect("deleted");
  assert_eq!(deleted.id, person.id);
  assert!(deleted.is_deleted());
  assert_eq!(deleted.deleted_at, Some(deleted.updated_at));
  assert_eq!(deleted.details.kind(), PersonKind::Natural);

  // Second delete finds nothing live.
  assert!(s.delete_person(person.id).await.unwrap().is_none());

  // The row is still there, tombstoned.
  let stored = s.get_person(person.id, true).await.unwrap().expect("row kept");
  assert!(stored.deleted_at.is_some());
  assert!(s.get_person(person.id, false).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_missing_returns_none() {
  let s = store().await;
  assert!(s.delete_person(9999).await.unwrap().is_none());
}

#[tokio::test]
async fn deleted_persons_leave_listings() {
  let s = store().await;
  let a = s.create_person(natural("John", &curp(0))).await.unwrap();
  s.create_person(juridical("Acme Corporation", true)).await.unwrap();
  s.delete_person(a.id).await.unwrap();

  let page = s.list_persons(&all(), Pagination::default()).await.unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.items[0].kind(), PersonKind::Juridical);
}

// ─── Users ───────────────────────────────────────────────────────────────────

fn new_user(username: &str, email: &str) -> NewUser {
  NewUser {
    username:  username.into(),
    email:     email.into(),
    name:      None,
    is_active: true,
  }
  .validated()
  .unwrap()
}

#[tokio::test]
async fn create_get_and_list_users() {
  let s = store().await;
  let alice = s.create_user(new_user("alice", "alice@example.com")).await.unwrap();
  s.create_user(new_user("bob", "bob@example.com")).await.unwrap();

  let fetched = s.get_user(alice.id).await.unwrap().expect("user");
  assert_eq!(fetched, alice);
  assert!(s.get_user(42).await.unwrap().is_none());

  let page = s.list_users(Pagination::new(1, 10).unwrap()).await.unwrap();
  assert_eq!(page.total, 2);
  assert_eq!(page.items.len(), 1);
  assert_eq!(page.items[0].username, "bob");
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
  let s = store().await;
  s.create_user(new_user("alice", "alice@example.com")).await.unwrap();
  let err = s
    .create_user(new_user("alice", "other@example.com"))
    .await
    .unwrap_err();
  assert!(err.is_conflict());
}

#[tokio::test]
async fn update_user_changes_only_given_fields() {
  let s = store().await;
  let alice = s.create_user(new_user("alice", "alice@example.com")).await.unwrap();

  let update = UserUpdate { name: Some(Some("Alice L.".into())), ..Default::default() };
  let updated = s.update_user(alice.id, update).await.unwrap().expect("user");
  assert_eq!(updated.username, "alice");
  assert_eq!(updated.email, "alice@example.com");
  assert_eq!(updated.name.as_deref(), Some("Alice L."));
  assert!(updated.updated_at >= alice.updated_at);

  let untouched = s
    .update_user(alice.id, UserUpdate { email: Some("a@example.org".into()), ..Default::default() })
    .await
    .unwrap()
    .expect("user");
  assert_eq!(untouched.name.as_deref(), Some("Alice L."));
  assert_eq!(untouched.email, "a@example.org");

  let cleared = s
    .update_user(alice.id, UserUpdate { name: Some(None), ..Default::default() })
    .await
    .unwrap()
    .expect("user");
  assert!(cleared.name.is_none());
  assert_eq!(cleared.email, "a@example.org");

  let missing = s.update_user(99, UserUpdate {
    username: Some("ghost".into()),
    ..Default::default()
  });
  assert!(missing.await.unwrap().is_none());
}

// ─── Roles ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn roles_round_trip_permissions() {
  let s = store().await;
  let role = s
    .create_role(NewRole {
      name:        "admin".into(),
      description: Some("Administrator role with full permissions.".into()),
      permissions: vec![Permission::CreateProduct, Permission::DeletePerson],
    })
    .await
    .unwrap();

  let fetched = s.get_role(role.id).await.unwrap().expect("role");
  assert_eq!(fetched.permissions, vec![Permission::CreateProduct, Permission::DeletePerson]);

  s.create_role(NewRole { name: "viewer".into(), description: None, permissions: vec![] })
    .await
    .unwrap();
  let roles = s.list_roles().await.unwrap();
  assert_eq!(roles.len(), 2);
  assert_eq!(roles[1].name, "viewer");
  assert!(roles[1].permissions.is_empty());

  let err = s
    .create_role(NewRole { name: "admin".into(), description: None, permissions: vec![] })
    .await
    .unwrap_err();
  assert!(err.is_conflict());
}
