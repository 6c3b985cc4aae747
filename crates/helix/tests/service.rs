mod common;

use common::{harness, names, seed_users};
use helix::mem::{MemDb, MemSession};
use helix::prelude::*;
use helix::EntityService;
use helix_testing_fixtures::{User, UserFields};
use std::cell::Cell;
use std::rc::Rc;

///
/// UserService
///

struct UserService {
    factory: QueryFactory<MemSession>,
}

impl EntityService<MemSession> for UserService {
    type Entity = User;

    fn factory(&self) -> &QueryFactory<MemSession> {
        &self.factory
    }
}

fn service() -> (common::Harness, UserService) {
    let h = harness();
    let factory = QueryFactory::new(Rc::clone(&h.session));
    (h, UserService { factory })
}

#[test]
fn find_and_find_by() {
    let (h, service) = service();
    seed_users(&h);

    assert_eq!(service.find().count().unwrap(), 4);

    let result = service.find_by(UserFields::NAME, "Alice").list().unwrap();
    assert_eq!(names(&result), ["Alice"]);

    let filtered = service
        .find_where(UserFields::AGE.gt(30))
        .list()
        .unwrap();
    assert_eq!(names(&filtered), ["Charlie"]);
}

#[test]
fn find_by_in_constrains_empty_collections_to_no_rows() {
    let (h, service) = service();
    seed_users(&h);

    let some = service
        .find_by_in(UserFields::AGE, [25, 35])
        .order_by_asc(UserFields::AGE)
        .list()
        .unwrap();
    assert_eq!(names(&some), ["Bob", "Charlie"]);

    // unlike the builder's where_in no-op, the service opener pins an
    // empty collection to the explicit contradiction
    let none = service
        .find_by_in(UserFields::AGE, Vec::<i32>::new())
        .list()
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn save_persists_transient_and_merges_detached() {
    let (h, service) = service();

    // transient: null identifier → persist, identifier assigned
    let saved = service.save(User::transient("Nora", 41)).unwrap();
    let id = saved.id.expect("assigned identifier");
    assert_eq!(h.db.row_count("User"), 1);

    // detached copy with an identifier → merge, managed copy returned
    let mut detached = saved.clone();
    detached.age = 42;
    let merged = service.save(detached).unwrap();
    assert_eq!(merged.id, Some(id));
    assert_eq!(h.db.row_count("User"), 1);

    let reloaded: User = service.find_by_id(&id).unwrap().unwrap();
    assert_eq!(reloaded.age, 42);
}

#[test]
fn persist_assigns_sequence_identifiers() {
    let (_h, service) = service();

    let mut first = User::transient("one", 1);
    let mut second = User::transient("two", 2);
    service.persist(&mut first).unwrap();
    service.persist(&mut second).unwrap();

    let a = first.id.unwrap();
    let b = second.id.unwrap();
    assert_ne!(a, b);
}

#[test]
fn refresh_restores_and_detach_evicts() {
    let (h, service) = service();
    seed_users(&h);

    let mut alice: User = service.find_by_id(&1).unwrap().unwrap();
    assert!(h.session.contains(&alice));

    alice.age = 99;
    service.refresh(&mut alice).unwrap();
    assert_eq!(alice.age, 30);

    service.detach(&alice);
    assert!(!h.session.contains(&alice));
}

#[test]
fn remove_and_flush_pass_through() {
    let (h, service) = service();
    seed_users(&h);

    let bob: User = service.find_by_id(&2).unwrap().unwrap();
    service.remove(&bob).unwrap();
    assert_eq!(h.db.row_count("User"), 3);

    let flushes = h.session.flush_count();
    service.flush().unwrap();
    assert_eq!(h.session.flush_count(), flushes + 1);
}

#[test]
fn session_suppliers_resolve_on_every_access() {
    let db = MemDb::shared();
    let session = Rc::new(MemSession::new(Rc::clone(&db)));
    let calls = Rc::new(Cell::new(0u32));

    let factory = {
        let calls = Rc::clone(&calls);
        let session = Rc::clone(&session);
        QueryFactory::with_supplier(move || {
            calls.set(calls.get() + 1);
            Rc::clone(&session)
        })
    };

    let _ = factory.session();
    let _ = factory.session();
    let _ = factory.query::<User>().count().unwrap();

    // never cached: three accesses, three supplier invocations
    assert_eq!(calls.get(), 3);
}
