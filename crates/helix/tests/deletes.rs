mod common;

use common::{harness, seed_users};
use helix::mem::MemSession;
use helix::prelude::*;
use helix::{HelixError, RuntimeError};
use helix_testing_fixtures::{User, UserFields, user_removals_matching};
use std::rc::Rc;

fn seed_doomed(h: &common::Harness, prefix: &str, count: i64) {
    for n in 0..count {
        let mut user = User::seed(100 + n, &format!("{prefix}-{n}"), 99);
        h.session.persist(&mut user).unwrap();
    }
}

#[test]
fn managed_delete_runs_lifecycle_hooks_and_evicts() {
    let h = harness();
    seed_users(&h);
    seed_doomed(&h, "managed-hooks", 2);

    let removed = h
        .factory
        .query::<User>()
        .where_equal(UserFields::AGE, 99)
        .delete()
        .unwrap();

    assert_eq!(removed, 2);
    assert_eq!(user_removals_matching("managed-hooks"), 2);
    assert_eq!(h.db.row_count("User"), 4);

    let survivors = h.factory.query::<User>().count().unwrap();
    assert_eq!(survivors, 4);
}

#[test]
fn bulk_delete_bypasses_hooks_and_the_context() {
    let h = harness();
    seed_users(&h);
    seed_doomed(&h, "bulk-hooks", 2);

    // load one doomed row so the session manages it
    let managed: User = h.session.find_by_id(&100).unwrap().unwrap();
    assert!(h.session.contains(&managed));

    // a fresh session over the same database issues the bulk statement
    let fresh = Rc::new(MemSession::new(Rc::clone(&h.db)));
    let bulk_factory = QueryFactory::new(Rc::clone(&fresh));
    let removed = bulk_factory
        .query::<User>()
        .where_equal(UserFields::AGE, 99)
        .delete_bulk()
        .unwrap();

    assert_eq!(removed, 2);
    assert_eq!(user_removals_matching("bulk-hooks"), 0);
    assert_eq!(h.db.row_count("User"), 4);
    // the original persistence context is untouched
    assert!(h.session.contains(&managed));
}

#[test]
fn managed_and_bulk_delete_agree_on_counts() {
    let first = harness();
    seed_users(&first);
    seed_doomed(&first, "count-parity", 3);
    let managed = first
        .factory
        .query::<User>()
        .where_equal(UserFields::AGE, 99)
        .delete()
        .unwrap();

    let second = harness();
    seed_users(&second);
    seed_doomed(&second, "count-parity", 3);
    let bulk = second
        .factory
        .query::<User>()
        .where_equal(UserFields::AGE, 99)
        .delete_bulk()
        .unwrap();

    assert_eq!(managed, bulk);
    assert_eq!(managed, 3);
}

#[test]
fn unbounded_deletes_are_refused() {
    let h = harness();
    seed_users(&h);

    let err = h.factory.query::<User>().delete().unwrap_err();
    assert!(matches!(err, HelixError::UnboundedMutation { .. }));

    let err = h.factory.query::<User>().delete_bulk().unwrap_err();
    assert!(matches!(err, HelixError::UnboundedMutation { .. }));

    // nothing was removed
    assert_eq!(h.db.row_count("User"), 4);

    // the *_all variants are the deliberate full wipes
    let removed = h.factory.query::<User>().delete_all().unwrap();
    assert_eq!(removed, 4);
}

#[test]
fn delete_expecting_guards_the_count() {
    let h = harness();
    seed_users(&h);
    seed_doomed(&h, "expected", 3);

    let err = h
        .factory
        .query::<User>()
        .where_equal(UserFields::AGE, 99)
        .delete_expecting(5)
        .unwrap_err();
    assert!(err.is_expectation_violation());
    // no mutation happened
    assert_eq!(h.db.row_count("User"), 7);

    let removed = h
        .factory
        .query::<User>()
        .where_equal(UserFields::AGE, 99)
        .delete_expecting(3)
        .unwrap();
    assert_eq!(removed, 3);
    assert_eq!(h.db.row_count("User"), 4);
}

#[test]
fn delete_if_exists_requires_a_match() {
    let h = harness();
    seed_users(&h);

    let err = h
        .factory
        .query::<User>()
        .where_equal(UserFields::AGE, 1000)
        .delete_if_exists()
        .unwrap_err();
    assert!(err.is_expectation_violation());

    let removed = h
        .factory
        .query::<User>()
        .where_equal(UserFields::NAME, "Diana")
        .delete_if_exists()
        .unwrap();
    assert_eq!(removed, 1);
}

#[test]
fn delete_and_return_hands_back_the_removed_rows() {
    let h = harness();
    seed_users(&h);

    let removed = h
        .factory
        .query::<User>()
        .where_greater_than(UserFields::AGE, 29)
        .delete_and_return()
        .unwrap();

    let mut names: Vec<&str> = removed.iter().map(|u| u.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["Alice", "Charlie"]);
    assert_eq!(h.db.row_count("User"), 2);
}

#[test]
fn delete_and_flush_forces_a_flush() {
    let h = harness();
    seed_users(&h);

    let before = h.session.flush_count();
    let removed = h
        .factory
        .query::<User>()
        .where_equal(UserFields::NAME, "Bob")
        .delete_and_flush()
        .unwrap();

    assert_eq!(removed, 1);
    assert_eq!(h.session.flush_count(), before + 1);
}

#[test]
fn mutations_require_a_write_transaction() {
    let h = harness();
    seed_users(&h);

    let read_only = Rc::new(MemSession::read_only(Rc::clone(&h.db)));
    let factory = QueryFactory::new(Rc::clone(&read_only));

    let err = factory
        .query::<User>()
        .where_equal(UserFields::AGE, 30)
        .delete_bulk()
        .unwrap_err();
    assert!(matches!(
        err,
        HelixError::Runtime(RuntimeError::TransactionRequired)
    ));

    let mut transient = User::transient("Nobody", 1);
    let err = read_only.persist(&mut transient).unwrap_err();
    assert!(matches!(err, RuntimeError::TransactionRequired));

    // reads still work
    assert_eq!(factory.query::<User>().count().unwrap(), 4);
}
