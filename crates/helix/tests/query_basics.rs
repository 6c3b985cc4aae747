mod common;

use common::{harness, names, seed_users};
use helix::prelude::*;
use helix_testing_fixtures::{User, UserFields};

#[test]
fn equality_returns_the_matching_row() {
    let h = harness();
    seed_users(&h);

    let result = h
        .factory
        .query::<User>()
        .where_equal(UserFields::NAME, "Alice")
        .list()
        .unwrap();

    assert_eq!(names(&result), ["Alice"]);
    assert_eq!(result[0].age, 30);
}

#[test]
fn ordering_by_age_ascending() {
    let h = harness();
    seed_users(&h);

    let result = h
        .factory
        .query::<User>()
        .order_by_asc(UserFields::AGE)
        .list()
        .unwrap();

    assert_eq!(names(&result), ["Bob", "Diana", "Alice", "Charlie"]);
}

#[test]
fn ordering_descending_with_secondary_key() {
    let h = harness();
    seed_users(&h);

    let result = h
        .factory
        .query::<User>()
        .order_by([UserFields::ACTIVE.desc(), UserFields::AGE.asc()])
        .list()
        .unwrap();

    assert_eq!(names(&result), ["Bob", "Diana", "Alice", "Charlie"]);
}

#[test]
fn null_filter_values_are_no_ops() {
    let h = harness();
    seed_users(&h);

    let unfiltered = h.factory.query::<User>().list().unwrap();
    let with_null = h
        .factory
        .query::<User>()
        .where_equal::<_, &str>(UserFields::NAME, None)
        .where_greater_than::<_, i32>(UserFields::AGE, None)
        .list()
        .unwrap();

    assert_eq!(unfiltered.len(), 4);
    assert_eq!(with_null.len(), unfiltered.len());
}

#[test]
fn where_in_matches_membership_and_ignores_empty_collections() {
    let h = harness();
    seed_users(&h);

    let some = h
        .factory
        .query::<User>()
        .where_in(UserFields::AGE, [25, 28])
        .order_by_asc(UserFields::AGE)
        .list()
        .unwrap();
    assert_eq!(names(&some), ["Bob", "Diana"]);

    let empty_in = h
        .factory
        .query::<User>()
        .where_in(UserFields::AGE, Vec::<i32>::new())
        .list()
        .unwrap();
    assert_eq!(empty_in.len(), 4);
}

#[test]
fn always_true_and_always_false() {
    let h = harness();
    seed_users(&h);

    let all = h
        .factory
        .query::<User>()
        .filter(Predicate::always_true())
        .list()
        .unwrap();
    assert_eq!(all.len(), 4);

    let none = h
        .factory
        .query::<User>()
        .filter(Predicate::always_false())
        .list()
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn count_matches_list_length_and_exists() {
    let h = harness();
    seed_users(&h);

    let q = || {
        h.factory
            .query::<User>()
            .where_greater_than(UserFields::AGE, 27)
    };
    assert_eq!(q().count().unwrap(), q().list().unwrap().len() as u64);
    assert!(q().exists().unwrap());
    assert!(
        !h.factory
            .query::<User>()
            .where_greater_than(UserFields::AGE, 99)
            .exists()
            .unwrap()
    );
}

#[test]
fn comparison_sugar_and_between() {
    let h = harness();
    seed_users(&h);

    let windowed = h
        .factory
        .query::<User>()
        .filter(UserFields::AGE.between(26, 31))
        .order_by_asc(UserFields::AGE)
        .list()
        .unwrap();
    assert_eq!(names(&windowed), ["Diana", "Alice"]);

    let lower = h
        .factory
        .query::<User>()
        .where_less_than_or_equal(UserFields::AGE, 25)
        .list()
        .unwrap();
    assert_eq!(names(&lower), ["Bob"]);
}

#[test]
fn or_mirrors_add_disjuncts() {
    let h = harness();
    seed_users(&h);

    let result = h
        .factory
        .query::<User>()
        .where_equal(UserFields::NAME, "Bob")
        .or_equal(UserFields::NAME, "Diana")
        .order_by_asc(UserFields::NAME)
        .list()
        .unwrap();

    assert_eq!(names(&result), ["Bob", "Diana"]);
}

#[test]
fn where_group_builds_nested_predicates() {
    let h = harness();
    seed_users(&h);

    // age > 26 AND (name = Alice OR name = Bob)
    let result = h
        .factory
        .query::<User>()
        .where_greater_than(UserFields::AGE, 26)
        .where_group(|g| {
            g.or(UserFields::NAME.eq("Alice"))
                .or(UserFields::NAME.eq("Bob"));
        })
        .list()
        .unwrap();

    assert_eq!(names(&result), ["Alice"]);
}

#[test]
fn where_all_of_and_any_of_ignore_missing_entries() {
    let h = harness();
    seed_users(&h);

    let result = h
        .factory
        .query::<User>()
        .where_all_of([
            Some(UserFields::AGE.gt(24)),
            None,
            UserFields::NAME.eq_opt(Some("Bob")),
        ])
        .list()
        .unwrap();
    assert_eq!(names(&result), ["Bob"]);

    let any = h
        .factory
        .query::<User>()
        .where_any_of([None, UserFields::NAME.eq_opt(Some("Diana"))])
        .list()
        .unwrap();
    assert_eq!(names(&any), ["Diana"]);
}

#[test]
fn when_applies_conditionally() {
    let h = harness();
    seed_users(&h);

    let narrow = true;
    let result = h
        .factory
        .query::<User>()
        .when(narrow, |q| q.where_equal(UserFields::NAME, "Charlie"))
        .when(false, |q| q.where_equal(UserFields::NAME, "Alice"))
        .list()
        .unwrap();

    assert_eq!(names(&result), ["Charlie"]);
}

#[test]
fn limit_and_offset_window_results() {
    let h = harness();
    seed_users(&h);

    let window = h
        .factory
        .query::<User>()
        .order_by_asc(UserFields::AGE)
        .offset(1)
        .limit(2)
        .list()
        .unwrap();

    assert_eq!(names(&window), ["Diana", "Alice"]);
}
