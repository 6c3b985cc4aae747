mod common;

use common::{harness, names, seed_users};
use helix::prelude::*;
use helix_testing_fixtures::{User, UserFields};

#[test]
fn contains_is_immune_to_wildcard_injection() {
    let h = harness();
    seed_users(&h);
    let mut tricky = User::seed(5, "100%_User", 40);
    h.session.persist(&mut tricky).unwrap();

    // only the literal percent matches
    let percent = h
        .factory
        .query::<User>()
        .where_contains(UserFields::NAME, "%")
        .list()
        .unwrap();
    assert_eq!(names(&percent), ["100%_User"]);

    let underscore = h
        .factory
        .query::<User>()
        .where_contains(UserFields::NAME, "_")
        .list()
        .unwrap();
    assert_eq!(names(&underscore), ["100%_User"]);

    let no_match = h
        .factory
        .query::<User>()
        .where_contains(UserFields::NAME, "%x%")
        .list()
        .unwrap();
    assert!(no_match.is_empty());
}

#[test]
fn contains_matches_plain_substrings() {
    let h = harness();
    seed_users(&h);

    let result = h
        .factory
        .query::<User>()
        .where_contains(UserFields::NAME, "li")
        .order_by_asc(UserFields::NAME)
        .list()
        .unwrap();

    assert_eq!(names(&result), ["Alice", "Charlie"]);
}

#[test]
fn starts_with_and_ends_with() {
    let h = harness();
    seed_users(&h);

    let starts = h
        .factory
        .query::<User>()
        .filter(UserFields::NAME.starts_with("Ch"))
        .list()
        .unwrap();
    assert_eq!(names(&starts), ["Charlie"]);

    let ends = h
        .factory
        .query::<User>()
        .filter(UserFields::NAME.ends_with("a"))
        .order_by_asc(UserFields::NAME)
        .list()
        .unwrap();
    assert_eq!(names(&ends), ["Diana"]);
}

#[test]
fn raw_like_keeps_caller_wildcards() {
    let h = harness();
    seed_users(&h);

    let result = h
        .factory
        .query::<User>()
        .where_like(UserFields::NAME, "%li%")
        .order_by_asc(UserFields::NAME)
        .list()
        .unwrap();

    assert_eq!(names(&result), ["Alice", "Charlie"]);
}

#[test]
fn case_insensitive_equality() {
    let h = harness();
    seed_users(&h);

    let result = h
        .factory
        .query::<User>()
        .filter(UserFields::NAME.eq_ignore_case("aLiCe"))
        .list()
        .unwrap();

    assert_eq!(names(&result), ["Alice"]);
}

#[test]
fn blank_checks_cover_null_and_empty() {
    let h = harness();
    seed_users(&h);
    let mut empty_email = User::seed(5, "Eve", 22).with_email("");
    h.session.persist(&mut empty_email).unwrap();
    let mut with_email = User::seed(6, "Frank", 23).with_email("frank@example.com");
    h.session.persist(&mut with_email).unwrap();

    // the four seeded users carry no email at all
    let blank = h
        .factory
        .query::<User>()
        .filter(UserFields::EMAIL.is_blank())
        .list()
        .unwrap();
    assert_eq!(blank.len(), 5);

    let not_blank = h
        .factory
        .query::<User>()
        .filter(UserFields::EMAIL.is_not_blank())
        .list()
        .unwrap();
    assert_eq!(names(&not_blank), ["Frank"]);
}

#[test]
fn embedded_attributes_filter_with_dotted_paths() {
    let h = harness();
    seed_users(&h);
    let mut mover = User::seed(7, "Grace", 31).with_city("Shelbyville");
    h.session.persist(&mut mover).unwrap();

    let result = h
        .factory
        .query::<User>()
        .where_equal(UserFields::ADDRESS_CITY, "Shelbyville")
        .list()
        .unwrap();

    assert_eq!(names(&result), ["Grace"]);
}
