mod common;

use chrono::{Duration, Utc};
use common::{harness, names, seed_users};
use helix::prelude::*;
use helix_testing_fixtures::{User, UserFields};

#[test]
fn now_relative_comparisons() {
    let h = harness();
    seed_users(&h);

    let mut veteran = User::seed(5, "Vera", 50).with_joined_at(Utc::now() - Duration::days(30));
    h.session.persist(&mut veteran).unwrap();
    let mut scheduled = User::seed(6, "Sam", 20).with_joined_at(Utc::now() + Duration::days(30));
    h.session.persist(&mut scheduled).unwrap();

    // seeded users carry no joined_at; null never satisfies either side
    let joined = h
        .factory
        .query::<User>()
        .where_before_now(UserFields::JOINED_AT)
        .list()
        .unwrap();
    assert_eq!(names(&joined), ["Vera"]);

    let upcoming = h
        .factory
        .query::<User>()
        .where_after_now(UserFields::JOINED_AT)
        .list()
        .unwrap();
    assert_eq!(names(&upcoming), ["Sam"]);
}

#[test]
fn explicit_temporal_bounds() {
    let h = harness();
    seed_users(&h);

    let pivot = Utc::now();
    let mut early = User::seed(5, "Early", 40).with_joined_at(pivot - Duration::days(2));
    h.session.persist(&mut early).unwrap();
    let mut late = User::seed(6, "Late", 40).with_joined_at(pivot + Duration::days(2));
    h.session.persist(&mut late).unwrap();

    let before = h
        .factory
        .query::<User>()
        .filter(UserFields::JOINED_AT.before(pivot))
        .list()
        .unwrap();
    assert_eq!(names(&before), ["Early"]);

    let on_or_after = h
        .factory
        .query::<User>()
        .filter(UserFields::JOINED_AT.on_or_after(pivot))
        .list()
        .unwrap();
    assert_eq!(names(&on_or_after), ["Late"]);

    let ordered = h
        .factory
        .query::<User>()
        .where_is_not_null(UserFields::JOINED_AT)
        .order_by_desc(UserFields::JOINED_AT)
        .list()
        .unwrap();
    assert_eq!(names(&ordered), ["Late", "Early"]);
}
