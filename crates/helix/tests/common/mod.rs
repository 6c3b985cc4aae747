//! Shared harness for the integration suites: a fresh in-memory
//! database, one read-write session, and a factory bound to it.

// not every suite uses every helper
#![allow(dead_code)]

use helix::mem::{MemDb, MemSession};
use helix::prelude::*;
use helix_testing_fixtures::{Department, Order, OrderStatus, User};
use std::rc::Rc;

pub struct Harness {
    pub db: Rc<MemDb>,
    pub session: Rc<MemSession>,
    pub factory: QueryFactory<MemSession>,
}

pub fn harness() -> Harness {
    let db = MemDb::shared();
    let session = Rc::new(MemSession::new(Rc::clone(&db)));
    let factory = QueryFactory::new(Rc::clone(&session));
    Harness {
        db,
        session,
        factory,
    }
}

/// The base population: `{Alice:30, Bob:25, Charlie:35, Diana:28}`,
/// Alice and Bob in Engineering, Charlie in Sales, Diana unassigned.
pub fn seed_users(h: &Harness) {
    let engineering = Department::seed(1, "Engineering");
    let sales = Department::seed(2, "Sales");

    let users = [
        User::seed(1, "Alice", 30).with_department(engineering.clone()),
        User::seed(2, "Bob", 25).with_department(engineering),
        User::seed(3, "Charlie", 35).with_department(sales),
        User::seed(4, "Diana", 28),
    ];
    for mut user in users {
        h.session.persist(&mut user).expect("seed user");
    }
}

/// Users 1..=3, each carrying `orders_per_user` orders.
pub fn seed_users_with_orders(h: &Harness, orders_per_user: i64) {
    for user_id in 1..=3 {
        let orders = (0..orders_per_user)
            .map(|n| {
                Order::seed(
                    user_id * 100 + n,
                    10.0 + n as f64,
                    OrderStatus::Open,
                )
            })
            .collect();
        let mut user =
            User::seed(user_id, &format!("user-{user_id}"), 20 + user_id as i32)
                .with_orders(orders);
        h.session.persist(&mut user).expect("seed user");
    }
}

pub fn names(users: &[User]) -> Vec<&str> {
    users.iter().map(|user| user.name.as_str()).collect()
}
