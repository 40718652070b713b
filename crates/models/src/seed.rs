//! Bundled fixture data loaded into an empty mock store.

use crate::part::{Part, Replaced};
use crate::record::{Record, STATUS_COMPLETED};
use crate::user::User;

pub fn seed_users() -> Vec<User> {
    vec![
        User {
            id: "1".into(),
            name: "Admin User".into(),
            email: "admin@example.com".into(),
            password: "password".into(),
        },
        User {
            id: "2".into(),
            name: "tj".into(),
            email: "tj@example.com".into(),
            password: "123456".into(),
        },
    ]
}

fn seed_part(part_type: &str, replaced: Replaced, cost: f64) -> Part {
    Part {
        part_type: part_type.into(),
        replaced,
        brand_name: String::new(),
        supplier: String::new(),
        manufacture_date: String::new(),
        expiry_date: String::new(),
        change_date: String::new(),
        cost,
    }
}

pub fn seed_records() -> Vec<Record> {
    vec![
        Record {
            id: "1".into(),
            driver_name: "Tj".into(),
            car_plate: "54212".into(),
            car_model: "Lexus".into(),
            parts_count: 2,
            total_cost: 90.0,
            date: "2025-11-01".into(),
            status: STATUS_COMPLETED.into(),
            parts: vec![
                seed_part("Battery", Replaced::No, 50.0),
                seed_part("Air Filter", Replaced::No, 40.0),
            ],
        },
        Record {
            id: "2".into(),
            driver_name: "Tj".into(),
            car_plate: "42233".into(),
            car_model: "Toyota".into(),
            parts_count: 1,
            total_cost: 70.0,
            date: "2025-11-03".into(),
            status: STATUS_COMPLETED.into(),
            parts: vec![seed_part("Air Filter", Replaced::Yes, 70.0)],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_records_are_consistent() {
        for r in seed_records() {
            r.check_consistency().unwrap();
        }
        assert_eq!(seed_users().len(), 2);
    }
}
