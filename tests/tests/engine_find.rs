//! Criteria query execution: filtering, logical composition, sorting,
//! projection, pagination, population and foreign-key reconciliation.

use tests::*;

use pretty_assertions::assert_eq;
use quarry::criteria::{parse, Condition, Operator};
use quarry::stmt::{Direction, Related, Value};
use quarry::Criteria;

#[tokio::test]
async fn filter_sort_limit_scenario() {
    let (db, _) = db();
    seed_users(&db).await;

    let criteria = Criteria::new()
        .filter(Condition::eq("status", "active"))
        .sort("name", Direction::Asc)
        .limit(2);

    let records = db.find("user", &criteria).await.unwrap();

    let names: Vec<_> = records
        .iter()
        .map(|r| (r.get("id").cloned().unwrap(), r.get("name").cloned().unwrap()))
        .collect();
    assert_eq!(
        names,
        vec![
            (Value::from(2), Value::from("Amy")),
            (Value::from(1), Value::from("Bob")),
        ]
    );
}

#[tokio::test]
async fn or_groups_compose() {
    let (db, _) = db();
    seed_users(&db).await;

    // Amy matches the first branch, Cy the second, Bob neither.
    let criteria = Criteria::new().filter(Condition::or(vec![
        Condition::eq("name", "Amy"),
        Condition::cmp("age", Operator::Gt, 40),
    ]));

    let records = db.find("user", &criteria).await.unwrap();
    let names: Vec<_> = records.iter().filter_map(|r| r.get("name")).collect();
    assert_eq!(names, vec![&Value::from("Amy"), &Value::from("Cy")]);
}

#[tokio::test]
async fn nested_and_inside_or_keeps_precedence() {
    let (db, _) = db();
    seed_users(&db).await;

    let criteria = Criteria::new().filter(Condition::or(vec![
        Condition::and(vec![
            Condition::eq("status", "active"),
            Condition::cmp("age", Operator::Lt, 25),
        ]),
        Condition::eq("name", "Cy"),
    ]));

    let records = db.find("user", &criteria).await.unwrap();
    let names: Vec<_> = records.iter().filter_map(|r| r.get("name")).collect();
    assert_eq!(names, vec![&Value::from("Amy"), &Value::from("Cy")]);
}

#[tokio::test]
async fn text_operators() {
    let (db, _) = db();
    seed_users(&db).await;

    let records = db
        .find(
            "user",
            &Criteria::new().filter(Condition::cmp("name", Operator::StartsWith, "B")),
        )
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("name"), Some(&Value::from("Bob")));

    let count = db
        .count(
            "user",
            &Criteria::new().filter(Condition::cmp("name", Operator::Contains, "y")),
        )
        .await
        .unwrap();
    assert_eq!(count, 2); // Amy, Cy
}

#[tokio::test]
async fn membership_operators() {
    let (db, _) = db();
    seed_users(&db).await;

    let records = db
        .find(
            "user",
            &Criteria::new().filter(Condition::in_list("id", vec![1i64, 3])),
        )
        .await
        .unwrap();
    assert_eq!(records.len(), 2);

    let records = db
        .find(
            "user",
            &Criteria::new().filter(Condition::cmp("id", Operator::NotIn, vec![1i64, 3])),
        )
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("name"), Some(&Value::from("Amy")));
}

#[tokio::test]
async fn projection_always_carries_primary_key() {
    let (db, _) = db();
    seed_users(&db).await;

    let records = db
        .find("user", &Criteria::new().select(["name"]))
        .await
        .unwrap();

    for record in &records {
        assert!(record.contains("id"), "primary key must be projected");
        assert!(record.contains("name"));
        assert!(!record.contains("status"), "unselected columns stay out");
    }
}

#[tokio::test]
async fn omit_drops_columns() {
    let (db, _) = db();
    seed_users(&db).await;

    let records = db
        .find("user", &Criteria::new().omit(["status", "age"]))
        .await
        .unwrap();

    for record in &records {
        assert!(record.contains("id"));
        assert!(record.contains("name"));
        assert!(!record.contains("status"));
        assert!(!record.contains("age"));
    }
}

#[tokio::test]
async fn skip_and_limit_paginate() {
    let (db, _) = db();
    seed_users(&db).await;

    let criteria = Criteria::new().sort("name", Direction::Asc).skip(1).limit(1);
    let records = db.find("user", &criteria).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("name"), Some(&Value::from("Bob")));
}

#[tokio::test]
async fn multi_key_sort_is_stable() {
    let (db, _) = db();
    let users = db.entity("user").unwrap();
    for (name, status, age) in [
        ("Dee", "active", 30),
        ("Abe", "active", 30),
        ("Eve", "active", 20),
    ] {
        users
            .create(payload! { "name" => name, "status" => status, "age" => age })
            .await
            .unwrap();
    }

    let criteria = Criteria::new()
        .sort("age", Direction::Desc)
        .sort("name", Direction::Asc);
    let records = db.find("user", &criteria).await.unwrap();

    let names: Vec<_> = records.iter().filter_map(|r| r.get("name")).collect();
    assert_eq!(
        names,
        vec![&Value::from("Abe"), &Value::from("Dee"), &Value::from("Eve")]
    );
}

#[tokio::test]
async fn populate_belongs_to() {
    let (db, _) = db();
    seed_user_with_todos(&db).await;

    let records = db
        .find("todo", &Criteria::new().populate("user"))
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
    for record in &records {
        let Some(Related::One(Some(user))) = record.related("user") else {
            panic!("user relation must be populated");
        };
        assert_eq!(user.get("name"), Some(&Value::from("Bob")));
    }
}

#[tokio::test]
async fn populate_has_many() {
    let (db, _) = db();
    seed_user_with_todos(&db).await;

    let records = db
        .find("user", &Criteria::new().populate("todos"))
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    let Some(Related::Many(todos)) = records[0].related("todos") else {
        panic!("todos relation must be populated");
    };
    assert_eq!(todos.len(), 3);
}

#[tokio::test]
async fn reconciliation_repairs_stripped_foreign_key() {
    let (db, _) = db();
    seed_user_with_todos(&db).await;

    // `user_id` is excluded from the projection, but the relation is
    // populated: the raw row still carries the key and it must come back.
    let criteria = Criteria::new().select(["title"]).populate("user");
    let records = db.find("todo", &criteria).await.unwrap();

    for record in &records {
        assert_eq!(record.get("user_id"), Some(&Value::from(1)));
        assert!(matches!(record.related("user"), Some(Related::One(Some(_)))));
    }
}

#[tokio::test]
async fn count_ignores_sort_projection_and_pagination() {
    let (db, _) = db();
    seed_users(&db).await;

    let criteria = Criteria::new()
        .filter(Condition::eq("status", "active"))
        .sort("name", Direction::Asc)
        .select(["name"])
        .limit(1)
        .skip(1)
        .populate("todos");

    assert_eq!(db.count("user", &criteria).await.unwrap(), 2);
}

#[tokio::test]
async fn wire_criteria_end_to_end() {
    let (db, _) = db();
    seed_users(&db).await;

    let criteria = parse::Wire {
        filter: Some(r#"{"or": [{"status": "active"}, {"age": {">": 25}}]}"#),
        sort: Some("name DESC"),
        select: Some("name, status"),
        ..parse::Wire::default()
    }
    .parse()
    .unwrap();

    let records = db.find("user", &criteria).await.unwrap();
    let names: Vec<_> = records.iter().filter_map(|r| r.get("name")).collect();
    assert_eq!(
        names,
        vec![&Value::from("Cy"), &Value::from("Bob"), &Value::from("Amy")]
    );
}
