//! Entity service: CRUD surface and the column/relation payload split on
//! update.

use tests::*;

use pretty_assertions::assert_eq;
use quarry::criteria::Condition;
use quarry::stmt::{Related, Value};
use quarry::Criteria;
use quarry_driver_memory::Op;

#[tokio::test]
async fn create_assigns_ids_and_defaults() {
    let (db, _) = db();

    let users = db.entity("user").unwrap();
    let record = users
        .create(payload! { "name" => "Bob", "status" => "active", "age" => 30 })
        .await
        .unwrap();

    assert_eq!(record.get("id"), Some(&Value::from(1)));
    assert_eq!(record.get("group_id"), Some(&Value::Null));
}

#[tokio::test]
async fn find_one_missing_is_not_found() {
    let (db, _) = db();

    let err = db.entity("user").unwrap().find_one(1).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn pure_column_update_never_loads_the_row() {
    let (db, driver) = db();
    seed_users(&db).await;
    driver.clear_log();

    let users = db.entity("user").unwrap();
    let record = users
        .update(1, payload! { "status" => "dormant" })
        .await
        .unwrap();

    assert_eq!(record.get("status"), Some(&Value::from("dormant")));

    let log = driver.log();
    assert_eq!(log.loads("user"), 0, "pure-column payloads skip the row load");
    assert_eq!(log.saves("user"), 0);
    assert_eq!(
        log.column_updates("user"),
        vec![vec!["status".to_string()]]
    );
}

#[tokio::test]
async fn relation_update_takes_the_save_path() {
    let (db, driver) = db();
    seed_user_with_todos(&db).await;
    db.entity("todo")
        .unwrap()
        .create(payload! { "title" => "four", "done" => false })
        .await
        .unwrap();
    driver.clear_log();

    let users = db.entity("user").unwrap();
    users
        .update(1, payload! { "todos" => vec![Value::from(2), Value::from(4)] })
        .await
        .unwrap();

    let log = driver.log();
    assert_eq!(log.loads("user"), 1);
    assert_eq!(log.saves("user"), 1);
    assert!(log.column_updates("user").is_empty());

    let relation = db.relation("user", "todos").unwrap();
    let mut ids: Vec<_> = relation
        .find(1, &Criteria::new())
        .await
        .unwrap()
        .iter()
        .filter_map(|r| r.get("id").cloned())
        .collect();
    ids.sort_by_key(|id| id.as_i64());
    assert_eq!(ids, vec![Value::from(2), Value::from(4)]);
}

#[tokio::test]
async fn mixed_payload_updates_columns_first() {
    let (db, driver) = db();
    seed_user_with_todos(&db).await;
    driver.clear_log();

    let users = db.entity("user").unwrap();
    users
        .update(
            1,
            payload! {
                "status" => "dormant",
                "todos" => vec![Value::from(1)],
            },
        )
        .await
        .unwrap();

    let log = driver.log();
    let column_update = log
        .iter()
        .position(|op| matches!(op, Op::UpdateColumns { .. }))
        .expect("column update must be issued");
    let save = log
        .iter()
        .position(|op| matches!(op, Op::Save { .. }))
        .expect("save must be issued");
    assert!(column_update < save, "columns are written before relations");

    let record = users.find_one(1).await.unwrap();
    assert_eq!(record.get("status"), Some(&Value::from("dormant")));
}

#[tokio::test]
async fn to_one_relation_payload() {
    let (db, _) = db();
    seed_users(&db).await;
    db.entity("group")
        .unwrap()
        .create(payload! { "name" => "admins" })
        .await
        .unwrap();

    let users = db.entity("user").unwrap();
    let record = users
        .update(1, payload! { "group" => 1 })
        .await
        .unwrap();
    assert_eq!(record.get("group_id"), Some(&Value::from(1)));

    let record = users
        .update(1, payload! { "group" => Value::Null })
        .await
        .unwrap();
    assert_eq!(record.get("group_id"), Some(&Value::Null));
}

#[tokio::test]
async fn unknown_payload_key_is_rejected() {
    let (db, _) = db();
    seed_users(&db).await;

    let users = db.entity("user").unwrap();
    let err = users
        .update(1, payload! { "nickname" => "B" })
        .await
        .unwrap_err();

    assert!(err.is_validation());
}

#[tokio::test]
async fn update_missing_record_is_not_found() {
    let (db, _) = db();

    let users = db.entity("user").unwrap();
    let err = users
        .update(9, payload! { "status" => "x" })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn update_many_applies_to_all_matches() {
    let (db, _) = db();
    seed_users(&db).await;

    let users = db.entity("user").unwrap();
    let updated = users
        .update_many(
            &Criteria::new().filter(Condition::eq("status", "active")),
            payload! { "status" => "dormant" },
        )
        .await
        .unwrap();

    assert_eq!(updated, 2);
    assert_eq!(
        users
            .count(&Criteria::new().filter(Condition::eq("status", "dormant")))
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn soft_delete_and_restore() {
    let (db, _) = db();
    seed_users(&db).await;

    let users = db.entity("user").unwrap();
    users.remove(1).await.unwrap();

    // Gone from reads, but not destroyed.
    assert!(users.find_one(1).await.unwrap_err().is_not_found());
    assert_eq!(users.count(&Criteria::new()).await.unwrap(), 2);

    users.restore(1).await.unwrap();
    let record = users.find_one(1).await.unwrap();
    assert_eq!(record.get("name"), Some(&Value::from("Bob")));
    assert_eq!(users.count(&Criteria::new()).await.unwrap(), 3);
}

#[tokio::test]
async fn soft_deleted_children_leave_relations() {
    let (db, _) = db();
    seed_user_with_todos(&db).await;

    db.entity("todo").unwrap().remove(2).await.unwrap();

    let records = db
        .find("user", &Criteria::new().populate("todos"))
        .await
        .unwrap();
    let Some(Related::Many(todos)) = records[0].related("todos") else {
        panic!("todos must be populated");
    };
    assert_eq!(todos.len(), 2);
}

#[tokio::test]
async fn create_many() {
    let (db, _) = db();

    let tags = db.entity("tag").unwrap();
    let records = tags
        .create_many(vec![
            payload! { "label" => "vip" },
            payload! { "label" => "staff" },
        ])
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].get("id"), Some(&Value::from(2)));
}

#[tokio::test]
async fn create_with_relations() {
    let (db, _) = db();
    let groups = db.entity("group").unwrap();
    groups.create(payload! { "name" => "admins" }).await.unwrap();

    let users = db.entity("user").unwrap();
    let record = users
        .create(payload! {
            "name" => "Bob",
            "status" => "active",
            "age" => 30,
            "group" => 1,
        })
        .await
        .unwrap();

    let id = record.get("id").cloned().unwrap();
    let stored = users.find_one(id).await.unwrap();
    assert_eq!(stored.get("group_id"), Some(&Value::from(1)));
}
