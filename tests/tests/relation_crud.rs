//! Association manager: add/remove semantics, idempotence, existence
//! checks, and association-scoped find/count.

use tests::*;

use pretty_assertions::assert_eq;
use quarry::criteria::Condition;
use quarry::stmt::{Related, Value};
use quarry::Criteria;
use quarry_driver_memory::Op;

#[tokio::test]
async fn unknown_relation_fails_at_construction() {
    let (db, _) = db();

    let err = db.relation("user", "friends").unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "unknown relation `friends`");
}

#[tokio::test]
async fn add_attaches_and_returns_hydrated_parent() {
    let (db, _) = db();
    seed_user_with_todos(&db).await;
    let todos = db.entity("todo").unwrap();
    todos
        .create(payload! { "title" => "four", "done" => false })
        .await
        .unwrap();

    let relation = db.relation("user", "todos").unwrap();
    let parent = relation.add(1, 4).await.unwrap();

    let Some(Related::Many(children)) = parent.related("todos") else {
        panic!("todos must be populated on the returned parent");
    };
    assert_eq!(children.len(), 4);
}

#[tokio::test]
async fn add_is_idempotent() {
    let (db, driver) = db();
    seed_user_with_todos(&db).await;
    driver.clear_log();

    let relation = db.relation("user", "todos").unwrap();
    let first = relation.add(1, 2).await.unwrap();
    let second = relation.add(1, 2).await.unwrap();

    // Attached already: exactly zero mutations, and both calls return an
    // equivalent hydrated parent.
    assert_eq!(driver.log().relation_mutations("todos"), 0);
    assert_eq!(first, second);

    // A genuinely new child mutates exactly once.
    let todos = db.entity("todo").unwrap();
    todos
        .create(payload! { "title" => "four", "done" => false })
        .await
        .unwrap();
    driver.clear_log();
    relation.add(1, 4).await.unwrap();
    relation.add(1, 4).await.unwrap();
    assert_eq!(driver.log().relation_mutations("todos"), 1);
    assert_eq!(driver.log().relation_adds("todos"), vec![vec![Value::from(4)]]);
}

#[tokio::test]
async fn add_requires_parent_and_child() {
    let (db, _) = db();
    seed_user_with_todos(&db).await;

    let relation = db.relation("user", "todos").unwrap();

    let err = relation.add(99, 1).await.unwrap_err();
    assert!(err.is_not_found());

    let err = relation.add(1, 99).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn add_sets_to_one_relation() {
    let (db, _) = db();
    seed_user_with_todos(&db).await;

    let relation = db.relation("todo", "user").unwrap();
    let todo = relation.add(1, 1).await.unwrap();

    assert_eq!(todo.get("user_id"), Some(&Value::from(1)));
    assert!(matches!(todo.related("user"), Some(Related::One(Some(_)))));
}

#[tokio::test]
async fn remove_detaches_without_deleting() {
    let (db, _) = db();
    seed_user_with_todos(&db).await;

    let relation = db.relation("user", "todos").unwrap();
    let parent = relation.remove(1, 2).await.unwrap();

    let Some(Related::Many(children)) = parent.related("todos") else {
        panic!("todos must be populated on the returned parent");
    };
    assert_eq!(children.len(), 2);

    // The detached todo still exists.
    let todo = db.entity("todo").unwrap().find_one(2).await.unwrap();
    assert_eq!(todo.get("title"), Some(&Value::from("two")));
    assert_eq!(todo.get("user_id"), Some(&Value::Null));
}

#[tokio::test]
async fn remove_clears_to_one_relation() {
    let (db, _) = db();
    seed_user_with_todos(&db).await;

    let relation = db.relation("todo", "user").unwrap();
    let todo = relation.remove(2, 1).await.unwrap();

    assert_eq!(todo.get("user_id"), Some(&Value::Null));
    assert!(matches!(todo.related("user"), Some(Related::One(None))));

    // The former parent survives.
    db.entity("user").unwrap().find_one(1).await.unwrap();
}

#[tokio::test]
async fn find_scopes_criteria_to_membership() {
    let (db, _) = db();
    seed_user_with_todos(&db).await;

    // A todo owned by nobody must never show up.
    db.entity("todo")
        .unwrap()
        .create(payload! { "title" => "stray", "done" => false })
        .await
        .unwrap();

    let relation = db.relation("user", "todos").unwrap();
    let records = relation.find(1, &Criteria::new()).await.unwrap();
    assert_eq!(records.len(), 3);

    let records = relation
        .find(
            1,
            &Criteria::new().filter(Condition::eq("title", "two")),
        )
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("title"), Some(&Value::from("two")));
}

#[tokio::test]
async fn empty_relation_short_circuits() {
    let (db, driver) = db();
    let users = db.entity("user").unwrap();
    users
        .create(payload! { "name" => "Bob", "status" => "active", "age" => 30 })
        .await
        .unwrap();
    driver.clear_log();

    let relation = db.relation("user", "todos").unwrap();
    let records = relation.find(1, &Criteria::new()).await.unwrap();
    assert!(records.is_empty());

    // The membership read happened, but no child query was issued.
    let log = driver.log();
    assert!(log
        .iter()
        .any(|op| matches!(op, Op::RelationLoad { relation, .. } if relation == "todos")));
    assert!(!log
        .iter()
        .any(|op| matches!(op, Op::Query { entity } if entity == "todo")));
}

#[tokio::test]
async fn count_associations() {
    let (db, _) = db();
    seed_user_with_todos(&db).await;

    let relation = db.relation("user", "todos").unwrap();
    assert_eq!(relation.count(1, &Criteria::new()).await.unwrap(), 3);
    assert_eq!(
        relation
            .count(1, &Criteria::new().filter(Condition::eq("title", "two")))
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn find_requires_parent() {
    let (db, _) = db();
    seed_user_with_todos(&db).await;

    let relation = db.relation("user", "todos").unwrap();
    let err = relation.find(99, &Criteria::new()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn many_to_many_add_and_find() {
    let (db, _) = db();
    seed_users(&db).await;
    let tags = db.entity("tag").unwrap();
    tags.create(payload! { "label" => "vip" }).await.unwrap();
    tags.create(payload! { "label" => "staff" }).await.unwrap();

    let relation = db.relation("user", "tags").unwrap();
    relation.add(1, 1).await.unwrap();
    let parent = relation.add(1, 2).await.unwrap();

    let Some(Related::Many(linked)) = parent.related("tags") else {
        panic!("tags must be populated on the returned parent");
    };
    assert_eq!(linked.len(), 2);

    assert_eq!(relation.count(1, &Criteria::new()).await.unwrap(), 2);
    // Other users are untouched.
    assert_eq!(relation.count(2, &Criteria::new()).await.unwrap(), 0);
}
