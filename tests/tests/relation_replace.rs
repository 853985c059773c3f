//! Replace semantics: id coercion, all-or-nothing validation, delta
//! minimization for one-to-many, full-set replace for many-to-many.

use tests::*;

use pretty_assertions::assert_eq;
use quarry::stmt::{Related, Value};
use quarry::Criteria;
use quarry_driver_memory::Op;

#[tokio::test]
async fn replace_is_all_or_nothing() {
    let (db, driver) = db();
    seed_user_with_todos(&db).await;

    let relation = db.relation("user", "todos").unwrap();
    let before = relation.find(1, &Criteria::new()).await.unwrap();
    driver.clear_log();

    // Todo 99 does not exist: fail without touching anything.
    let err = relation
        .replace(1, vec![Value::from(2), Value::from(99)])
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "record not found: 1 of 2 requested `todo` records missing");
    assert_eq!(driver.log().relation_mutations("todos"), 0);

    let after = relation.find(1, &Criteria::new()).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn one_to_many_replace_writes_minimal_deltas() {
    let (db, driver) = db();
    seed_user_with_todos(&db).await;
    let todos = db.entity("todo").unwrap();
    todos
        .create(payload! { "title" => "four", "done" => false })
        .await
        .unwrap();
    driver.clear_log();

    // Existing [1, 2, 3], requested [2, 3, 4]: exactly one remove([1])
    // and one add([4]); 2 and 3 are never touched.
    let relation = db.relation("user", "todos").unwrap();
    let parent = relation
        .replace(1, vec![Value::from(2), Value::from(3), Value::from(4)])
        .await
        .unwrap();

    let log = driver.log();
    assert_eq!(log.relation_removes("todos"), vec![vec![Value::from(1)]]);
    assert_eq!(log.relation_adds("todos"), vec![vec![Value::from(4)]]);
    assert_eq!(log.relation_mutations("todos"), 2);

    let Some(Related::Many(children)) = parent.related("todos") else {
        panic!("todos must be populated on the returned parent");
    };
    let mut ids: Vec<_> = children.iter().filter_map(|c| c.get("id").cloned()).collect();
    ids.sort_by_key(|id| id.as_i64());
    assert_eq!(ids, vec![Value::from(2), Value::from(3), Value::from(4)]);
}

#[tokio::test]
async fn replace_with_unchanged_set_writes_nothing() {
    let (db, driver) = db();
    seed_user_with_todos(&db).await;
    driver.clear_log();

    let relation = db.relation("user", "todos").unwrap();
    relation
        .replace(1, vec![Value::from(1), Value::from(2), Value::from(3)])
        .await
        .unwrap();

    assert_eq!(driver.log().relation_mutations("todos"), 0);
}

#[tokio::test]
async fn empty_list_clears_the_relation() {
    let (db, _) = db();
    seed_user_with_todos(&db).await;

    let relation = db.relation("user", "todos").unwrap();
    let parent = relation.replace(1, vec![]).await.unwrap();

    let Some(Related::Many(children)) = parent.related("todos") else {
        panic!("todos must be populated on the returned parent");
    };
    assert!(children.is_empty());

    // Detached, not deleted.
    let todo = db.entity("todo").unwrap().find_one(1).await.unwrap();
    assert_eq!(todo.get("user_id"), Some(&Value::Null));
}

#[tokio::test]
async fn ids_are_coerced_and_deduplicated() {
    let (db, driver) = db();
    seed_user_with_todos(&db).await;
    driver.clear_log();

    let relation = db.relation("user", "todos").unwrap();
    // Duplicate 2 and a non-numeric entry: both dropped before
    // validation, so the requested set is exactly {2}.
    relation
        .replace(
            1,
            vec![
                Value::from(2),
                Value::from("bogus"),
                Value::from(2),
            ],
        )
        .await
        .unwrap();

    let log = driver.log();
    assert_eq!(
        log.relation_removes("todos"),
        vec![vec![Value::from(1), Value::from(3)]]
    );
    assert_eq!(log.relation_adds("todos"), Vec::<Vec<Value>>::new());
}

#[tokio::test]
async fn many_to_many_replace_is_a_single_set() {
    let (db, driver) = db();
    seed_users(&db).await;
    let tags = db.entity("tag").unwrap();
    for label in ["vip", "staff", "beta"] {
        tags.create(payload! { "label" => label }).await.unwrap();
    }

    let relation = db.relation("user", "tags").unwrap();
    relation.add(1, 1).await.unwrap();
    driver.clear_log();

    let parent = relation
        .replace(1, vec![Value::from(2), Value::from(3)])
        .await
        .unwrap();

    // One full-set write, no per-id deltas.
    let log = driver.log();
    assert_eq!(log.relation_mutations("tags"), 1);
    assert!(log
        .iter()
        .any(|op| matches!(op, Op::RelationSet { relation, .. } if relation == "tags")));

    let Some(Related::Many(linked)) = parent.related("tags") else {
        panic!("tags must be populated on the returned parent");
    };
    let labels: Vec<_> = linked.iter().filter_map(|t| t.get("label")).collect();
    assert_eq!(labels, vec![&Value::from("staff"), &Value::from("beta")]);
}

#[tokio::test]
async fn to_one_replace_takes_first_id() {
    let (db, _) = db();
    seed_user_with_todos(&db).await;

    let relation = db.relation("todo", "user").unwrap();
    let todo = relation.replace(2, vec![Value::from(1)]).await.unwrap();
    assert_eq!(todo.get("user_id"), Some(&Value::from(1)));

    let todo = relation.replace(2, vec![]).await.unwrap();
    assert_eq!(todo.get("user_id"), Some(&Value::Null));
    assert!(matches!(todo.related("user"), Some(Related::One(None))));
}

#[tokio::test]
async fn replace_requires_parent() {
    let (db, _) = db();
    seed_user_with_todos(&db).await;

    let relation = db.relation("user", "todos").unwrap();
    let err = relation.replace(99, vec![Value::from(1)]).await.unwrap_err();
    assert!(err.is_not_found());
}
