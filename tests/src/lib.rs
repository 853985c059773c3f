//! Shared fixtures for the integration suite: a four-entity schema
//! (groups, users, todos, tags) over the in-memory driver.

use quarry::schema::ColumnType;
use quarry::{Db, SchemaDescriptor};
use quarry_driver_memory::Memory;

/// Builds a `Db` over a fresh in-memory store. The driver handle is
/// returned alongside so tests can assert against its operation log.
pub fn db() -> (Db, Memory) {
    let driver = Memory::new();
    let db = Db::builder()
        .register(group_schema())
        .register(user_schema())
        .register(todo_schema())
        .register(tag_schema())
        .build(driver.clone())
        .unwrap();
    (db, driver)
}

pub fn group_schema() -> SchemaDescriptor {
    SchemaDescriptor::builder("group")
        .id("id")
        .column("name", ColumnType::Text)
        .has_many("members", "user", "group_id")
        .inverse("group")
        .build()
        .unwrap()
}

pub fn user_schema() -> SchemaDescriptor {
    SchemaDescriptor::builder("user")
        .id("id")
        .column("name", ColumnType::Text)
        .column("status", ColumnType::Text)
        .column("age", ColumnType::Integer)
        .nullable_column("group_id", ColumnType::Integer)
        .belongs_to("group", "group", "group_id")
        .inverse("members")
        .has_many("todos", "todo", "user_id")
        .inverse("user")
        .many_to_many("tags", "tag", "id")
        .build()
        .unwrap()
}

pub fn todo_schema() -> SchemaDescriptor {
    SchemaDescriptor::builder("todo")
        .id("id")
        .column("title", ColumnType::Text)
        .column("done", ColumnType::Bool)
        .nullable_column("user_id", ColumnType::Integer)
        .belongs_to("user", "user", "user_id")
        .inverse("todos")
        .build()
        .unwrap()
}

pub fn tag_schema() -> SchemaDescriptor {
    SchemaDescriptor::builder("tag")
        .id("id")
        .column("label", ColumnType::Text)
        .build()
        .unwrap()
}

/// Builds an entity payload from `"key" => value` pairs.
#[macro_export]
macro_rules! payload {
    ( $( $key:literal => $value:expr ),* $(,)? ) => {{
        #[allow(unused_mut)]
        let mut payload = quarry::Payload::new();
        $( payload.insert($key.to_string(), quarry::stmt::Value::from($value)); )*
        payload
    }};
}

/// Seeds the three users of the standard scenario: Bob and Amy are
/// active, Cy is not.
pub async fn seed_users(db: &Db) {
    let users = db.entity("user").unwrap();
    users
        .create(payload! { "name" => "Bob", "status" => "active", "age" => 30 })
        .await
        .unwrap();
    users
        .create(payload! { "name" => "Amy", "status" => "active", "age" => 22 })
        .await
        .unwrap();
    users
        .create(payload! { "name" => "Cy", "status" => "inactive", "age" => 41 })
        .await
        .unwrap();
}

/// Seeds one user (id 1) owning three todos (ids 1..=3).
pub async fn seed_user_with_todos(db: &Db) {
    let users = db.entity("user").unwrap();
    users
        .create(payload! { "name" => "Bob", "status" => "active", "age" => 30 })
        .await
        .unwrap();

    let todos = db.entity("todo").unwrap();
    for title in ["one", "two", "three"] {
        todos
            .create(payload! { "title" => title, "done" => false, "user_id" => 1 })
            .await
            .unwrap();
    }
}
