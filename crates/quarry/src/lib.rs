pub mod db;
pub use db::Db;

mod engine;
pub use engine::Engine;

mod entity;
pub use entity::{EntityService, Payload};

mod relation;
pub use relation::RelationManager;

pub use quarry_core::{
    criteria, driver, schema, stmt, Criteria, Error, FieldCategory, Result, SchemaDescriptor,
};
