//! In-memory store driver.
//!
//! Implements the three driver capabilities over hash-map tables, with
//! structural predicate evaluation and an operation log that tests use to
//! assert driver-level behavior (mutation counts, load avoidance).

mod eval;

mod log;
pub use log::{Op, OpLog};

mod query;
use query::MemoryQuery;

mod relation;
use relation::MemoryRelation;

mod repository;
use repository::MemoryRepository;

mod store;
use store::Store;

use quarry_core::driver::{Driver, QueryBuilder, RelationOps, Repository};
use quarry_core::schema::{Registry, Relation};
use quarry_core::stmt::Value;
use quarry_core::{Result, SchemaDescriptor};

use std::sync::Arc;

/// An in-memory store. Cloning shares the underlying tables, so a test
/// can keep a handle for log assertions while the `Db` owns another.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    store: Arc<Store>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every operation issued against the store so far.
    pub fn log(&self) -> OpLog {
        self.store.log_snapshot()
    }

    pub fn clear_log(&self) {
        self.store.clear_log();
    }
}

impl Driver for Memory {
    fn register_schemas(&self, schemas: Arc<Registry>) -> Result<()> {
        self.store.register(schemas);
        Ok(())
    }

    fn query(&self, schema: &SchemaDescriptor) -> Box<dyn QueryBuilder> {
        Box::new(MemoryQuery::new(self.store.clone(), schema.clone()))
    }

    fn relation(
        &self,
        schema: &SchemaDescriptor,
        relation: &Relation,
        parent_id: Value,
    ) -> Box<dyn RelationOps> {
        Box::new(MemoryRelation::new(
            self.store.clone(),
            schema.clone(),
            relation.clone(),
            parent_id,
        ))
    }

    fn repository(&self, schema: &SchemaDescriptor) -> Box<dyn Repository> {
        Box::new(MemoryRepository::new(self.store.clone(), schema.clone()))
    }
}
