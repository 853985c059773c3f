mod query;
pub use query::{Executed, QueryBuilder, RawRow};

mod relation;
pub use relation::RelationOps;

mod repository;
pub use repository::Repository;

use crate::schema::{Registry, Relation, SchemaDescriptor};
use crate::stmt::Value;
use crate::Result;

use std::{fmt::Debug, sync::Arc};

/// A store driver.
///
/// The engine never talks to a store directly; it asks the driver for
/// per-call capability objects: a [`QueryBuilder`] for reads, a
/// [`RelationOps`] scoped to one relation of one parent record for
/// association work, and a [`Repository`] for plain row writes.
pub trait Driver: Debug + Send + Sync + 'static {
    /// Shares the registered schema set with the driver. Called once,
    /// when the `Db` is built.
    fn register_schemas(&self, schemas: Arc<Registry>) -> Result<()>;

    /// Starts a query against one entity.
    fn query(&self, schema: &SchemaDescriptor) -> Box<dyn QueryBuilder>;

    /// Scopes relation operations to `(entity, relation, parent id)`.
    fn relation(
        &self,
        schema: &SchemaDescriptor,
        relation: &Relation,
        parent_id: Value,
    ) -> Box<dyn RelationOps>;

    /// Plain row-level operations for one entity.
    fn repository(&self, schema: &SchemaDescriptor) -> Box<dyn Repository>;
}
