mod builder;
pub use builder::Builder;

mod column;
pub use column::{Column, ColumnType};

mod registry;
pub use registry::Registry;

mod relation;
pub use relation::{Relation, RelationKind};

use crate::{Error, Result};

use indexmap::IndexMap;

/// Read-only metadata about one entity type: its columns and its relations.
///
/// Constructed once (via [`Builder`]) and consumed by the query engine for
/// validation and compilation. The engine never mutates it.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    /// Entity name; also the storage-level table name.
    name: String,

    /// Name of the primary key column.
    primary_key: String,

    /// Valid leaf fields for where/sort/select/omit, in declaration order.
    columns: IndexMap<String, Column>,

    /// Relations by property name.
    relations: IndexMap<String, Relation>,
}

impl SchemaDescriptor {
    pub fn builder(name: impl Into<String>) -> Builder {
        Builder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    /// Resolves a relation by name, failing with the client-input error the
    /// criteria validation contract requires.
    pub fn expect_relation(&self, name: &str) -> Result<&Relation> {
        self.relation(name)
            .ok_or_else(|| Error::invalid_relation_reference(name))
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }
}
