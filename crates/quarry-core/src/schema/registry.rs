use super::{RelationKind, SchemaDescriptor};
use crate::{bail, Error, Result};

use indexmap::IndexMap;
use std::sync::Arc;

/// The set of schema descriptors a `Db` was built with, keyed by entity
/// name. Shared read-only with the driver.
#[derive(Debug, Default)]
pub struct Registry {
    entries: IndexMap<String, Arc<SchemaDescriptor>>,
}

impl Registry {
    pub fn insert(&mut self, schema: SchemaDescriptor) {
        self.entries.insert(schema.name().to_string(), Arc::new(schema));
    }

    pub fn get(&self, entity: &str) -> Option<&Arc<SchemaDescriptor>> {
        self.entries.get(entity)
    }

    /// Resolves an entity by name, failing when it was never registered.
    pub fn expect(&self, entity: &str) -> Result<&Arc<SchemaDescriptor>> {
        self.get(entity)
            .ok_or_else(|| Error::record_not_found(format!("entity `{entity}` is not registered")))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SchemaDescriptor>> {
        self.entries.values()
    }

    /// Validates cross-entity consistency: every relation target must be
    /// registered, and `HasMany` join keys must exist on the target side.
    pub fn verify(&self) -> Result<()> {
        for schema in self.entries.values() {
            for relation in schema.relations() {
                let Some(target) = self.entries.get(&relation.target) else {
                    bail!(
                        "schema `{}`: relation `{}` targets unregistered entity `{}`",
                        schema.name(),
                        relation.name,
                        relation.target
                    );
                };
                if relation.kind == RelationKind::HasMany
                    && !target.has_column(&relation.join_key)
                {
                    bail!(
                        "schema `{}`: relation `{}` joins on `{}.{}` which does not exist",
                        schema.name(),
                        relation.name,
                        relation.target,
                        relation.join_key
                    );
                }
                if let Some(inverse) = &relation.inverse {
                    if target.relation(inverse).is_none() {
                        bail!(
                            "schema `{}`: relation `{}` names inverse `{}` which `{}` does not declare",
                            schema.name(),
                            relation.name,
                            inverse,
                            relation.target
                        );
                    }
                }
            }
        }
        Ok(())
    }
}
