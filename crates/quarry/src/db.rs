mod builder;
pub use builder::Builder;

use crate::{Engine, EntityService, RelationManager, Result};

use quarry_core::driver::Driver;
use quarry_core::schema::Registry;
use quarry_core::stmt::Record;
use quarry_core::{Criteria, SchemaDescriptor};

use std::sync::Arc;

/// Shared state between all `Db` clones.
pub(crate) struct Shared {
    pub(crate) driver: Arc<dyn Driver>,
    pub(crate) schemas: Arc<Registry>,
    pub(crate) engine: Engine,
}

/// A database handle: the registered schema set, the driver, and the
/// query engine built over both.
#[derive(Clone)]
pub struct Db {
    shared: Arc<Shared>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub(crate) fn new(shared: Shared) -> Self {
        Self {
            shared: Arc::new(shared),
        }
    }

    /// The engine, for callers that hold their own schema descriptors.
    pub fn engine(&self) -> &Engine {
        &self.shared.engine
    }

    /// Resolves a registered entity's schema descriptor.
    pub fn schema(&self, entity: &str) -> Result<Arc<SchemaDescriptor>> {
        self.shared.schemas.expect(entity).cloned()
    }

    /// Executes a criteria query, returning all matching records.
    pub async fn find(&self, entity: &str, criteria: &Criteria) -> Result<Vec<Record>> {
        let schema = self.schema(entity)?;
        self.shared.engine.find(&schema, criteria).await
    }

    /// Counts the records matching a criteria's filter.
    pub async fn count(&self, entity: &str, criteria: &Criteria) -> Result<u64> {
        let schema = self.schema(entity)?;
        self.shared.engine.count(&schema, criteria).await
    }

    /// Generic CRUD over one entity.
    pub fn entity(&self, entity: &str) -> Result<EntityService> {
        let schema = self.schema(entity)?;
        Ok(EntityService::new(
            self.shared.engine.clone(),
            self.shared.driver.clone(),
            self.shared.schemas.clone(),
            schema,
        ))
    }

    /// An association manager bound to one named relation of `parent`.
    /// Unknown relation names fail here, not per-call.
    pub fn relation(&self, parent: &str, relation: &str) -> Result<RelationManager> {
        RelationManager::new(
            self.shared.engine.clone(),
            self.shared.driver.clone(),
            &self.shared.schemas,
            parent,
            relation,
        )
    }
}
