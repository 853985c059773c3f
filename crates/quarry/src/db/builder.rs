use super::{Db, Shared};
use crate::{Engine, Result};

use quarry_core::driver::Driver;
use quarry_core::schema::Registry;
use quarry_core::SchemaDescriptor;

use std::sync::Arc;

/// Builds a [`Db`]: register each entity's schema descriptor, then supply
/// the driver. `build` verifies the schema set as a whole (relation
/// targets, far-side join keys) before anything executes.
#[derive(Default)]
pub struct Builder {
    schemas: Vec<SchemaDescriptor>,
}

impl Builder {
    pub fn register(&mut self, schema: SchemaDescriptor) -> &mut Self {
        self.schemas.push(schema);
        self
    }

    pub fn build(&mut self, driver: impl Driver) -> Result<Db> {
        let mut registry = Registry::default();
        for schema in self.schemas.drain(..) {
            registry.insert(schema);
        }
        registry.verify()?;

        let schemas = Arc::new(registry);
        let driver: Arc<dyn Driver> = Arc::new(driver);
        driver.register_schemas(schemas.clone())?;

        tracing::debug!(
            entities = schemas.iter().count(),
            "built db handle"
        );

        Ok(Db::new(Shared {
            engine: Engine::new(driver.clone()),
            driver,
            schemas,
        }))
    }
}
