mod compile;
mod plan;
mod reconcile;
mod validate;

use crate::Result;

use quarry_core::driver::Driver;
use quarry_core::stmt::Record;
use quarry_core::{Criteria, SchemaDescriptor};

use std::sync::Arc;

/// The criteria query engine.
///
/// Validates a [`Criteria`] against a [`SchemaDescriptor`], compiles it
/// into an ephemeral query plan, executes the plan as a single statement
/// through the driver's query builder, and repairs foreign-key scalars the
/// projection stripped.
#[derive(Clone, Debug)]
pub struct Engine {
    driver: Arc<dyn Driver>,
}

impl Engine {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self { driver }
    }

    /// Executes a criteria query, returning every matching record with any
    /// populated relations attached.
    pub async fn find(
        &self,
        schema: &SchemaDescriptor,
        criteria: &Criteria,
    ) -> Result<Vec<Record>> {
        validate::criteria(schema, criteria)?;

        let plan = compile::plan(schema, criteria)?;
        tracing::debug!(
            entity = schema.name(),
            joins = plan.joins.len(),
            filtered = plan.filter.is_some(),
            "executing find"
        );

        let mut builder = self.driver.query(schema);
        plan.apply(builder.as_mut());
        let executed = builder.execute().await?;

        Ok(reconcile::foreign_keys(schema, &criteria.populate, executed))
    }

    /// Counts the records matching a criteria's filter. The criteria is
    /// validated in full, exactly as for `find`; sort, projection,
    /// population and pagination are then ignored.
    pub async fn count(&self, schema: &SchemaDescriptor, criteria: &Criteria) -> Result<u64> {
        validate::criteria(schema, criteria)?;

        let plan = compile::filter_only(criteria)?;
        tracing::debug!(entity = schema.name(), "executing count");

        let mut builder = self.driver.query(schema);
        plan.apply(builder.as_mut());
        builder.get_count().await
    }
}
