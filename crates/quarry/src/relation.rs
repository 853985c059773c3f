use crate::{Engine, Result};

use quarry_core::criteria::Condition;
use quarry_core::driver::{Driver, RelationOps};
use quarry_core::schema::{Registry, Relation, RelationKind};
use quarry_core::stmt::{Record, Value};
use quarry_core::{Criteria, Error, SchemaDescriptor};

use std::sync::Arc;

/// Mutates and reads one named relation between a parent entity and its
/// child entity.
///
/// The relation is resolved once at construction; an unknown name fails
/// fast here rather than per-call. Reads go through the query engine, so
/// association queries get the same validation, joins, projection and
/// pagination guarantees as plain finds. Writes go through the driver's
/// relation-scoped primitives: no full parent load, no full parent save,
/// and therefore no lost-update window against concurrent mutations of the
/// parent's other fields and relations.
#[derive(Debug)]
pub struct RelationManager {
    engine: Engine,
    driver: Arc<dyn Driver>,
    parent: Arc<SchemaDescriptor>,
    child: Arc<SchemaDescriptor>,
    relation: Relation,
}

impl RelationManager {
    pub(crate) fn new(
        engine: Engine,
        driver: Arc<dyn Driver>,
        schemas: &Registry,
        parent: &str,
        relation: &str,
    ) -> Result<Self> {
        let parent = schemas.expect(parent)?.clone();
        let relation = parent.expect_relation(relation)?.clone();
        let child = schemas.expect(&relation.target)?.clone();

        Ok(Self {
            engine,
            driver,
            parent,
            child,
            relation,
        })
    }

    /// Attaches `fk` to the parent's relation. A no-op when the child is
    /// already attached; both the first and the repeated call return the
    /// re-hydrated parent.
    pub async fn add(
        &self,
        parent_id: impl Into<Value>,
        fk: impl Into<Value>,
    ) -> Result<Record> {
        let parent_id = parent_id.into();
        let fk = fk.into();

        self.ensure_exists(&self.parent, &parent_id).await?;
        self.ensure_exists(&self.child, &fk).await?;

        let ops = self.ops(&parent_id);
        if self.relation.is_many() {
            let current = ops.load_many().await?;
            if !current.contains(&fk) {
                tracing::debug!(
                    parent = self.parent.name(),
                    relation = %self.relation.name,
                    "attaching child"
                );
                ops.add(std::slice::from_ref(&fk)).await?;
            }
        } else {
            let current = ops.load_one().await?;
            if current.as_ref() != Some(&fk) {
                ops.set(fk).await?;
            }
        }

        self.rehydrate(&parent_id).await
    }

    /// Detaches `fk` from the parent's relation. Detaches only; the child
    /// record itself is never deleted.
    pub async fn remove(
        &self,
        parent_id: impl Into<Value>,
        fk: impl Into<Value>,
    ) -> Result<Record> {
        let parent_id = parent_id.into();
        let fk = fk.into();

        self.ensure_exists(&self.parent, &parent_id).await?;

        let ops = self.ops(&parent_id);
        if self.relation.is_many() {
            ops.remove(std::slice::from_ref(&fk)).await?;
        } else {
            ops.set(Value::Null).await?;
        }

        self.rehydrate(&parent_id).await
    }

    /// Replaces the relation's full membership with `fks`. An empty list
    /// clears the relation.
    ///
    /// Ids are coerced to integers (non-numeric entries dropped) and
    /// de-duplicated; if any referenced child is missing the call fails
    /// before mutating anything. For one-to-many relations only the
    /// add/remove deltas are written, leaving unchanged children untouched.
    /// The existing-set snapshot the deltas are computed from may be stale
    /// against a concurrent mutation of the same relation; this race is
    /// accepted, not locked away.
    pub async fn replace(
        &self,
        parent_id: impl Into<Value>,
        fks: impl IntoIterator<Item = Value>,
    ) -> Result<Record> {
        let parent_id = parent_id.into();
        let fks = coerce_ids(fks);

        self.ensure_exists(&self.parent, &parent_id).await?;

        if !fks.is_empty() {
            let wanted = fks.len() as u64;
            let criteria = Criteria::new().filter(Condition::in_list(
                self.child.primary_key(),
                Value::List(fks.clone()),
            ));
            let found = self.engine.count(&self.child, &criteria).await?;
            if found != wanted {
                return Err(Error::record_not_found(format!(
                    "{} of {} requested `{}` records missing",
                    wanted - found,
                    wanted,
                    self.child.name()
                )));
            }
        }

        tracing::debug!(
            parent = self.parent.name(),
            relation = %self.relation.name,
            targets = fks.len(),
            "replacing relation"
        );

        let ops = self.ops(&parent_id);
        match self.relation.kind {
            RelationKind::ManyToMany => {
                ops.set(Value::List(fks)).await?;
            }
            RelationKind::HasMany => {
                let existing = ops.load_many().await?;
                let to_remove: Vec<Value> = existing
                    .iter()
                    .filter(|id| !fks.contains(id))
                    .cloned()
                    .collect();
                let to_add: Vec<Value> = fks
                    .iter()
                    .filter(|id| !existing.contains(id))
                    .cloned()
                    .collect();

                if !to_remove.is_empty() {
                    ops.remove(&to_remove).await?;
                }
                if !to_add.is_empty() {
                    ops.add(&to_add).await?;
                }
            }
            RelationKind::BelongsTo => {
                let target = fks.into_iter().next().unwrap_or(Value::Null);
                ops.set(target).await?;
            }
        }

        self.rehydrate(&parent_id).await
    }

    /// Queries the related children, applying `criteria` on top of the
    /// membership restriction. Returns empty without touching the child
    /// table when nothing is related.
    pub async fn find(
        &self,
        parent_id: impl Into<Value>,
        criteria: &Criteria,
    ) -> Result<Vec<Record>> {
        let parent_id = parent_id.into();
        self.ensure_exists(&self.parent, &parent_id).await?;

        let Some(criteria) = self.scoped(&parent_id, criteria).await? else {
            return Ok(vec![]);
        };
        self.engine.find(&self.child, &criteria).await
    }

    /// Counts the related children matching `criteria`.
    pub async fn count(
        &self,
        parent_id: impl Into<Value>,
        criteria: &Criteria,
    ) -> Result<u64> {
        let parent_id = parent_id.into();
        self.ensure_exists(&self.parent, &parent_id).await?;

        let Some(criteria) = self.scoped(&parent_id, criteria).await? else {
            return Ok(0);
        };
        self.engine.count(&self.child, &criteria).await
    }

    /// Merges the caller's criteria with `id ∈ related` under AND. `None`
    /// when the relation is currently empty.
    async fn scoped(&self, parent_id: &Value, criteria: &Criteria) -> Result<Option<Criteria>> {
        let related = self.related_ids(parent_id).await?;
        if related.is_empty() {
            return Ok(None);
        }

        let membership =
            Condition::in_list(self.child.primary_key(), Value::List(related));
        Ok(Some(criteria.clone().merge_filter(membership)))
    }

    async fn related_ids(&self, parent_id: &Value) -> Result<Vec<Value>> {
        let ops = self.ops(parent_id);
        if self.relation.is_many() {
            ops.load_many().await
        } else {
            Ok(ops.load_one().await?.into_iter().collect())
        }
    }

    fn ops(&self, parent_id: &Value) -> Box<dyn RelationOps> {
        self.driver
            .relation(&self.parent, &self.relation, parent_id.clone())
    }

    async fn ensure_exists(&self, schema: &SchemaDescriptor, id: &Value) -> Result<()> {
        let criteria =
            Criteria::new().filter(Condition::eq(schema.primary_key(), id.clone()));
        if self.engine.count(schema, &criteria).await? == 0 {
            return Err(Error::record_not_found(format!(
                "entity={} id={id}",
                schema.name()
            )));
        }
        Ok(())
    }

    /// Reloads the parent with this relation populated.
    async fn rehydrate(&self, parent_id: &Value) -> Result<Record> {
        let criteria = Criteria::new()
            .filter(Condition::eq(self.parent.primary_key(), parent_id.clone()))
            .populate(&self.relation.name);

        self.engine
            .find(&self.parent, &criteria)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::record_not_found(format!(
                    "entity={} id={parent_id}",
                    self.parent.name()
                ))
            })
    }
}

/// Coerces raw foreign keys into de-duplicated integer identifiers,
/// dropping anything non-numeric.
fn coerce_ids(fks: impl IntoIterator<Item = Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for fk in fks {
        let Some(id) = fk.as_i64() else { continue };
        let id = Value::I64(id);
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
