use crate::log::Op;
use crate::store::Store;

use quarry_core::driver::RelationOps;
use quarry_core::schema::{Relation, RelationKind, SchemaDescriptor};
use quarry_core::stmt::Value;
use quarry_core::{async_trait, bail, err, Result};

use std::sync::Arc;

/// Relation operations scoped to one relation of one parent row.
#[derive(Debug)]
pub(crate) struct MemoryRelation {
    store: Arc<Store>,
    schema: SchemaDescriptor,
    relation: Relation,
    parent: Value,
}

impl MemoryRelation {
    pub(crate) fn new(
        store: Arc<Store>,
        schema: SchemaDescriptor,
        relation: Relation,
        parent: Value,
    ) -> Self {
        Self {
            store,
            schema,
            relation,
            parent,
        }
    }

    fn load_op(&self) -> Op {
        Op::RelationLoad {
            entity: self.schema.name().to_string(),
            relation: self.relation.name.clone(),
            parent: self.parent.clone(),
        }
    }

    /// Primary-key column of the relation's target entity.
    fn child_pk(&self, state: &crate::store::State) -> Result<String> {
        let schemas = state
            .schemas
            .as_ref()
            .ok_or_else(|| err!("no schemas registered with the memory driver"))?;
        Ok(schemas.expect(&self.relation.target)?.primary_key().to_string())
    }
}

#[async_trait]
impl RelationOps for MemoryRelation {
    async fn load_one(&self) -> Result<Option<Value>> {
        let mut state = self.store.lock();
        state.record(self.load_op());

        let fk = state
            .table(self.schema.name())
            .and_then(|table| table.live_row(self.schema.primary_key(), &self.parent))
            .and_then(|row| row.values.get(&self.relation.join_key))
            .cloned();

        Ok(fk.filter(|value| !value.is_null()))
    }

    async fn load_many(&self) -> Result<Vec<Value>> {
        let mut state = self.store.lock();
        state.record(self.load_op());
        let child_pk = self.child_pk(&state)?;

        match self.relation.kind {
            RelationKind::HasMany => Ok(state
                .table(&self.relation.target)
                .map(|table| {
                    table
                        .live_rows()
                        .filter(|row| row.values.get(&self.relation.join_key) == Some(&self.parent))
                        .filter_map(|row| row.values.get(&child_pk).cloned())
                        .collect()
                })
                .unwrap_or_default()),
            RelationKind::ManyToMany => {
                let ids: Vec<Value> = state
                    .link_pairs(self.schema.name(), &self.relation.name)
                    .iter()
                    .filter(|(parent, _)| *parent == self.parent)
                    .map(|(_, child)| child.clone())
                    .collect();
                Ok(ids)
            }
            RelationKind::BelongsTo => {
                bail!(
                    "relation `{}` is to-one; use load_one",
                    self.relation.name
                )
            }
        }
    }

    async fn add(&self, ids: &[Value]) -> Result<()> {
        let mut state = self.store.lock();
        state.record(Op::RelationAdd {
            entity: self.schema.name().to_string(),
            relation: self.relation.name.clone(),
            parent: self.parent.clone(),
            ids: ids.to_vec(),
        });
        let child_pk = self.child_pk(&state)?;

        match self.relation.kind {
            RelationKind::HasMany => {
                let parent = self.parent.clone();
                let join_key = self.relation.join_key.clone();
                let table = state.table_mut(&self.relation.target);
                for id in ids {
                    let Some(row) = table.live_row_mut(&child_pk, id) else {
                        bail!("`{}` row {id} does not exist", self.relation.target);
                    };
                    row.values.insert(join_key.clone(), parent.clone());
                }
                Ok(())
            }
            RelationKind::ManyToMany => {
                let links = state.links_mut(self.schema.name(), &self.relation.name);
                for id in ids {
                    let pair = (self.parent.clone(), id.clone());
                    if !links.contains(&pair) {
                        links.push(pair);
                    }
                }
                Ok(())
            }
            RelationKind::BelongsTo => {
                bail!("relation `{}` is to-one; use set", self.relation.name)
            }
        }
    }

    async fn remove(&self, ids: &[Value]) -> Result<()> {
        let mut state = self.store.lock();
        state.record(Op::RelationRemove {
            entity: self.schema.name().to_string(),
            relation: self.relation.name.clone(),
            parent: self.parent.clone(),
            ids: ids.to_vec(),
        });
        let child_pk = self.child_pk(&state)?;

        match self.relation.kind {
            RelationKind::HasMany => {
                let parent = self.parent.clone();
                let join_key = self.relation.join_key.clone();
                let table = state.table_mut(&self.relation.target);
                for id in ids {
                    // Detach only when currently attached to this parent.
                    if let Some(row) = table.live_row_mut(&child_pk, id) {
                        if row.values.get(&join_key) == Some(&parent) {
                            row.values.insert(join_key.clone(), Value::Null);
                        }
                    }
                }
                Ok(())
            }
            RelationKind::ManyToMany => {
                let parent = self.parent.clone();
                let links = state.links_mut(self.schema.name(), &self.relation.name);
                links.retain(|(p, c)| *p != parent || !ids.contains(c));
                Ok(())
            }
            RelationKind::BelongsTo => {
                bail!("relation `{}` is to-one; use set", self.relation.name)
            }
        }
    }

    async fn set(&self, target: Value) -> Result<()> {
        let mut state = self.store.lock();
        state.record(Op::RelationSet {
            entity: self.schema.name().to_string(),
            relation: self.relation.name.clone(),
            parent: self.parent.clone(),
            target: target.clone(),
        });

        match self.relation.kind {
            RelationKind::BelongsTo => {
                if target.is_list() {
                    bail!(
                        "relation `{}` is to-one; set expects a scalar or null",
                        self.relation.name
                    );
                }
                let primary_key = self.schema.primary_key().to_string();
                let join_key = self.relation.join_key.clone();
                let table = state.table_mut(self.schema.name());
                let Some(row) = table.live_row_mut(&primary_key, &self.parent) else {
                    bail!(
                        "`{}` row {} does not exist",
                        self.schema.name(),
                        self.parent
                    );
                };
                row.values.insert(join_key, target);
                Ok(())
            }
            RelationKind::HasMany => {
                let Value::List(ids) = target else {
                    bail!(
                        "relation `{}` is to-many; set expects a list",
                        self.relation.name
                    );
                };
                let child_pk = self.child_pk(&state)?;
                let parent = self.parent.clone();
                let join_key = self.relation.join_key.clone();
                let table = state.table_mut(&self.relation.target);

                for row in table.rows.iter_mut().filter(|row| !row.deleted) {
                    let attached = row.values.get(&join_key) == Some(&parent);
                    let wanted = row
                        .values
                        .get(&child_pk)
                        .is_some_and(|pk| ids.contains(pk));
                    if wanted {
                        row.values.insert(join_key.clone(), parent.clone());
                    } else if attached {
                        row.values.insert(join_key.clone(), Value::Null);
                    }
                }
                Ok(())
            }
            RelationKind::ManyToMany => {
                let Value::List(ids) = target else {
                    bail!(
                        "relation `{}` is to-many; set expects a list",
                        self.relation.name
                    );
                };
                let parent = self.parent.clone();
                let links = state.links_mut(self.schema.name(), &self.relation.name);
                links.retain(|(p, _)| *p != parent);
                for id in ids {
                    links.push((parent.clone(), id));
                }
                Ok(())
            }
        }
    }
}
