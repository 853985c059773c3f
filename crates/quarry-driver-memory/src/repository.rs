use crate::log::Op;
use crate::store::{Row, Store};

use quarry_core::driver::{RawRow, Repository};
use quarry_core::schema::{RelationKind, SchemaDescriptor};
use quarry_core::stmt::{Record, Related, Value};
use quarry_core::{async_trait, bail, err, Error, Result};

use std::sync::Arc;

/// Row-level operations for one entity.
#[derive(Debug)]
pub(crate) struct MemoryRepository {
    store: Arc<Store>,
    schema: SchemaDescriptor,
}

impl MemoryRepository {
    pub(crate) fn new(store: Arc<Store>, schema: SchemaDescriptor) -> Self {
        Self { store, schema }
    }

    fn not_found(&self, id: &Value) -> Error {
        Error::record_not_found(format!("entity={} id={id}", self.schema.name()))
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn insert(&self, mut values: RawRow) -> Result<Record> {
        let mut state = self.store.lock();
        state.record(Op::Insert {
            entity: self.schema.name().to_string(),
        });

        let primary_key = self.schema.primary_key().to_string();
        let table = state.table_mut(self.schema.name());

        match values.get(&primary_key) {
            Some(Value::I64(id)) => table.observe_id(*id),
            Some(other) => bail!("primary key must be an integer, got {}", other.ty_name()),
            None => {
                let id = table.assign_id();
                values.insert(primary_key.clone(), Value::I64(id));
            }
        }

        // Missing columns default to null.
        let mut row_values = RawRow::new();
        for column in self.schema.column_names() {
            row_values.insert(
                column.to_string(),
                values.get(column).cloned().unwrap_or(Value::Null),
            );
        }

        table.rows.push(Row {
            values: row_values.clone(),
            deleted: false,
        });

        Ok(row_values.into_iter().collect())
    }

    async fn update_columns(&self, id: &Value, values: RawRow) -> Result<()> {
        let mut state = self.store.lock();
        state.record(Op::UpdateColumns {
            entity: self.schema.name().to_string(),
            id: id.clone(),
            columns: values.keys().cloned().collect(),
        });

        let primary_key = self.schema.primary_key().to_string();
        let table = state.table_mut(self.schema.name());
        let Some(row) = table.live_row_mut(&primary_key, id) else {
            return Err(self.not_found(id));
        };

        for (column, value) in values {
            row.values.insert(column, value);
        }
        Ok(())
    }

    async fn load(&self, id: &Value) -> Result<Option<Record>> {
        let mut state = self.store.lock();
        state.record(Op::Load {
            entity: self.schema.name().to_string(),
            id: id.clone(),
        });

        let record = state
            .table(self.schema.name())
            .and_then(|table| table.live_row(self.schema.primary_key(), id))
            .map(|row| row.values.clone().into_iter().collect());
        Ok(record)
    }

    async fn save(&self, record: Record) -> Result<Record> {
        let id = record
            .get(self.schema.primary_key())
            .cloned()
            .ok_or_else(|| err!("cannot save a `{}` record without its primary key", self.schema.name()))?;

        let mut state = self.store.lock();
        state.record(Op::Save {
            entity: self.schema.name().to_string(),
            id: id.clone(),
        });

        let schemas = state
            .schemas
            .clone()
            .ok_or_else(|| err!("no schemas registered with the memory driver"))?;

        let primary_key = self.schema.primary_key().to_string();
        {
            let table = state.table_mut(self.schema.name());
            let Some(row) = table.live_row_mut(&primary_key, &id) else {
                return Err(self.not_found(&id));
            };
            for (column, value) in record.values() {
                row.values.insert(column.to_string(), value.clone());
            }
        }

        // Assigned relations are the store's responsibility on save.
        for (name, related) in record.relations() {
            let Some(relation) = self.schema.relation(name) else {
                bail!(
                    "`{}` record carries unknown relation `{name}`",
                    self.schema.name()
                );
            };
            let target = schemas.expect(&relation.target)?;
            let target_pk = target.primary_key();

            match (relation.kind, related) {
                (RelationKind::BelongsTo, Related::One(child)) => {
                    let fk = child
                        .as_ref()
                        .and_then(|stub| stub.get(target_pk).cloned())
                        .unwrap_or(Value::Null);
                    let table = state.table_mut(self.schema.name());
                    if let Some(row) = table.live_row_mut(&primary_key, &id) {
                        row.values.insert(relation.join_key.clone(), fk);
                    }
                }
                (RelationKind::HasMany, Related::Many(children)) => {
                    let ids: Vec<Value> = children
                        .iter()
                        .filter_map(|stub| stub.get(target_pk).cloned())
                        .collect();
                    let join_key = relation.join_key.clone();
                    let child_pk = target_pk.to_string();
                    let table = state.table_mut(&relation.target);
                    for row in table.rows.iter_mut().filter(|row| !row.deleted) {
                        let attached = row.values.get(&join_key) == Some(&id);
                        let wanted = row
                            .values
                            .get(&child_pk)
                            .is_some_and(|pk| ids.contains(pk));
                        if wanted {
                            row.values.insert(join_key.clone(), id.clone());
                        } else if attached {
                            row.values.insert(join_key.clone(), Value::Null);
                        }
                    }
                }
                (RelationKind::ManyToMany, Related::Many(children)) => {
                    let ids: Vec<Value> = children
                        .iter()
                        .filter_map(|stub| stub.get(target_pk).cloned())
                        .collect();
                    let links = state.links_mut(self.schema.name(), name);
                    links.retain(|(parent, _)| *parent != id);
                    for child_id in ids {
                        links.push((id.clone(), child_id));
                    }
                }
                (kind, _) => {
                    bail!("relation `{name}` assignment does not match its {kind:?} shape")
                }
            }
        }

        Ok(record)
    }

    async fn soft_delete(&self, id: &Value) -> Result<()> {
        let mut state = self.store.lock();
        state.record(Op::SoftDelete {
            entity: self.schema.name().to_string(),
            id: id.clone(),
        });

        let primary_key = self.schema.primary_key().to_string();
        let table = state.table_mut(self.schema.name());
        let Some(row) = table.live_row_mut(&primary_key, id) else {
            return Err(self.not_found(id));
        };
        row.deleted = true;
        Ok(())
    }

    async fn restore(&self, id: &Value) -> Result<()> {
        let mut state = self.store.lock();
        state.record(Op::Restore {
            entity: self.schema.name().to_string(),
            id: id.clone(),
        });

        let primary_key = self.schema.primary_key().to_string();
        let table = state.table_mut(self.schema.name());
        let Some(row) = table.any_row_mut(&primary_key, id) else {
            return Err(self.not_found(id));
        };
        row.deleted = false;
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        let mut state = self.store.lock();
        state.record(Op::Count {
            entity: self.schema.name().to_string(),
        });

        Ok(state
            .table(self.schema.name())
            .map(|table| table.live_rows().count() as u64)
            .unwrap_or(0))
    }
}
