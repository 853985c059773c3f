use crate::{Engine, Result};

use quarry_core::criteria::Condition;
use quarry_core::driver::{Driver, RawRow, Repository};
use quarry_core::schema::{Registry, Relation};
use quarry_core::stmt::{Record, Related, Value};
use quarry_core::{Criteria, Error, SchemaDescriptor};

use indexmap::IndexMap;
use std::sync::Arc;

/// An update/create payload: top-level keys name either columns or
/// relations of the entity.
pub type Payload = IndexMap<String, Value>;

/// Generic CRUD over one entity.
///
/// Reads delegate to the query engine. Writes split each payload at the
/// top level: keys naming columns go through a direct column update with
/// no row load, keys naming relations force the load-assign-save path,
/// because relation assignment semantics belong to the store. When both
/// are present the column update is issued first.
pub struct EntityService {
    engine: Engine,
    driver: Arc<dyn Driver>,
    schemas: Arc<Registry>,
    schema: Arc<SchemaDescriptor>,
}

impl EntityService {
    pub(crate) fn new(
        engine: Engine,
        driver: Arc<dyn Driver>,
        schemas: Arc<Registry>,
        schema: Arc<SchemaDescriptor>,
    ) -> Self {
        Self {
            engine,
            driver,
            schemas,
            schema,
        }
    }

    pub async fn find(&self, criteria: &Criteria) -> Result<Vec<Record>> {
        self.engine.find(&self.schema, criteria).await
    }

    /// Loads one record by primary key; missing records are an error.
    pub async fn find_one(&self, id: impl Into<Value>) -> Result<Record> {
        let id = id.into();
        let criteria =
            Criteria::new().filter(Condition::eq(self.schema.primary_key(), id.clone()));

        self.engine
            .find(&self.schema, &criteria)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::record_not_found(format!("entity={} id={id}", self.schema.name()))
            })
    }

    pub async fn count(&self, criteria: &Criteria) -> Result<u64> {
        self.engine.count(&self.schema, criteria).await
    }

    pub async fn create(&self, payload: Payload) -> Result<Record> {
        let (columns, relations) = self.split(payload)?;

        let record = self.repository().insert(columns).await?;

        if relations.is_empty() {
            return Ok(record);
        }

        let record = self.assign_relations(record, relations)?;
        self.repository().save(record).await
    }

    pub async fn create_many(&self, payloads: Vec<Payload>) -> Result<Vec<Record>> {
        let mut out = Vec::with_capacity(payloads.len());
        for payload in payloads {
            out.push(self.create(payload).await?);
        }
        Ok(out)
    }

    /// Updates one record. Pure-column payloads never load the row; only
    /// relation-bearing payloads pay for load-assign-save.
    pub async fn update(&self, id: impl Into<Value>, payload: Payload) -> Result<Record> {
        let id = id.into();
        let (columns, relations) = self.split(payload)?;

        if !columns.is_empty() {
            self.repository().update_columns(&id, columns).await?;
        }

        if !relations.is_empty() {
            let record = self.repository().load(&id).await?.ok_or_else(|| {
                Error::record_not_found(format!("entity={} id={id}", self.schema.name()))
            })?;
            let record = self.assign_relations(record, relations)?;
            self.repository().save(record).await?;
        }

        self.find_one(id).await
    }

    /// Applies one payload to every record matching `criteria`. Returns
    /// the number of records updated.
    pub async fn update_many(&self, criteria: &Criteria, payload: Payload) -> Result<u64> {
        let matches = self
            .engine
            .find(&self.schema, &criteria.clone().select([self.schema.primary_key()]))
            .await?;

        let mut updated = 0;
        for record in matches {
            let Some(id) = record.get(self.schema.primary_key()).cloned() else {
                continue;
            };
            self.update(id, payload.clone()).await?;
            updated += 1;
        }
        Ok(updated)
    }

    /// Soft-deletes one record. The row is excluded from queries but never
    /// destroyed; `restore` brings it back.
    pub async fn remove(&self, id: impl Into<Value>) -> Result<()> {
        self.repository().soft_delete(&id.into()).await
    }

    pub async fn restore(&self, id: impl Into<Value>) -> Result<()> {
        self.repository().restore(&id.into()).await
    }

    fn repository(&self) -> Box<dyn Repository> {
        self.driver.repository(&self.schema)
    }

    /// Partitions a payload into column data and relation data. Keys
    /// naming neither are a client error.
    fn split(&self, payload: Payload) -> Result<(RawRow, Vec<(Relation, Value)>)> {
        let mut columns = RawRow::new();
        let mut relations = Vec::new();

        for (key, value) in payload {
            if let Some(relation) = self.schema.relation(&key) {
                relations.push((relation.clone(), value));
            } else if self.schema.has_column(&key) {
                columns.insert(key, value);
            } else {
                return Err(Error::invalid_criteria(format!(
                    "unknown field `{key}` in `{}` payload",
                    self.schema.name()
                )));
            }
        }

        Ok((columns, relations))
    }

    /// Assigns relation payload values onto a loaded record as id stubs,
    /// ready for the store's save path.
    fn assign_relations(
        &self,
        mut record: Record,
        relations: Vec<(Relation, Value)>,
    ) -> Result<Record> {
        for (relation, value) in relations {
            let target = self.schemas.expect(&relation.target)?;
            let target_pk = target.primary_key();

            let related = if relation.is_many() {
                let Value::List(ids) = value else {
                    return Err(Error::invalid_criteria(format!(
                        "relation `{}` expects a list of ids",
                        relation.name
                    )));
                };
                Related::Many(
                    ids.into_iter()
                        .map(|id| Record::stub(target_pk, id))
                        .collect(),
                )
            } else {
                match value {
                    Value::Null => Related::One(None),
                    id @ Value::I64(_) => {
                        Related::One(Some(Box::new(Record::stub(target_pk, id))))
                    }
                    other => {
                        return Err(Error::invalid_criteria(format!(
                            "relation `{}` expects an id or null, got {}",
                            relation.name,
                            other.ty_name()
                        )))
                    }
                }
            };

            record.set_related(relation.name.clone(), related);
        }

        Ok(record)
    }
}
