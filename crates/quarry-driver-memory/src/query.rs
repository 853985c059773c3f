use crate::eval;
use crate::log::Op;
use crate::store::{Row, State, Store};

use quarry_core::driver::{Executed, QueryBuilder, RawRow};
use quarry_core::schema::{Registry, RelationKind, SchemaDescriptor};
use quarry_core::stmt::{Direction, Params, Predicate, Record, Related, Value};
use quarry_core::{async_trait, bail, err, Result};

use std::cmp::Ordering;
use std::sync::Arc;

/// One accumulated predicate group and its bind parameters.
#[derive(Debug)]
struct Clause {
    or: bool,
    predicate: Predicate,
    params: Params,
}

/// The in-memory query builder: records the engine's calls, then runs the
/// whole query under one store lock at `execute`/`get_count`.
#[derive(Debug)]
pub(crate) struct MemoryQuery {
    store: Arc<Store>,
    schema: SchemaDescriptor,
    joins: Vec<String>,
    clauses: Vec<Clause>,
    selection: Option<Vec<String>>,
    order: Vec<(String, Direction)>,
    take: Option<u64>,
    skip: Option<u64>,
}

impl MemoryQuery {
    pub(crate) fn new(store: Arc<Store>, schema: SchemaDescriptor) -> Self {
        Self {
            store,
            schema,
            joins: vec![],
            clauses: vec![],
            selection: None,
            order: vec![],
            take: None,
            skip: None,
        }
    }

    /// Live rows matching the accumulated predicate groups, in table
    /// order.
    fn matching_rows(&self, state: &State) -> Result<Vec<RawRow>> {
        let Some(table) = state.table(self.schema.name()) else {
            return Ok(vec![]);
        };

        let mut out = vec![];
        for row in table.live_rows() {
            if self.matches(&row.values)? {
                out.push(row.values.clone());
            }
        }
        Ok(out)
    }

    fn matches(&self, row: &RawRow) -> Result<bool> {
        let mut clauses = self.clauses.iter();
        let Some(first) = clauses.next() else {
            return Ok(true);
        };

        let mut acc = eval::predicate(&first.predicate, row, &first.params)?;
        for clause in clauses {
            let hit = eval::predicate(&clause.predicate, row, &clause.params)?;
            acc = if clause.or { acc || hit } else { acc && hit };
        }
        Ok(acc)
    }

    fn sort(&self, rows: &mut [RawRow]) {
        if self.order.is_empty() {
            return;
        }

        rows.sort_by(|a, b| {
            for (column, direction) in &self.order {
                let left = a.get(column).unwrap_or(&Value::Null);
                let right = b.get(column).unwrap_or(&Value::Null);
                let ordering = match (left.is_null(), right.is_null()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (false, false) => left.compare(right).unwrap_or(Ordering::Equal),
                };
                let ordering = match direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    fn paginate(&self, rows: Vec<RawRow>) -> Vec<RawRow> {
        let skip = self.skip.unwrap_or(0) as usize;
        let take = self.take.map(|n| n as usize).unwrap_or(usize::MAX);
        rows.into_iter().skip(skip).take(take).collect()
    }

    /// Builds the hydrated record for one raw row: the projected base
    /// columns plus every joined relation.
    fn hydrate(
        &self,
        state: &State,
        schemas: &Registry,
        row: &RawRow,
    ) -> Result<Record> {
        let mut record = Record::new();
        match &self.selection {
            Some(columns) => {
                for column in columns {
                    record.set(column, row.get(column).cloned().unwrap_or(Value::Null));
                }
            }
            None => {
                for column in self.schema.column_names() {
                    record.set(column, row.get(column).cloned().unwrap_or(Value::Null));
                }
            }
        }

        for name in &self.joins {
            let Some(relation) = self.schema.relation(name) else {
                bail!("join references unknown relation `{name}`");
            };
            let target = schemas.expect(&relation.target)?;
            let target_pk = target.primary_key();

            let related = match relation.kind {
                RelationKind::BelongsTo => {
                    let fk = row.get(&relation.join_key).cloned().unwrap_or(Value::Null);
                    let child = state.table(target.name()).and_then(|table| {
                        table
                            .live_row(target_pk, &fk)
                            .map(|child| full_record(target, child))
                    });
                    Related::One(child.map(Box::new))
                }
                RelationKind::HasMany => {
                    let parent_id = row.get(self.schema.primary_key());
                    let children = state
                        .table(target.name())
                        .map(|table| {
                            table
                                .live_rows()
                                .filter(|child| {
                                    child.values.get(&relation.join_key) == parent_id
                                })
                                .map(|child| full_record(target, child))
                                .collect()
                        })
                        .unwrap_or_default();
                    Related::Many(children)
                }
                RelationKind::ManyToMany => {
                    let parent_id = row.get(self.schema.primary_key());
                    let pairs = state.link_pairs(self.schema.name(), name);
                    let children = pairs
                        .iter()
                        .filter(|(parent, _)| Some(parent) == parent_id)
                        .filter_map(|(_, child_id)| {
                            state
                                .table(target.name())
                                .and_then(|table| table.live_row(target_pk, child_id))
                                .map(|child| full_record(target, child))
                        })
                        .collect();
                    Related::Many(children)
                }
            };

            record.set_related(name.clone(), related);
        }

        Ok(record)
    }
}

fn full_record(schema: &SchemaDescriptor, row: &Row) -> Record {
    schema
        .column_names()
        .map(|column| {
            (
                column.to_string(),
                row.values.get(column).cloned().unwrap_or(Value::Null),
            )
        })
        .collect()
}

#[async_trait]
impl QueryBuilder for MemoryQuery {
    fn and_where(&mut self, predicate: Predicate, params: Params) {
        self.clauses.push(Clause {
            or: false,
            predicate,
            params,
        });
    }

    fn or_where(&mut self, predicate: Predicate, params: Params) {
        self.clauses.push(Clause {
            or: true,
            predicate,
            params,
        });
    }

    fn left_join(&mut self, relation: &str, _alias: &str) {
        self.joins.push(relation.to_string());
    }

    fn select(&mut self, columns: Vec<String>) {
        self.selection = Some(columns);
    }

    fn order_by(&mut self, column: &str, direction: Direction) {
        self.order = vec![(column.to_string(), direction)];
    }

    fn add_order_by(&mut self, column: &str, direction: Direction) {
        self.order.push((column.to_string(), direction));
    }

    fn take(&mut self, n: u64) {
        self.take = Some(n);
    }

    fn skip(&mut self, n: u64) {
        self.skip = Some(n);
    }

    async fn execute(self: Box<Self>) -> Result<Executed> {
        let mut state = self.store.lock();
        state.record(Op::Query {
            entity: self.schema.name().to_string(),
        });

        let schemas = state
            .schemas
            .clone()
            .ok_or_else(|| err!("no schemas registered with the memory driver"))?;

        let mut rows = self.matching_rows(&state)?;
        self.sort(&mut rows);
        let rows = self.paginate(rows);

        let mut executed = Executed::default();
        for row in rows {
            let record = self.hydrate(&state, &schemas, &row)?;
            executed.raw.push(row);
            executed.records.push(record);
        }
        Ok(executed)
    }

    async fn get_count(self: Box<Self>) -> Result<u64> {
        let mut state = self.store.lock();
        state.record(Op::Count {
            entity: self.schema.name().to_string(),
        });

        Ok(self.matching_rows(&state)?.len() as u64)
    }
}
