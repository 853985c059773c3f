use crate::log::{Op, OpLog};

use quarry_core::driver::RawRow;
use quarry_core::schema::Registry;
use quarry_core::stmt::Value;

use indexmap::IndexMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared mutable state behind every capability object the driver hands
/// out. Guarded by a single mutex; no lock is held across an await point.
#[derive(Debug, Default)]
pub(crate) struct Store {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
pub(crate) struct State {
    pub(crate) schemas: Option<Arc<Registry>>,
    pub(crate) tables: IndexMap<String, Table>,
    /// Many-to-many link storage, keyed `"entity.relation"`, holding
    /// `(parent id, child id)` pairs.
    pub(crate) links: IndexMap<String, Vec<(Value, Value)>>,
    pub(crate) log: Vec<Op>,
}

#[derive(Debug, Default)]
pub(crate) struct Table {
    pub(crate) rows: Vec<Row>,
    pub(crate) next_id: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub(crate) values: RawRow,
    pub(crate) deleted: bool,
}

impl Store {
    pub(crate) fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("memory store poisoned")
    }

    pub(crate) fn register(&self, schemas: Arc<Registry>) {
        self.lock().schemas = Some(schemas);
    }

    pub(crate) fn log_snapshot(&self) -> OpLog {
        OpLog::new(self.lock().log.clone())
    }

    pub(crate) fn clear_log(&self) {
        self.lock().log.clear();
    }
}

impl State {
    pub(crate) fn record(&mut self, op: Op) {
        self.log.push(op);
    }

    pub(crate) fn table_mut(&mut self, entity: &str) -> &mut Table {
        self.tables.entry(entity.to_string()).or_default()
    }

    pub(crate) fn table(&self, entity: &str) -> Option<&Table> {
        self.tables.get(entity)
    }

    pub(crate) fn links_mut(&mut self, entity: &str, relation: &str) -> &mut Vec<(Value, Value)> {
        self.links
            .entry(format!("{entity}.{relation}"))
            .or_default()
    }

    pub(crate) fn link_pairs(&self, entity: &str, relation: &str) -> &[(Value, Value)] {
        self.links
            .get(&format!("{entity}.{relation}"))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Table {
    /// A live (not soft-deleted) row by primary-key value.
    pub(crate) fn live_row(&self, primary_key: &str, id: &Value) -> Option<&Row> {
        self.rows
            .iter()
            .find(|row| !row.deleted && row.values.get(primary_key) == Some(id))
    }

    pub(crate) fn live_row_mut(&mut self, primary_key: &str, id: &Value) -> Option<&mut Row> {
        self.rows
            .iter_mut()
            .find(|row| !row.deleted && row.values.get(primary_key) == Some(id))
    }

    pub(crate) fn any_row_mut(&mut self, primary_key: &str, id: &Value) -> Option<&mut Row> {
        self.rows
            .iter_mut()
            .find(|row| row.values.get(primary_key) == Some(id))
    }

    pub(crate) fn live_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|row| !row.deleted)
    }

    pub(crate) fn assign_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Keeps the id sequence ahead of explicitly supplied keys.
    pub(crate) fn observe_id(&mut self, id: i64) {
        if id > self.next_id {
            self.next_id = id;
        }
    }
}
