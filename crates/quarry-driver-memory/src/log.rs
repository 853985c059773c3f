use quarry_core::stmt::Value;

/// One operation issued against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Query {
        entity: String,
    },
    Count {
        entity: String,
    },
    Insert {
        entity: String,
    },
    Load {
        entity: String,
        id: Value,
    },
    Save {
        entity: String,
        id: Value,
    },
    UpdateColumns {
        entity: String,
        id: Value,
        columns: Vec<String>,
    },
    SoftDelete {
        entity: String,
        id: Value,
    },
    Restore {
        entity: String,
        id: Value,
    },
    RelationLoad {
        entity: String,
        relation: String,
        parent: Value,
    },
    RelationAdd {
        entity: String,
        relation: String,
        parent: Value,
        ids: Vec<Value>,
    },
    RelationRemove {
        entity: String,
        relation: String,
        parent: Value,
        ids: Vec<Value>,
    },
    RelationSet {
        entity: String,
        relation: String,
        parent: Value,
        target: Value,
    },
}

/// Snapshot of the store's operation log, with assertion helpers for
/// tests.
#[derive(Debug, Clone)]
pub struct OpLog {
    ops: Vec<Op>,
}

impl OpLog {
    pub(crate) fn new(ops: Vec<Op>) -> Self {
        Self { ops }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Op> {
        self.ops.iter()
    }

    /// Id lists of every `add` issued against one relation, in call order.
    pub fn relation_adds(&self, relation: &str) -> Vec<Vec<Value>> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::RelationAdd {
                    relation: name,
                    ids,
                    ..
                } if name == relation => Some(ids.clone()),
                _ => None,
            })
            .collect()
    }

    /// Id lists of every `remove` issued against one relation, in call
    /// order.
    pub fn relation_removes(&self, relation: &str) -> Vec<Vec<Value>> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::RelationRemove {
                    relation: name,
                    ids,
                    ..
                } if name == relation => Some(ids.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of mutations (`add`/`remove`/`set`) issued against one
    /// relation.
    pub fn relation_mutations(&self, relation: &str) -> usize {
        self.ops
            .iter()
            .filter(|op| match op {
                Op::RelationAdd { relation: name, .. }
                | Op::RelationRemove { relation: name, .. }
                | Op::RelationSet { relation: name, .. } => name == relation,
                _ => false,
            })
            .count()
    }

    /// Number of full-row loads issued against one entity.
    pub fn loads(&self, entity: &str) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::Load { entity: name, .. } if name == entity))
            .count()
    }

    /// Number of full-record saves issued against one entity.
    pub fn saves(&self, entity: &str) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::Save { entity: name, .. } if name == entity))
            .count()
    }

    /// Column lists of every direct column update against one entity.
    pub fn column_updates(&self, entity: &str) -> Vec<Vec<String>> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::UpdateColumns {
                    entity: name,
                    columns,
                    ..
                } if name == entity => Some(columns.clone()),
                _ => None,
            })
            .collect()
    }
}
