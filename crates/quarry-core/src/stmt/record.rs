use super::Value;

use indexmap::IndexMap;

/// A hydrated entity: projected column values plus any populated
/// relations.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Record {
    values: IndexMap<String, Value>,
    relations: IndexMap<String, Related>,
}

/// A populated relation on a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    One(Option<Box<Record>>),
    Many(Vec<Record>),
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// A record carrying only an identifier; used when assigning relations
    /// by foreign key.
    pub fn stub(primary_key: impl Into<String>, id: impl Into<Value>) -> Self {
        let mut record = Self::new();
        record.set(primary_key, id);
        record
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn set_related(&mut self, relation: impl Into<String>, related: Related) {
        self.relations.insert(relation.into(), related);
    }

    pub fn related(&self, relation: &str) -> Option<&Related> {
        self.relations.get(relation)
    }

    pub fn relations(&self) -> impl Iterator<Item = (&str, &Related)> {
        self.relations.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
            relations: IndexMap::new(),
        }
    }
}

impl Related {
    /// Identifiers of the related records, reading each record's value for
    /// `primary_key`.
    pub fn ids(&self, primary_key: &str) -> Vec<Value> {
        match self {
            Related::One(None) => vec![],
            Related::One(Some(record)) => {
                record.get(primary_key).into_iter().cloned().collect()
            }
            Related::Many(records) => records
                .iter()
                .filter_map(|record| record.get(primary_key).cloned())
                .collect(),
        }
    }
}
