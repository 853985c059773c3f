use super::Value;

use indexmap::IndexMap;

/// Named bind parameters for one compiled statement.
///
/// Operand values never appear inside the predicate tree handed to a
/// driver; each leaf references an entry here by a generated unique name,
/// so no value is ever concatenated into renderable query text.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Params {
    entries: IndexMap<String, Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a value under a fresh name derived from the field it compares
    /// against. The counter prefix keeps names unique even when the same
    /// field appears in several leaves.
    pub fn bind(&mut self, field: &str, value: Value) -> String {
        let name = format!("p{}_{}", self.entries.len(), field);
        self.entries.insert(name.clone(), value);
        name
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
