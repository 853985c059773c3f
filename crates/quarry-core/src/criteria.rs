mod condition;
pub use condition::Condition;

mod op;
pub use op::Operator;

pub mod parse;

mod sort;
pub use sort::SortKey;

use crate::stmt::Direction;

/// The declarative query description clients submit.
///
/// Built fresh per request and treated as immutable once handed to the
/// engine. Every field/relation name it carries is validated against the
/// entity's [`crate::SchemaDescriptor`] before anything executes.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Criteria {
    /// Filter predicate tree
    pub filter: Option<Condition>,

    /// Maximum number of records to return
    pub limit: Option<u64>,

    /// Number of records to skip before returning any
    pub skip: Option<u64>,

    /// Ordered sort keys; first entry is the primary sort
    pub sort: Vec<SortKey>,

    /// Base-table columns to project. The primary key is always added when
    /// missing. Takes precedence over `omit`.
    pub select: Option<Vec<String>>,

    /// Base-table columns to exclude from the projection
    pub omit: Option<Vec<String>>,

    /// Relations to join into the result
    pub populate: Vec<String>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = Some(condition);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Appends a sort key.
    pub fn sort(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.sort.push(SortKey {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn omit<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.omit = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Appends a relation to populate.
    pub fn populate(mut self, relation: impl Into<String>) -> Self {
        self.populate.push(relation.into());
        self
    }

    /// Merges `condition` into the existing filter with logical AND.
    pub fn merge_filter(mut self, condition: Condition) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and_with(condition),
            None => condition,
        });
        self
    }
}
