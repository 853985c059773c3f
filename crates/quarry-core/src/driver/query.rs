use crate::stmt::{Direction, Params, Predicate, Record, Value};
use crate::{async_trait, Result};

use indexmap::IndexMap;

/// One raw result row: storage column name to value, before hydration.
/// Carries every base-table column regardless of the projection, which is
/// what makes foreign-key reconciliation possible after a partial select.
pub type RawRow = IndexMap<String, Value>;

/// The result of executing a compiled query: raw rows and hydrated
/// records, index-aligned.
#[derive(Debug, Default)]
pub struct Executed {
    pub raw: Vec<RawRow>,
    pub records: Vec<Record>,
}

/// The query-builder capability.
///
/// The engine compiles a criteria into an ordered sequence of calls on
/// this trait, then executes exactly once. Predicates arrive as
/// [`Predicate`] trees referencing named bind parameters; drivers render
/// or evaluate them; operand values never pass through query text.
#[async_trait]
pub trait QueryBuilder: Send {
    /// Adds a predicate group combined with AND.
    fn and_where(&mut self, predicate: Predicate, params: Params);

    /// Adds a predicate group combined with OR.
    fn or_where(&mut self, predicate: Predicate, params: Params);

    /// Adds a left-outer join for one relation under the given alias.
    fn left_join(&mut self, relation: &str, alias: &str);

    /// Restricts the base-table projection.
    fn select(&mut self, columns: Vec<String>);

    /// Sets the primary order clause.
    fn order_by(&mut self, column: &str, direction: Direction);

    /// Appends a secondary order clause.
    fn add_order_by(&mut self, column: &str, direction: Direction);

    fn take(&mut self, n: u64);

    fn skip(&mut self, n: u64);

    /// Executes the built query, returning raw rows alongside hydrated
    /// records.
    async fn execute(self: Box<Self>) -> Result<Executed>;

    /// Executes the built query as a count. Projection, ordering and
    /// pagination are ignored.
    async fn get_count(self: Box<Self>) -> Result<u64>;
}
