use quarry_core::criteria::SortKey;
use quarry_core::driver::QueryBuilder;
use quarry_core::stmt::{Params, Predicate};

/// One planned left-outer join.
#[derive(Debug)]
pub(crate) struct Join {
    pub(crate) relation: String,
    pub(crate) alias: String,
}

/// The compiled form of one criteria: created per call, applied to a query
/// builder once, then discarded. Never exposed to callers.
#[derive(Debug, Default)]
pub(crate) struct QueryPlan {
    pub(crate) joins: Vec<Join>,
    pub(crate) filter: Option<Predicate>,
    pub(crate) params: Params,
    pub(crate) projection: Vec<String>,
    pub(crate) order_by: Vec<SortKey>,
    pub(crate) limit: Option<u64>,
    pub(crate) skip: Option<u64>,
}

impl QueryPlan {
    /// Replays the plan as the ordered builder-call sequence: joins,
    /// predicate, projection, ordering, pagination.
    pub(crate) fn apply(self, builder: &mut dyn QueryBuilder) {
        for join in &self.joins {
            builder.left_join(&join.relation, &join.alias);
        }

        if let Some(filter) = self.filter {
            builder.and_where(filter, self.params);
        }

        if !self.projection.is_empty() {
            builder.select(self.projection);
        }

        let mut order = self.order_by.into_iter();
        if let Some(first) = order.next() {
            builder.order_by(&first.field, first.direction);
            for key in order {
                builder.add_order_by(&key.field, key.direction);
            }
        }

        if let Some(limit) = self.limit {
            builder.take(limit);
        }
        if let Some(skip) = self.skip {
            builder.skip(skip);
        }
    }
}
