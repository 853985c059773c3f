use super::plan::{Join, QueryPlan};
use crate::Result;

use quarry_core::criteria::{Condition, Operator};
use quarry_core::stmt::{CompareOp, Params, Predicate, TextMatch};
use quarry_core::{Criteria, SchemaDescriptor};

/// Compiles a validated criteria into a [`QueryPlan`].
pub(crate) fn plan(schema: &SchemaDescriptor, criteria: &Criteria) -> Result<QueryPlan> {
    let mut plan = filter_only(criteria)?;

    plan.joins = criteria
        .populate
        .iter()
        .map(|name| {
            // Relation existence was checked during validation.
            let alias = schema
                .relation(name)
                .map(|relation| relation.join_alias())
                .unwrap_or_else(|| format!("populate_{name}"));
            Join {
                relation: name.clone(),
                alias,
            }
        })
        .collect();

    plan.projection = projection(schema, criteria);
    plan.order_by = criteria.sort.clone();
    plan.limit = criteria.limit;
    plan.skip = criteria.skip;

    Ok(plan)
}

/// Compiles only the predicate part of a criteria, for `count`.
pub(crate) fn filter_only(criteria: &Criteria) -> Result<QueryPlan> {
    let mut plan = QueryPlan::default();
    if let Some(filter) = &criteria.filter {
        let mut params = Params::new();
        plan.filter = Some(condition(filter, &mut params));
        plan.params = params;
    }
    Ok(plan)
}

/// The base-table projection: the requested columns plus the primary key,
/// which is always included even when not asked for. `select` takes
/// precedence over `omit`.
fn projection(schema: &SchemaDescriptor, criteria: &Criteria) -> Vec<String> {
    let mut columns: Vec<String> = if let Some(select) = &criteria.select {
        let mut out = Vec::with_capacity(select.len() + 1);
        for name in select {
            if !out.contains(name) {
                out.push(name.clone());
            }
        }
        out
    } else if let Some(omit) = &criteria.omit {
        schema
            .column_names()
            .filter(|name| !omit.iter().any(|omitted| omitted == name))
            .map(str::to_string)
            .collect()
    } else {
        schema.column_names().map(str::to_string).collect()
    };

    let primary_key = schema.primary_key();
    if !columns.iter().any(|name| name == primary_key) {
        columns.push(primary_key.to_string());
    }

    columns
}

/// Walks the condition tree top-down, mirroring it into a [`Predicate`]
/// with every operand bound by a generated unique parameter name. Each
/// and/or group compiles to a single nested node, so precedence never
/// leaks across siblings.
fn condition(node: &Condition, params: &mut Params) -> Predicate {
    match node {
        Condition::And(children) => {
            Predicate::And(children.iter().map(|c| condition(c, params)).collect())
        }
        Condition::Or(children) => {
            Predicate::Or(children.iter().map(|c| condition(c, params)).collect())
        }
        Condition::Eq { field, value } => Predicate::Compare {
            column: field.clone(),
            op: CompareOp::Eq,
            param: params.bind(field, value.clone()),
        },
        Condition::Compare { field, op, operand } => {
            let param = params.bind(field, operand.clone());
            match op {
                Operator::Lt => compare(field, CompareOp::Lt, param),
                Operator::Lte => compare(field, CompareOp::Le, param),
                Operator::Gt => compare(field, CompareOp::Gt, param),
                Operator::Gte => compare(field, CompareOp::Ge, param),
                Operator::Ne => compare(field, CompareOp::Ne, param),
                Operator::In => Predicate::InList {
                    column: field.clone(),
                    param,
                    negated: false,
                },
                Operator::NotIn => Predicate::InList {
                    column: field.clone(),
                    param,
                    negated: true,
                },
                Operator::Contains => matches(field, TextMatch::Contains, param),
                Operator::StartsWith => matches(field, TextMatch::StartsWith, param),
                Operator::EndsWith => matches(field, TextMatch::EndsWith, param),
            }
        }
    }
}

fn compare(column: &str, op: CompareOp, param: String) -> Predicate {
    Predicate::Compare {
        column: column.to_string(),
        op,
        param,
    }
}

fn matches(column: &str, pattern: TextMatch, param: String) -> Predicate {
    Predicate::Match {
        column: column.to_string(),
        pattern,
        param,
    }
}
