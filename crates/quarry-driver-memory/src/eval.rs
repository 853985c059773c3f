use quarry_core::driver::RawRow;
use quarry_core::stmt::{CompareOp, Params, Predicate, TextMatch, Value};
use quarry_core::{bail, err, Result};

use std::cmp::Ordering;

/// Evaluates a compiled predicate against one raw row.
///
/// Null never satisfies an ordering or text comparison; equality against
/// null holds only when both sides are null.
pub(crate) fn predicate(pred: &Predicate, row: &RawRow, params: &Params) -> Result<bool> {
    match pred {
        Predicate::And(children) => {
            for child in children {
                if !predicate(child, row, params)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Predicate::Or(children) => {
            for child in children {
                if predicate(child, row, params)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Predicate::Compare { column, op, param } => {
            let operand = lookup(params, param)?;
            let actual = row.get(column).unwrap_or(&Value::Null);

            Ok(match op {
                CompareOp::Eq => eq(actual, operand),
                CompareOp::Ne => !eq(actual, operand),
                CompareOp::Lt => ordered(actual, operand, |o| o == Ordering::Less),
                CompareOp::Le => ordered(actual, operand, |o| o != Ordering::Greater),
                CompareOp::Gt => ordered(actual, operand, |o| o == Ordering::Greater),
                CompareOp::Ge => ordered(actual, operand, |o| o != Ordering::Less),
            })
        }
        Predicate::InList {
            column,
            param,
            negated,
        } => {
            let operand = lookup(params, param)?;
            let Some(items) = operand.as_list() else {
                bail!("parameter `{param}` of a membership test must be a list");
            };
            let actual = row.get(column).unwrap_or(&Value::Null);
            let hit = items.iter().any(|item| eq(actual, item));
            Ok(hit != *negated)
        }
        Predicate::Match {
            column,
            pattern,
            param,
        } => {
            let operand = lookup(params, param)?;
            let (Some(actual), Some(needle)) = (
                row.get(column).and_then(Value::as_str),
                operand.as_str(),
            ) else {
                return Ok(false);
            };

            Ok(match pattern {
                TextMatch::Contains => actual.contains(needle),
                TextMatch::StartsWith => actual.starts_with(needle),
                TextMatch::EndsWith => actual.ends_with(needle),
            })
        }
    }
}

fn lookup<'a>(params: &'a Params, name: &str) -> Result<&'a Value> {
    params
        .get(name)
        .ok_or_else(|| err!("unbound parameter `{name}`"))
}

fn eq(a: &Value, b: &Value) -> bool {
    if a.is_null() || b.is_null() {
        return a.is_null() && b.is_null();
    }
    matches!(a.compare(b), Some(Ordering::Equal))
}

fn ordered(a: &Value, b: &Value, test: impl Fn(Ordering) -> bool) -> bool {
    a.compare(b).is_some_and(test)
}
