//! Parsing of the criteria wire representation.
//!
//! `where` arrives as a JSON document of the condition grammar, `sort` as
//! `"field DIRECTION[, field DIRECTION...]"`, and `select`/`omit`/
//! `populate` as comma-separated name lists. Parsing rejects malformed
//! documents and unknown operators; schema validation happens later, in
//! the engine.

use super::{Condition, Criteria, Operator, SortKey};
use crate::stmt::Value;
use crate::{Error, Result};

/// Builds a [`Criteria`] from the raw wire parts of a request.
#[derive(Debug, Default, Clone)]
pub struct Wire<'a> {
    pub filter: Option<&'a str>,
    pub sort: Option<&'a str>,
    pub select: Option<&'a str>,
    pub omit: Option<&'a str>,
    pub populate: Option<&'a str>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
}

impl Wire<'_> {
    pub fn parse(&self) -> Result<Criteria> {
        Ok(Criteria {
            filter: match self.filter {
                Some(raw) => filter_from_json_str(raw)?,
                None => None,
            },
            limit: self.limit,
            skip: self.skip,
            sort: match self.sort {
                Some(raw) => sort_list_from_str(raw)?,
                None => vec![],
            },
            select: self.select.map(name_list_from_str),
            omit: self.omit.map(name_list_from_str),
            populate: self.populate.map(name_list_from_str).unwrap_or_default(),
        })
    }
}

/// Parses a `where` document. An empty object means "no filter".
pub fn filter_from_json_str(raw: &str) -> Result<Option<Condition>> {
    let doc: serde_json::Value = serde_json::from_str(raw)?;
    match &doc {
        serde_json::Value::Object(entries) if entries.is_empty() => Ok(None),
        _ => condition_from_json(&doc).map(Some),
    }
}

/// Parses one node of the condition grammar.
pub fn condition_from_json(doc: &serde_json::Value) -> Result<Condition> {
    let serde_json::Value::Object(entries) = doc else {
        return Err(Error::invalid_criteria(format!(
            "condition must be an object, got `{doc}`"
        )));
    };

    let mut children = Vec::with_capacity(entries.len());

    for (key, value) in entries {
        match key.as_str() {
            "and" => children.push(Condition::And(group_from_json(key, value)?)),
            "or" => children.push(Condition::Or(group_from_json(key, value)?)),
            field => children.push(leaf_from_json(field, value)?),
        }
    }

    match children.len() {
        0 => Err(Error::invalid_criteria("empty condition object")),
        1 => Ok(children.pop().unwrap()),
        _ => Ok(Condition::And(children)),
    }
}

fn group_from_json(key: &str, value: &serde_json::Value) -> Result<Vec<Condition>> {
    let serde_json::Value::Array(items) = value else {
        return Err(Error::invalid_criteria(format!(
            "`{key}` expects an array of conditions"
        )));
    };
    items.iter().map(condition_from_json).collect()
}

fn leaf_from_json(field: &str, value: &serde_json::Value) -> Result<Condition> {
    match value {
        // `{field: {op: operand, ...}}`
        serde_json::Value::Object(ops) => {
            if ops.is_empty() {
                return Err(Error::invalid_criteria(format!(
                    "empty operator object for field `{field}`"
                )));
            }

            let mut compares = Vec::with_capacity(ops.len());
            for (op, operand) in ops {
                let op: Operator = op.parse()?;
                compares.push(Condition::cmp(field, op, value_from_json(operand)?));
            }

            Ok(match compares.len() {
                1 => compares.pop().unwrap(),
                _ => Condition::And(compares),
            })
        }
        // `{field: [a, b]}` is membership shorthand
        serde_json::Value::Array(_) => Ok(Condition::cmp(
            field,
            Operator::In,
            value_from_json(value)?,
        )),
        // `{field: scalar}`
        _ => Ok(Condition::eq(field, value_from_json(value)?)),
    }
}

/// Converts a JSON operand into a [`Value`]. Nested objects are not valid
/// operands.
pub fn value_from_json(doc: &serde_json::Value) -> Result<Value> {
    match doc {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(v) => Ok(Value::Bool(*v)),
        serde_json::Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(Value::I64(v))
            } else if let Some(v) = n.as_f64() {
                Ok(Value::F64(v))
            } else {
                Err(Error::invalid_criteria(format!(
                    "numeric operand `{n}` is out of range"
                )))
            }
        }
        serde_json::Value::String(v) => Ok(Value::String(v.clone())),
        serde_json::Value::Array(items) => Ok(Value::List(
            items.iter().map(value_from_json).collect::<Result<_>>()?,
        )),
        serde_json::Value::Object(_) => Err(Error::invalid_criteria(
            "objects are not valid operands",
        )),
    }
}

/// Parses `"field DIRECTION[, field DIRECTION...]"`.
pub fn sort_list_from_str(raw: &str) -> Result<Vec<SortKey>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}

/// Splits a comma-separated name list, dropping empty segments.
pub fn name_list_from_str(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
