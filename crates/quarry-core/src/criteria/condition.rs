use super::Operator;
use crate::stmt::Value;

/// A node in the recursive filter tree.
///
/// Leaves compare one field against an operand; groups combine children
/// with a single boolean connective. Exhaustive matching over this sum
/// type keeps every compiler branch covered.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Exact equality on a field
    Eq { field: String, value: Value },

    /// Operator comparison on a field
    Compare {
        field: String,
        op: Operator,
        operand: Value,
    },

    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn cmp(field: impl Into<String>, op: Operator, operand: impl Into<Value>) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            operand: operand.into(),
        }
    }

    pub fn and(conditions: Vec<Condition>) -> Self {
        Self::And(conditions)
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Self::Or(conditions)
    }

    /// Membership test, `field ∈ values`.
    pub fn in_list(field: impl Into<String>, values: impl Into<Value>) -> Self {
        Self::cmp(field, Operator::In, values)
    }

    /// Combines with another condition under AND, flattening when this node
    /// is already an AND group.
    pub fn and_with(self, other: Condition) -> Self {
        match self {
            Self::And(mut children) => {
                children.push(other);
                Self::And(children)
            }
            this => Self::And(vec![this, other]),
        }
    }
}
