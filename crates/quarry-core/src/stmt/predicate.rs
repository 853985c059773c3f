use std::fmt;

/// A compiled filter tree handed to the query-builder capability.
///
/// Mirrors the criteria's condition tree with operand values replaced by
/// bind-parameter names. Drivers render or evaluate it themselves; nesting
/// keeps mixed and/or groups scoped so precedence never leaks across
/// siblings.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),

    /// Scalar comparison against a bound parameter.
    Compare {
        column: String,
        op: CompareOp,
        param: String,
    },

    /// Membership test against a bound list parameter.
    InList {
        column: String,
        param: String,
        negated: bool,
    },

    /// Substring/prefix/suffix match against a bound string parameter.
    Match {
        column: String,
        pattern: TextMatch,
        param: String,
    },
}

/// Comparison operators a driver must support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Text match shapes for [`Predicate::Match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    Contains,
    StartsWith,
    EndsWith,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CompareOp::*;

        match self {
            Eq => "=".fmt(f),
            Ne => "!=".fmt(f),
            Lt => "<".fmt(f),
            Le => "<=".fmt(f),
            Gt => ">".fmt(f),
            Ge => ">=".fmt(f),
        }
    }
}
