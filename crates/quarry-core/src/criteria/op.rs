use crate::{Error, Result};

use std::fmt;
use std::str::FromStr;

/// The closed set of comparison operators a condition leaf may use.
///
/// Wire names outside this set are a hard validation error at parse time,
/// never a warn-and-drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Lt,
    Lte,
    Gt,
    Gte,
    Ne,
    In,
    NotIn,
    Contains,
    StartsWith,
    EndsWith,
}

impl Operator {
    /// True for `<`, `<=`, `>`, `>=`.
    pub fn is_ordering(self) -> bool {
        matches!(self, Self::Lt | Self::Lte | Self::Gt | Self::Gte)
    }

    /// True for the substring/prefix/suffix operators.
    pub fn is_text(self) -> bool {
        matches!(self, Self::Contains | Self::StartsWith | Self::EndsWith)
    }

    /// True for the set-membership operators.
    pub fn is_membership(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Lte),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Gte),
            "!=" => Ok(Self::Ne),
            "in" => Ok(Self::In),
            "nin" => Ok(Self::NotIn),
            "contains" => Ok(Self::Contains),
            "startsWith" => Ok(Self::StartsWith),
            "endsWith" => Ok(Self::EndsWith),
            other => Err(Error::unsupported_operator(other)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Operator::*;

        match self {
            Lt => "<".fmt(f),
            Lte => "<=".fmt(f),
            Gt => ">".fmt(f),
            Gte => ">=".fmt(f),
            Ne => "!=".fmt(f),
            In => "in".fmt(f),
            NotIn => "nin".fmt(f),
            Contains => "contains".fmt(f),
            StartsWith => "startsWith".fmt(f),
            EndsWith => "endsWith".fmt(f),
        }
    }
}
