use crate::stmt::Direction;
use crate::{Error, Result};

use std::str::FromStr;

/// One key of a multi-key sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

impl FromStr for SortKey {
    type Err = Error;

    /// Parses `"field"`, `"field ASC"` or `"field DESC"`. The direction
    /// defaults to ascending when omitted.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let Some(field) = parts.next() else {
            return Err(Error::invalid_criteria("empty sort key"));
        };

        let direction = match parts.next() {
            None => Direction::Asc,
            Some(dir) if dir.eq_ignore_ascii_case("asc") => Direction::Asc,
            Some(dir) if dir.eq_ignore_ascii_case("desc") => Direction::Desc,
            Some(other) => {
                return Err(Error::invalid_criteria(format!(
                    "unknown sort direction `{other}`"
                )))
            }
        };

        if parts.next().is_some() {
            return Err(Error::invalid_criteria(format!(
                "malformed sort key `{s}`"
            )));
        }

        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}
