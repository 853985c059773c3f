use std::fmt;

/// Sort direction for a single order-by key.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => "ASC".fmt(f),
            Direction::Desc => "DESC".fmt(f),
        }
    }
}
