use super::Error;

/// Error when a criteria names a comparison operator outside the supported
/// set. Unknown operators are rejected, never silently dropped.
#[derive(Debug)]
pub(super) struct UnsupportedOperatorError {
    pub(super) operator: Box<str>,
}

impl std::error::Error for UnsupportedOperatorError {}

impl core::fmt::Display for UnsupportedOperatorError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unsupported operator `{}`", self.operator)
    }
}

impl Error {
    /// Creates an error naming an operator outside the supported set.
    pub fn unsupported_operator(operator: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnsupportedOperator(
            UnsupportedOperatorError {
                operator: operator.into().into_boxed_str(),
            },
        ))
    }
}
