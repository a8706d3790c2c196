use thiserror::Error;

/// A string failed the checks of a spinguard newtype.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Wrong characters or wrong shape.
    #[error("{field} has an unexpected format: '{value}'")]
    PatternMismatch {
        /// Checked field.
        field: &'static str,
        /// Rejected input.
        value: String,
    },
    /// Too short or too long.
    #[error("{field} length {value} is outside the allowed range")]
    OutOfBounds {
        /// Checked field.
        field: &'static str,
        /// Rejected length, as text.
        value: String,
    },
}
