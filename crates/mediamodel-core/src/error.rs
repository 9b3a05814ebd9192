//! Error taxonomy for the mediamodel workspace.
//!
//! Three distinct failure families flow through this one type:
//!
//! - **Configuration errors** are programming mistakes (a convention that
//!   cannot be instantiated, an unsupported public-id key type, a mutation
//!   of a frozen model). They surface at model-build time and are never
//!   recovered.
//! - **Invalid operations** are invariant violations detected by before-save
//!   triggers; they abort the whole batch before anything commits.
//! - **Store errors** wrap whatever the backing store reports.
//!
//! Validation failures are deliberately *not* errors; they are ordinary
//! structured results returned by `mediamodel-validate`.

use std::fmt;

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The mediamodel error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Static misconfiguration detected at model-build time. Fatal to
    /// start-up; indicates a programming mistake, not a runtime condition.
    Configuration(String),
    /// A cross-row invariant violation detected inside a before-save
    /// trigger. Aborts the entire save batch.
    InvalidOperation(String),
    /// The backing store reported a failure.
    Store(String),
    /// Anything that does not fit the other variants.
    Custom(String),
}

impl Error {
    /// Build a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// Build an invalid-operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation(message.into())
    }

    /// Build a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Error::Store(message.into())
    }

    /// True if this is a configuration (start-up) error.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    /// True if this is an invariant violation raised by a trigger.
    #[must_use]
    pub const fn is_invalid_operation(&self) -> bool {
        matches!(self, Error::InvalidOperation(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Error::InvalidOperation(msg) => write!(f, "invalid operation: {msg}"),
            Error::Store(msg) => write!(f, "store error: {msg}"),
            Error::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_family() {
        let err = Error::configuration("bad convention");
        assert_eq!(err.to_string(), "configuration error: bad convention");

        let err = Error::invalid_operation("two primary releases");
        assert_eq!(err.to_string(), "invalid operation: two primary releases");
    }

    #[test]
    fn test_family_predicates() {
        assert!(Error::configuration("x").is_configuration());
        assert!(!Error::configuration("x").is_invalid_operation());
        assert!(Error::invalid_operation("x").is_invalid_operation());
        assert!(!Error::store("x").is_configuration());
    }
}
