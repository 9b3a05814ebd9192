//! Validation results and the property paths that locate them.

use std::fmt;

use serde::Serialize;

/// One segment of a property path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PathSegment {
    /// A plain property.
    Named(String),
    /// An element of a collection property.
    Indexed(String, usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Named(name) => f.write_str(name),
            PathSegment::Indexed(name, index) => write!(f, "{name}[{index}]"),
        }
    }
}

/// An ordered path from the validated root to one property.
///
/// Renders as `names[2].native_name`, which API layers use directly as the
/// error's field identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropertyPath {
    segments: Vec<PathSegment>,
}

impl PropertyPath {
    /// The empty root path.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// A single-segment path.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::root().child(name)
    }

    /// Extend with a plain property segment.
    #[must_use]
    pub fn child(mut self, name: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Named(name.into()));
        self
    }

    /// Extend with an indexed collection segment.
    #[must_use]
    pub fn child_indexed(mut self, name: impl Into<String>, index: usize) -> Self {
        self.segments.push(PathSegment::Indexed(name.into(), index));
        self
    }

    /// Append another path's segments.
    #[must_use]
    pub fn join(mut self, other: PropertyPath) -> Self {
        self.segments.extend(other.segments);
        self
    }

    /// The segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// True for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// One failed validation: a message and where it applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    message: String,
    path: PropertyPath,
}

impl ValidationResult {
    /// Build a result.
    pub fn new(message: impl Into<String>, path: PropertyPath) -> Self {
        Self {
            message: message.into(),
            path,
        }
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the failure applies.
    #[must_use]
    pub fn path(&self) -> &PropertyPath {
        &self.path
    }

    /// The rendered path, usable as an API error field id.
    #[must_use]
    pub fn field_id(&self) -> String {
        self.path.to_string()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}
