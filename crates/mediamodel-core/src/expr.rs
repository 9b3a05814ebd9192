//! Typed query-filter predicates.
//!
//! Query filters attached to entity descriptors are never strings. They are
//! small expression trees over boolean properties, so conventions can
//! inspect, combine, and dedup them structurally, and so each store backend
//! translates them to its own dialect at the last moment.

use std::fmt;

/// A dotted property reference, possibly reaching through a navigation
/// (`["primary_release", "is_soft_deleted"]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRef {
    segments: Vec<String>,
}

impl PropertyRef {
    /// Build a reference from path segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True if the path reaches through a navigation.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }
}

impl fmt::Display for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Anything a predicate can be evaluated against: a row image keyed by
/// property name, with navigation paths resolved segment by segment.
pub trait EntityView {
    /// Read the boolean at `path`, or `None` when the path is absent.
    fn bool_value(&self, path: &[String]) -> Option<bool>;
}

/// A boolean filter expression over entity properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// The referenced boolean property holds true.
    IsTrue(PropertyRef),
    /// Logical negation.
    Not(Box<Predicate>),
    /// Logical conjunction.
    And(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    /// `property == true`.
    pub fn property<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::IsTrue(PropertyRef::new(path))
    }

    /// `!property`, the shape every soft-delete filter takes.
    pub fn not_property<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::property(path).negate()
    }

    /// Wrap in a negation.
    #[must_use]
    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Conjoin with another predicate.
    #[must_use]
    pub fn and(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    /// Evaluate against a row image. A missing boolean reads as `false`,
    /// so `!is_soft_deleted` admits rows that never set the flag.
    #[must_use]
    pub fn eval(&self, view: &dyn EntityView) -> bool {
        match self {
            Predicate::IsTrue(path) => view.bool_value(path.segments()).unwrap_or(false),
            Predicate::Not(inner) => !inner.eval(view),
            Predicate::And(left, right) => left.eval(view) && right.eval(view),
        }
    }

    /// Flatten the conjunction tree into its top-level conjuncts.
    #[must_use]
    pub fn conjuncts(&self) -> Vec<&Predicate> {
        let mut out = Vec::new();
        self.collect_conjuncts(&mut out);
        out
    }

    fn collect_conjuncts<'a>(&'a self, out: &mut Vec<&'a Predicate>) {
        match self {
            Predicate::And(left, right) => {
                left.collect_conjuncts(out);
                right.collect_conjuncts(out);
            }
            other => out.push(other),
        }
    }

    /// True if `clause` already appears among the top-level conjuncts.
    ///
    /// Conventions combining filters use this to stay idempotent across
    /// repeated model builds.
    #[must_use]
    pub fn contains_conjunct(&self, clause: &Predicate) -> bool {
        self.conjuncts().iter().any(|c| *c == clause)
    }

    /// Every property path the predicate reads, deduplicated, in first-use
    /// order.
    #[must_use]
    pub fn paths(&self) -> Vec<&PropertyRef> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a PropertyRef>) {
        match self {
            Predicate::IsTrue(path) => {
                if !out.contains(&path) {
                    out.push(path);
                }
            }
            Predicate::Not(inner) => inner.collect_paths(out),
            Predicate::And(left, right) => {
                left.collect_paths(out);
                right.collect_paths(out);
            }
        }
    }

    /// True if the two predicates agree on every assignment of their
    /// referenced paths. Lets tests treat reordered conjunctions as the
    /// same filter.
    ///
    /// Bounded at 63 distinct paths; predicates past that bound report
    /// non-equivalent rather than walk an infeasible truth table.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Predicate) -> bool {
        let mut paths: Vec<&PropertyRef> = self.paths();
        for path in other.paths() {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }

        // Exhaustive over the referenced paths; filters reference a handful
        // of flags at most.
        let n = paths.len();
        if n > 63 {
            return false;
        }
        for assignment in 0..(1u64 << n) {
            let view = AssignmentView {
                paths: &paths,
                assignment,
            };
            if self.eval(&view) != other.eval(&view) {
                return false;
            }
        }
        true
    }

    /// Render a dialect-neutral SQL preview, for tracing and schema dumps.
    /// Store backends do their own translation from the typed tree.
    #[must_use]
    pub fn to_sql(&self, alias: &str) -> String {
        match self {
            Predicate::IsTrue(path) => {
                let column = path
                    .segments()
                    .iter()
                    .map(|s| format!("\"{s}\""))
                    .collect::<Vec<_>>()
                    .join(".");
                format!("{alias}.{column} = 1")
            }
            Predicate::Not(inner) => format!("NOT ({})", inner.to_sql(alias)),
            Predicate::And(left, right) => {
                format!("({} AND {})", left.to_sql(alias), right.to_sql(alias))
            }
        }
    }
}

/// One bit per referenced path, for equivalence checking.
struct AssignmentView<'a> {
    paths: &'a [&'a PropertyRef],
    assignment: u64,
}

impl EntityView for AssignmentView<'_> {
    fn bool_value(&self, path: &[String]) -> Option<bool> {
        self.paths
            .iter()
            .position(|p| p.segments() == path)
            .map(|i| self.assignment & (1u64 << i) != 0)
    }
}
