#![forbid(unsafe_code)]

//! Condition resolution and evaluation.
//!
//! A [`ConditionSet`] is rebuilt for every decision from either explicit
//! media conditions or the breakpoint flags mapped through a
//! [`BreakpointTable`]. Explicit media always wins: when present, the flags
//! are not consulted at all.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Flag with no table entry | Skipped, no condition produced |
//! | Evaluator error | Counted as "no match" for that condition, logged |
//! | Empty set | `is_match() == false` |

use crate::breakpoint::{BreakpointFlags, BreakpointTable};
use crate::environment::Environment;

/// Explicit media condition input: one string or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaQuery {
    Single(String),
    List(Vec<String>),
}

impl MediaQuery {
    pub fn single(condition: impl Into<String>) -> Self {
        Self::Single(condition.into())
    }

    pub fn list<I, S>(conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(conditions.into_iter().map(Into::into).collect())
    }

    /// Whether this input overrides breakpoint flags.
    ///
    /// A lone empty string counts as "not supplied"; any list does, even an
    /// empty one.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Self::Single(condition) => !condition.is_empty(),
            Self::List(_) => true,
        }
    }

    /// The conditions, normalized to a slice.
    #[must_use]
    pub fn conditions(&self) -> &[String] {
        match self {
            Self::Single(condition) => std::slice::from_ref(condition),
            Self::List(conditions) => conditions,
        }
    }
}

impl From<&str> for MediaQuery {
    fn from(condition: &str) -> Self {
        Self::single(condition)
    }
}

impl From<String> for MediaQuery {
    fn from(condition: String) -> Self {
        Self::Single(condition)
    }
}

impl From<Vec<String>> for MediaQuery {
    fn from(conditions: Vec<String>) -> Self {
        Self::List(conditions)
    }
}

impl From<Vec<&str>> for MediaQuery {
    fn from(conditions: Vec<&str>) -> Self {
        Self::list(conditions)
    }
}

impl<const N: usize> From<[&str; N]> for MediaQuery {
    fn from(conditions: [&str; N]) -> Self {
        Self::list(conditions)
    }
}

/// Where a [`ConditionSet`] was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConditionOrigin {
    /// Explicit media conditions, used verbatim.
    Media,
    /// Truthy breakpoint flags mapped through the table.
    #[default]
    Breakpoints,
}

impl ConditionOrigin {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Media => "media",
            Self::Breakpoints => "breakpoints",
        }
    }
}

/// The conditions evaluated for one decision, combined with logical OR.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConditionSet {
    conditions: Vec<String>,
    origin: ConditionOrigin,
}

impl ConditionSet {
    /// Resolve the active conditions.
    pub fn resolve(
        flags: BreakpointFlags,
        media: Option<&MediaQuery>,
        table: &BreakpointTable,
    ) -> Self {
        if let Some(media) = media.filter(|m| m.is_present()) {
            return Self {
                conditions: media.conditions().to_vec(),
                origin: ConditionOrigin::Media,
            };
        }

        let conditions = flags
            .breakpoints()
            .filter_map(|bp| {
                let condition = table.get(bp);
                if condition.is_none() {
                    tracing::trace!(
                        target: "veil.condition",
                        breakpoint = %bp,
                        "flag has no table entry; ignored"
                    );
                }
                condition.map(str::to_owned)
            })
            .collect();

        Self {
            conditions,
            origin: ConditionOrigin::Breakpoints,
        }
    }

    #[must_use]
    pub fn origin(&self) -> ConditionOrigin {
        self.origin
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.conditions
    }

    /// Evaluate every condition against `env`.
    ///
    /// All conditions are queried even after a match so that evaluator faults
    /// are always surfaced in the log.
    pub fn evaluate<E: Environment + ?Sized>(&self, env: &E) -> MatchOutcome {
        let mut outcome = MatchOutcome {
            evaluated: self.conditions.len(),
            ..MatchOutcome::default()
        };
        for condition in &self.conditions {
            match env.evaluate(condition) {
                Ok(true) => outcome.matched += 1,
                Ok(false) => {}
                Err(err) => {
                    outcome.faults += 1;
                    tracing::warn!(
                        target: "veil.engine",
                        condition = %condition,
                        error = %err,
                        "condition evaluation failed; treating as no match"
                    );
                }
            }
        }
        outcome
    }
}

/// Tally of one evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchOutcome {
    /// Conditions queried.
    pub evaluated: usize,
    /// Conditions that matched.
    pub matched: usize,
    /// Conditions the evaluator failed on.
    pub faults: usize,
}

impl MatchOutcome {
    /// Logical OR over the results. False for an empty set.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.matched > 0
    }
}
