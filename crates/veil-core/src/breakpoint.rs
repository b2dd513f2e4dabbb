#![forbid(unsafe_code)]

//! Named screen-size breakpoints and the table mapping them to media conditions.
//!
//! A [`BreakpointTable`] is read-only once handed to an engine. Overrides
//! replace the default table wholesale; there is no merge step, so a partial
//! override simply has no entry for the breakpoints it leaves out.
//!
//! | Breakpoint | Default condition                                  |
//! |------------|----------------------------------------------------|
//! | `xs`       | `(max-width: 575.98px)`                            |
//! | `sm`       | `(min-width: 576px) and (max-width: 767.98px)`     |
//! | `md`       | `(min-width: 768px) and (max-width: 991.98px)`     |
//! | `lg`       | `(min-width: 992px) and (max-width: 1199.98px)`    |
//! | `xl`       | `(min-width: 1200px) and (max-width: 1599.98px)`   |
//! | `xxl`      | `(min-width: 1600px)`                              |

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

/// Responsive breakpoint tiers, ordered from smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Breakpoint {
    /// Extra small: phones in portrait.
    Xs,
    /// Small: phones in landscape.
    Sm,
    /// Medium: tablets.
    Md,
    /// Large: laptops.
    Lg,
    /// Extra large: desktops.
    Xl,
    /// Extra extra large: wide desktops.
    Xxl,
}

impl Breakpoint {
    /// All breakpoints in ascending order.
    pub const ALL: [Breakpoint; 6] = [
        Breakpoint::Xs,
        Breakpoint::Sm,
        Breakpoint::Md,
        Breakpoint::Lg,
        Breakpoint::Xl,
        Breakpoint::Xxl,
    ];

    /// Short label, also used as the serialized table key.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Breakpoint::Xs => "xs",
            Breakpoint::Sm => "sm",
            Breakpoint::Md => "md",
            Breakpoint::Lg => "lg",
            Breakpoint::Xl => "xl",
            Breakpoint::Xxl => "xxl",
        }
    }

    /// The flag bit selecting this breakpoint.
    #[must_use]
    pub const fn flag(self) -> BreakpointFlags {
        match self {
            Breakpoint::Xs => BreakpointFlags::XS,
            Breakpoint::Sm => BreakpointFlags::SM,
            Breakpoint::Md => BreakpointFlags::MD,
            Breakpoint::Lg => BreakpointFlags::LG,
            Breakpoint::Xl => BreakpointFlags::XL,
            Breakpoint::Xxl => BreakpointFlags::XXL,
        }
    }

    /// Condition used by the default table.
    #[must_use]
    pub const fn default_condition(self) -> &'static str {
        match self {
            Breakpoint::Xs => "(max-width: 575.98px)",
            Breakpoint::Sm => "(min-width: 576px) and (max-width: 767.98px)",
            Breakpoint::Md => "(min-width: 768px) and (max-width: 991.98px)",
            Breakpoint::Lg => "(min-width: 992px) and (max-width: 1199.98px)",
            Breakpoint::Xl => "(min-width: 1200px) and (max-width: 1599.98px)",
            Breakpoint::Xxl => "(min-width: 1600px)",
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when parsing a label that names no breakpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBreakpoint(pub String);

impl fmt::Display for UnknownBreakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown breakpoint `{}`", self.0)
    }
}

impl std::error::Error for UnknownBreakpoint {}

impl FromStr for Breakpoint {
    type Err = UnknownBreakpoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Breakpoint::ALL
            .into_iter()
            .find(|bp| bp.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownBreakpoint(s.to_string()))
    }
}

bitflags! {
    /// Set of breakpoint flags that are switched on.
    ///
    /// A set flag asks the engine to consider that breakpoint's condition.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BreakpointFlags: u8 {
        const XS = 1 << 0;
        const SM = 1 << 1;
        const MD = 1 << 2;
        const LG = 1 << 3;
        const XL = 1 << 4;
        const XXL = 1 << 5;
    }
}

impl BreakpointFlags {
    /// Breakpoints whose flag is set, in ascending order.
    pub fn breakpoints(self) -> impl Iterator<Item = Breakpoint> {
        Breakpoint::ALL
            .into_iter()
            .filter(move |bp| self.contains(bp.flag()))
    }
}

impl From<Breakpoint> for BreakpointFlags {
    fn from(bp: Breakpoint) -> Self {
        bp.flag()
    }
}

impl FromIterator<Breakpoint> for BreakpointFlags {
    fn from_iter<I: IntoIterator<Item = Breakpoint>>(iter: I) -> Self {
        iter.into_iter()
            .fold(BreakpointFlags::empty(), |acc, bp| acc | bp.flag())
    }
}

/// Mapping from breakpoint to the media condition that describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BreakpointTable {
    entries: BTreeMap<Breakpoint, String>,
}

impl Default for BreakpointTable {
    fn default() -> Self {
        Breakpoint::ALL
            .into_iter()
            .map(|bp| (bp, bp.default_condition()))
            .collect()
    }
}

impl BreakpointTable {
    /// A table with no entries. Every flag resolves to no condition.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, bp: Breakpoint, condition: impl Into<String>) -> Self {
        self.insert(bp, condition);
        self
    }

    /// Set the condition for `bp`, returning the previous one.
    pub fn insert(&mut self, bp: Breakpoint, condition: impl Into<String>) -> Option<String> {
        self.entries.insert(bp, condition.into())
    }

    /// Condition for `bp`, if the table has one.
    #[must_use]
    pub fn get(&self, bp: Breakpoint) -> Option<&str> {
        self.entries.get(&bp).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, bp: Breakpoint) -> bool {
        self.entries.contains_key(&bp)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending breakpoint order.
    pub fn iter(&self) -> impl Iterator<Item = (Breakpoint, &str)> {
        self.entries.iter().map(|(bp, cond)| (*bp, cond.as_str()))
    }
}

impl<S: Into<String>> FromIterator<(Breakpoint, S)> for BreakpointTable {
    fn from_iter<I: IntoIterator<Item = (Breakpoint, S)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(bp, cond)| (bp, cond.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_str() {
        for bp in Breakpoint::ALL {
            assert_eq!(bp.label().parse::<Breakpoint>(), Ok(bp));
            assert_eq!(bp.to_string(), bp.label());
        }
        assert_eq!(" XXL ".parse::<Breakpoint>(), Ok(Breakpoint::Xxl));
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = "xxxl".parse::<Breakpoint>().unwrap_err();
        assert_eq!(err, UnknownBreakpoint("xxxl".into()));
        assert_eq!(err.to_string(), "unknown breakpoint `xxxl`");
    }

    #[test]
    fn breakpoints_are_ordered_smallest_first() {
        let mut sorted = Breakpoint::ALL;
        sorted.sort();
        assert_eq!(sorted, Breakpoint::ALL);
        assert!(Breakpoint::Xs < Breakpoint::Xxl);
    }

    #[test]
    fn flags_iterate_in_ascending_order() {
        let flags = BreakpointFlags::XXL | BreakpointFlags::XS | BreakpointFlags::MD;
        let bps: Vec<_> = flags.breakpoints().collect();
        assert_eq!(bps, vec![Breakpoint::Xs, Breakpoint::Md, Breakpoint::Xxl]);
    }

    #[test]
    fn flags_collect_from_breakpoints() {
        let flags: BreakpointFlags = [Breakpoint::Sm, Breakpoint::Lg].into_iter().collect();
        assert_eq!(flags, BreakpointFlags::SM | BreakpointFlags::LG);
        assert_eq!(BreakpointFlags::from(Breakpoint::Xl), BreakpointFlags::XL);
        assert_eq!(BreakpointFlags::empty().breakpoints().count(), 0);
    }

    #[test]
    fn default_table_covers_every_breakpoint() {
        let table = BreakpointTable::default();
        assert_eq!(table.len(), 6);
        assert_eq!(table.get(Breakpoint::Xs), Some("(max-width: 575.98px)"));
        assert_eq!(table.get(Breakpoint::Xxl), Some("(min-width: 1600px)"));
        for bp in Breakpoint::ALL {
            assert!(table.contains(bp), "missing {bp}");
        }
    }

    #[test]
    fn override_table_is_not_merged_with_defaults() {
        let table = BreakpointTable::empty().with(Breakpoint::Xs, "(max-width: 640px)");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(Breakpoint::Xs), Some("(max-width: 640px)"));
        assert_eq!(table.get(Breakpoint::Sm), None);
    }

    #[test]
    fn insert_replaces_existing_entry() {
        let mut table = BreakpointTable::default();
        let prev = table.insert(Breakpoint::Md, "(min-width: 800px)");
        assert_eq!(prev.as_deref(), Some(Breakpoint::Md.default_condition()));
        assert_eq!(table.get(Breakpoint::Md), Some("(min-width: 800px)"));
    }

    #[test]
    fn iter_follows_breakpoint_order() {
        let table: BreakpointTable = [
            (Breakpoint::Lg, "lg-cond"),
            (Breakpoint::Xs, "xs-cond"),
        ]
        .into_iter()
        .collect();
        let keys: Vec<_> = table.iter().map(|(bp, _)| bp).collect();
        assert_eq!(keys, vec![Breakpoint::Xs, Breakpoint::Lg]);
        assert!(!table.is_empty());
        assert!(BreakpointTable::empty().is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn table_deserializes_from_label_keyed_map() {
        let table: BreakpointTable =
            serde_json::from_str(r#"{"xs":"(max-width: 640px)","xxl":"(min-width: 1920px)"}"#)
                .expect("valid table");
        assert_eq!(table.get(Breakpoint::Xs), Some("(max-width: 640px)"));
        assert_eq!(table.get(Breakpoint::Xxl), Some("(min-width: 1920px)"));
        assert_eq!(table.get(Breakpoint::Md), None);

        let json = serde_json::to_string(&table).expect("serializable");
        assert_eq!(json, r#"{"xs":"(max-width: 640px)","xxl":"(min-width: 1920px)"}"#);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn table_rejects_unknown_keys() {
        let result: Result<BreakpointTable, _> = serde_json::from_str(r#"{"huge":"x"}"#);
        assert!(result.is_err());
    }
}
