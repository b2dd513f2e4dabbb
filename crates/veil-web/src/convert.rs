#![forbid(unsafe_code)]

//! Conversions between browser-facing values and Veil types.
//!
//! Kept target-independent so they are tested on native builds.

use std::time::Duration;

use veil_core::breakpoint::{Breakpoint, BreakpointFlags, UnknownBreakpoint};

/// `setTimeout` delay for `delay`, saturating at `i32::MAX` ms.
#[must_use]
pub fn delay_millis(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis()).unwrap_or(i32::MAX)
}

/// Parse breakpoint names (`"xs"`, `"MD"`, ...) into flags.
pub fn parse_breakpoints<I, S>(names: I) -> Result<BreakpointFlags, UnknownBreakpoint>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names.into_iter().try_fold(BreakpointFlags::empty(), |flags, name| {
        let bp: Breakpoint = name.as_ref().parse()?;
        Ok(flags | bp.flag())
    })
}
