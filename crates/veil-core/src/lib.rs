#![forbid(unsafe_code)]

//! Core: breakpoints, condition sets, and the environment port.
//!
//! # Role in Veil
//! `veil-core` holds the data model shared by every other crate. It knows how
//! to turn breakpoint flags or explicit media conditions into a
//! [`ConditionSet`], and how to evaluate that set against an [`Environment`].
//! It owns no state and schedules nothing; the runtime crate layers the
//! debounced visibility engine on top.

pub mod breakpoint;
pub mod condition;
pub mod environment;

pub use breakpoint::{Breakpoint, BreakpointFlags, BreakpointTable, UnknownBreakpoint};
pub use condition::{ConditionOrigin, ConditionSet, MatchOutcome, MediaQuery};
pub use environment::{
    ConditionError, EnvEvent, Environment, Listener, ListenerId, NullEnvironment, TimerCallback,
    TimerHost, TimerId,
};
