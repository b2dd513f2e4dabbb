#![forbid(unsafe_code)]

//! Veil public facade crate.
//!
//! Re-exports the engine, its configuration and the environment port, and
//! offers a small prelude for day-to-day usage.
//!
//! ```ignore
//! use std::rc::Rc;
//! use veil::prelude::*;
//!
//! let engine = VisibilityEngine::create(
//!     EngineConfig::new()
//!         .with_breakpoint(Breakpoint::Xs)
//!         .on_hide(|| println!("hidden on phones")),
//!     Rc::new(env),
//! );
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use veil_core::{
    Breakpoint, BreakpointFlags, BreakpointTable, ConditionError, ConditionOrigin, ConditionSet,
    EnvEvent, Environment, Listener, ListenerId, MatchOutcome, MediaQuery, NullEnvironment,
    TimerCallback, TimerHost, TimerId, UnknownBreakpoint,
};

// --- Runtime re-exports ----------------------------------------------------

pub use veil_runtime::{
    DEFAULT_DEBOUNCE, DEFAULT_MAX_LOG_ENTRIES, Debounced, EngineConfig, EngineError, EngineStats,
    InitialCheck, Transition, VisibilityDecision, VisibilityEngine, VisibilityHooks, decide,
};

// --- Web re-exports --------------------------------------------------------

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use veil_web::{WebEnvironment, WebVisibility};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Veil.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Engine creation or reconfiguration failed.
    Engine(EngineError),
    /// A breakpoint name did not parse.
    Breakpoint(UnknownBreakpoint),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Engine(err) => write!(f, "{err}"),
            Self::Breakpoint(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Engine(err) => Some(err),
            Self::Breakpoint(err) => Some(err),
        }
    }
}

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl From<UnknownBreakpoint> for Error {
    fn from(err: UnknownBreakpoint) -> Self {
        Self::Breakpoint(err)
    }
}

/// Standard result type for Veil APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Breakpoint, BreakpointFlags, BreakpointTable, EngineConfig, EnvEvent, Environment, Error,
        MediaQuery, Result, Transition, VisibilityEngine, VisibilityHooks,
    };
}
