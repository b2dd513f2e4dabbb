#![forbid(unsafe_code)]

//! Runtime: the debounced visibility engine.
//!
//! # Role in Veil
//! `veil-runtime` turns the data model of `veil-core` into a live engine. A
//! [`VisibilityEngine`] subscribes to viewport events through an
//! [`Environment`](veil_core::Environment), collapses bursts of them with a
//! [`Debounced`] scheduler, and raises show/hide callbacks when its decision
//! flips.
//!
//! # Threading
//! Everything here is single-threaded (`Rc`, `Cell`, `RefCell`). The engine
//! runs on whatever event loop drives the environment's listeners and timers.
//!
//! # Tracing targets
//! - `veil.engine`: lifecycle, decisions (`debug`), evaluator faults (`warn`)
//! - `veil.debounce`: timer cancellation and stale timers (`trace`)
//! - `veil.visibility`: transitions when hooks opt in (`info`)

pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod hooks;

pub use config::{DEFAULT_DEBOUNCE, DEFAULT_MAX_LOG_ENTRIES, EngineConfig, InitialCheck};
pub use debounce::Debounced;
pub use engine::{EngineStats, VisibilityDecision, VisibilityEngine, decide};
pub use error::{EngineError, EngineResult};
pub use hooks::{Transition, VisibilityHooks};
