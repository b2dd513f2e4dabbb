#![forbid(unsafe_code)]

//! Test harness for Veil engines.
//!
//! # Role in Veil
//! `veil-harness` makes engines testable without a browser. It provides a
//! [`VirtualEnvironment`] whose clock only moves when the test says so, a
//! [`TransitionRecorder`] for asserting callback sequences, and a seeded
//! [`ViewportStorm`] generator for debounce stress tests.

pub mod recorder;
pub mod viewport;
pub mod viewport_storm;
pub mod virtual_env;

pub use recorder::TransitionRecorder;
pub use viewport::Viewport;
pub use viewport_storm::{StormAction, StormConfig, StormEvent, StormPattern, ViewportStorm};
pub use virtual_env::VirtualEnvironment;
