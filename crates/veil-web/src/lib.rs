#![forbid(unsafe_code)]

//! Browser environment for Veil.
//!
//! On `wasm32`, [`WebEnvironment`] implements the environment port over
//! `web_sys::Window` (`matchMedia`, `resize`/`orientationchange` listeners,
//! `setTimeout`), and `VeilVisibility` exposes a complete engine to
//! JavaScript through `wasm-bindgen`.
//!
//! Native builds compile only the target-independent conversions so
//! `cargo check --workspace` stays green off the web.

pub mod convert;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{WebEnvironment, WebVisibility};

pub use convert::{delay_millis, parse_breakpoints};
