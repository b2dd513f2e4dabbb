#![forbid(unsafe_code)]

//! Engine configuration.

use std::sync::Arc;
use std::time::Duration;

use veil_core::breakpoint::{Breakpoint, BreakpointFlags, BreakpointTable};
use veil_core::condition::{ConditionSet, MediaQuery};

use crate::hooks::VisibilityHooks;

/// Default debounce window for viewport events.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Default cap on retained [`VisibilityDecision`](crate::engine::VisibilityDecision) entries.
pub const DEFAULT_MAX_LOG_ENTRIES: usize = 1024;

/// When the first decision is made after `create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialCheck {
    /// Decide synchronously inside `create`.
    #[default]
    Immediate,
    /// Route the first decision through the debouncer like any viewport
    /// event; the engine reports visible until the window elapses.
    Debounced,
}

/// Inputs for one visibility engine.
///
/// ```ignore
/// let config = EngineConfig::default()
///     .with_breakpoint(Breakpoint::Xs)
///     .with_invert(true)
///     .on_show(|| println!("now visible"));
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Breakpoints whose conditions hide (or, inverted, show) the content.
    pub flags: BreakpointFlags,

    /// Explicit media conditions. When present, `flags` is ignored.
    pub media: Option<MediaQuery>,

    /// Show when a condition matches instead of hiding.
    pub invert: bool,

    /// Breakpoint → condition table. Shared read-only across engines.
    pub breakpoints: Arc<BreakpointTable>,

    /// Quiet period after the last viewport event before recomputing.
    pub debounce: Duration,

    /// Recompute on the first event of a burst instead of after it.
    pub leading: bool,

    pub initial_check: InitialCheck,

    /// Record a [`VisibilityDecision`](crate::engine::VisibilityDecision) per recomputation.
    pub enable_logging: bool,

    /// Oldest decisions are dropped once the log holds this many (minimum 1).
    pub max_log_entries: usize,

    pub hooks: VisibilityHooks,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            flags: BreakpointFlags::empty(),
            media: None,
            invert: false,
            breakpoints: Arc::new(BreakpointTable::default()),
            debounce: DEFAULT_DEBOUNCE,
            leading: false,
            initial_check: InitialCheck::Immediate,
            enable_logging: false,
            max_log_entries: DEFAULT_MAX_LOG_ENTRIES,
            hooks: VisibilityHooks::default(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the breakpoint flags.
    #[must_use]
    pub fn with_flags(mut self, flags: BreakpointFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Switch on one breakpoint flag.
    #[must_use]
    pub fn with_breakpoint(mut self, bp: Breakpoint) -> Self {
        self.flags |= bp.flag();
        self
    }

    #[must_use]
    pub fn with_media(mut self, media: impl Into<MediaQuery>) -> Self {
        self.media = Some(media.into());
        self
    }

    #[must_use]
    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Override the breakpoint table. The default table is not merged in.
    #[must_use]
    pub fn with_breakpoints(mut self, table: impl Into<Arc<BreakpointTable>>) -> Self {
        self.breakpoints = table.into();
        self
    }

    #[must_use]
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }

    #[must_use]
    pub fn with_debounce_ms(self, ms: u64) -> Self {
        self.with_debounce(Duration::from_millis(ms))
    }

    #[must_use]
    pub fn with_leading(mut self, leading: bool) -> Self {
        self.leading = leading;
        self
    }

    #[must_use]
    pub fn with_initial_check(mut self, initial_check: InitialCheck) -> Self {
        self.initial_check = initial_check;
        self
    }

    #[must_use]
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    #[must_use]
    pub fn with_max_log_entries(mut self, max: usize) -> Self {
        self.max_log_entries = max;
        self
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: VisibilityHooks) -> Self {
        self.hooks = hooks;
        self
    }

    #[must_use]
    pub fn on_show<F: Fn() + 'static>(mut self, callback: F) -> Self {
        self.hooks = self.hooks.on_show(callback);
        self
    }

    #[must_use]
    pub fn on_hide<F: Fn() + 'static>(mut self, callback: F) -> Self {
        self.hooks = self.hooks.on_hide(callback);
        self
    }

    /// Conditions this config evaluates, resolved against its own table.
    #[must_use]
    pub fn condition_set(&self) -> ConditionSet {
        ConditionSet::resolve(self.flags, self.media.as_ref(), &self.breakpoints)
    }
}
