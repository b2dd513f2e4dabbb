#![forbid(unsafe_code)]

//! The environment port.
//!
//! The engine never touches a real viewport. Everything it needs from the
//! host (evaluating a media condition, hearing about viewport changes, and
//! deferring work by a timer) goes through the traits in this module, so the
//! same engine runs against a browser window, a deterministic test double, or
//! [`NullEnvironment`] when no live viewport exists.
//!
//! # Threading
//!
//! The port is single-threaded: listeners and timer callbacks are `Rc`/`Box`
//! closures invoked on the host's event thread, one at a time.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Viewport change notifications the engine subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvEvent {
    /// The viewport was resized.
    Resize,
    /// The device orientation changed.
    OrientationChange,
}

impl EnvEvent {
    /// Every event kind, in subscription order.
    pub const ALL: [EnvEvent; 2] = [EnvEvent::Resize, EnvEvent::OrientationChange];

    /// DOM event name for this kind.
    #[must_use]
    pub const fn dom_name(self) -> &'static str {
        match self {
            EnvEvent::Resize => "resize",
            EnvEvent::OrientationChange => "orientationchange",
        }
    }
}

impl fmt::Display for EnvEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dom_name())
    }
}

/// Handle for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Handle for an armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Callback invoked for a viewport change.
pub type Listener = Rc<dyn Fn(EnvEvent)>;

/// Callback run once when a timer elapses.
pub type TimerCallback = Box<dyn FnOnce()>;

/// A condition the environment could not evaluate.
///
/// The engine treats this as "no match" for the one condition and keeps
/// evaluating the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionError {
    condition: String,
    reason: String,
}

impl ConditionError {
    pub fn new(condition: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            reason: reason.into(),
        }
    }

    /// The condition string that failed.
    #[must_use]
    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// Evaluator-supplied description of the failure.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for ConditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "condition `{}` could not be evaluated: {}",
            self.condition, self.reason
        )
    }
}

impl std::error::Error for ConditionError {}

/// Deferred-callback timers.
pub trait TimerHost {
    /// Run `callback` once after `delay`, unless cleared first.
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId;

    /// Cancel a timer. Unknown or already-fired ids are ignored.
    fn clear_timeout(&self, id: TimerId);
}

/// Everything the visibility engine consumes from its host.
pub trait Environment: TimerHost {
    /// Whether `condition` currently matches the viewport.
    fn evaluate(&self, condition: &str) -> Result<bool, ConditionError>;

    /// Subscribe `listener` to `event`.
    fn add_listener(&self, event: EnvEvent, listener: Listener) -> ListenerId;

    /// Unsubscribe a listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}

/// Environment with no live viewport.
///
/// Every condition reports "no match", listeners are accepted but never
/// invoked, and timers never fire. Useful for headless rendering, where the
/// engine keeps its initial (visible) state.
#[derive(Debug, Default)]
pub struct NullEnvironment {
    next_id: Cell<u64>,
}

impl NullEnvironment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl TimerHost for NullEnvironment {
    fn set_timeout(&self, _delay: Duration, _callback: TimerCallback) -> TimerId {
        TimerId::new(self.next())
    }

    fn clear_timeout(&self, _id: TimerId) {}
}

impl Environment for NullEnvironment {
    fn evaluate(&self, _condition: &str) -> Result<bool, ConditionError> {
        Ok(false)
    }

    fn add_listener(&self, _event: EnvEvent, _listener: Listener) -> ListenerId {
        ListenerId::new(self.next())
    }

    fn remove_listener(&self, _id: ListenerId) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_names_match_browser_events() {
        assert_eq!(EnvEvent::Resize.dom_name(), "resize");
        assert_eq!(EnvEvent::OrientationChange.dom_name(), "orientationchange");
        assert_eq!(EnvEvent::OrientationChange.to_string(), "orientationchange");
    }

    #[test]
    fn null_environment_never_matches() {
        let env = NullEnvironment::new();
        assert_eq!(env.evaluate("(max-width: 575.98px)"), Ok(false));
        assert_eq!(env.evaluate("not a query"), Ok(false));
    }

    #[test]
    fn null_environment_hands_out_distinct_ids() {
        let env = NullEnvironment::new();
        let a = env.add_listener(EnvEvent::Resize, Rc::new(|_| {}));
        let b = env.add_listener(EnvEvent::Resize, Rc::new(|_| {}));
        let t = env.set_timeout(Duration::from_millis(5), Box::new(|| {}));
        assert_ne!(a, b);
        assert_ne!(t.get(), a.get());
        env.remove_listener(a);
        env.clear_timeout(t);
    }

    #[test]
    fn condition_error_display() {
        let err = ConditionError::new("(bogus", "unbalanced parenthesis");
        assert_eq!(err.condition(), "(bogus");
        assert_eq!(err.reason(), "unbalanced parenthesis");
        assert_eq!(
            err.to_string(),
            "condition `(bogus` could not be evaluated: unbalanced parenthesis"
        );
    }
}
