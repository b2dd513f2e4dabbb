#![forbid(unsafe_code)]

//! Deterministic [`Environment`] with a virtual clock.
//!
//! Timers are queued by `(deadline, arming order)` and only fire when the test
//! calls [`VirtualEnvironment::advance`]. Viewport events are dispatched
//! synchronously by [`VirtualEnvironment::fire`]. Condition results come from
//! one of three sources, checked in order:
//!
//! 1. per-condition scripts (`set_match`, `fail_condition`)
//! 2. the simulated [`Viewport`], when viewport matching is on
//! 3. the default result (`set_default_match`, initially `false`)
//!
//! ```ignore
//! let env = Rc::new(VirtualEnvironment::new());
//! let engine = VisibilityEngine::create(config, Rc::clone(&env));
//! env.set_match("(max-width: 575.98px)", true);
//! env.fire(EnvEvent::Resize);
//! env.advance(Duration::from_millis(100));
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Duration;

use veil_core::environment::{
    ConditionError, EnvEvent, Environment, Listener, ListenerId, TimerCallback, TimerHost, TimerId,
};

use crate::viewport::Viewport;

#[derive(Debug, Clone)]
enum Script {
    Match(bool),
    Fail(String),
}

/// Scriptable single-threaded environment for tests and simulations.
#[derive(Default)]
pub struct VirtualEnvironment {
    now: Cell<Duration>,
    next_timer: Cell<u64>,
    timers: RefCell<BTreeMap<(Duration, u64), TimerCallback>>,
    next_listener: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, EnvEvent, Listener)>>,
    scripts: RefCell<HashMap<String, Script>>,
    default_match: Cell<bool>,
    viewport: Cell<Viewport>,
    viewport_matching: Cell<bool>,
    evaluated: RefCell<Vec<String>>,
    dispatched: Cell<u64>,
    timers_fired: Cell<u64>,
}

impl std::fmt::Debug for VirtualEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualEnvironment")
            .field("now", &self.now.get())
            .field("viewport", &self.viewport.get())
            .field("listeners", &self.listener_count())
            .field("pending_timers", &self.pending_timers())
            .finish()
    }
}

impl VirtualEnvironment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment that answers unscripted conditions from `viewport`.
    #[must_use]
    pub fn with_viewport(viewport: Viewport) -> Self {
        let env = Self::default();
        env.viewport.set(viewport);
        env.viewport_matching.set(true);
        env
    }

    // ------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------

    /// Virtual time since creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Move the clock forward, firing every timer that comes due.
    ///
    /// Timers armed by a firing callback also fire if they fall inside the
    /// window. Returns the number of timers fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now.get() + by;
        let mut fired = 0;
        while let Some((deadline, callback)) = self.pop_due(target) {
            self.now.set(deadline);
            callback();
            fired += 1;
        }
        self.now.set(target);
        self.timers_fired.set(self.timers_fired.get() + fired as u64);
        fired
    }

    /// Shorthand for `advance(Duration::from_millis(ms))`.
    pub fn advance_ms(&self, ms: u64) -> usize {
        self.advance(Duration::from_millis(ms))
    }

    /// Fire timers until none remain, however far away.
    ///
    /// Stops after `limit` timers to stay finite when callbacks keep re-arming.
    pub fn advance_to_idle(&self, limit: usize) -> usize {
        let mut fired = 0;
        while fired < limit {
            let next = self.timers.borrow().keys().next().map(|&(deadline, _)| deadline);
            let Some(deadline) = next else {
                break;
            };
            let by = deadline.saturating_sub(self.now.get());
            fired += self.advance(by);
        }
        fired
    }

    fn pop_due(&self, target: Duration) -> Option<(Duration, TimerCallback)> {
        let mut timers = self.timers.borrow_mut();
        let due = timers
            .first_key_value()
            .is_some_and(|(&(deadline, _), _)| deadline <= target);
        if !due {
            return None;
        }
        timers
            .pop_first()
            .map(|((deadline, _), callback)| (deadline, callback))
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Deadline of the earliest pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.borrow().keys().next().map(|&(deadline, _)| deadline)
    }

    /// Timers fired since creation.
    #[must_use]
    pub fn timers_fired(&self) -> u64 {
        self.timers_fired.get()
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Dispatch `event` to every listener registered for it.
    ///
    /// Listeners are snapshotted first, so a listener may add or remove
    /// listeners while the dispatch runs.
    pub fn fire(&self, event: EnvEvent) -> usize {
        let targets: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, e, _)| *e == event)
            .map(|(_, _, listener)| Rc::clone(listener))
            .collect();
        self.dispatched.set(self.dispatched.get() + 1);
        for listener in &targets {
            listener(event);
        }
        targets.len()
    }

    /// Resize the simulated viewport and dispatch `resize`.
    pub fn resize_to(&self, width: u32, height: u32) {
        self.viewport.set(Viewport::new(width, height));
        self.fire(EnvEvent::Resize);
    }

    /// Swap the viewport's axes and dispatch `orientationchange`.
    pub fn rotate(&self) {
        self.viewport.set(self.viewport.get().rotated());
        self.fire(EnvEvent::OrientationChange);
    }

    /// Change the viewport without dispatching an event.
    pub fn set_viewport(&self, viewport: Viewport) {
        self.viewport.set(viewport);
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    /// Answer unscripted conditions from the viewport instead of the default.
    pub fn set_viewport_matching(&self, enabled: bool) {
        self.viewport_matching.set(enabled);
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Listeners currently registered for `event`.
    #[must_use]
    pub fn listeners_for(&self, event: EnvEvent) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(_, e, _)| *e == event)
            .count()
    }

    /// Listener registrations since creation, including removed ones.
    #[must_use]
    pub fn listeners_registered(&self) -> u64 {
        self.next_listener.get()
    }

    /// Events dispatched since creation.
    #[must_use]
    pub fn events_dispatched(&self) -> u64 {
        self.dispatched.get()
    }

    // ------------------------------------------------------------------
    // Condition scripting
    // ------------------------------------------------------------------

    pub fn set_match(&self, condition: &str, matches: bool) {
        self.scripts
            .borrow_mut()
            .insert(condition.to_string(), Script::Match(matches));
    }

    /// Result for conditions that are neither scripted nor viewport-matched.
    pub fn set_default_match(&self, matches: bool) {
        self.default_match.set(matches);
    }

    /// Make the evaluator fail for `condition`.
    pub fn fail_condition(&self, condition: &str, reason: &str) {
        self.scripts
            .borrow_mut()
            .insert(condition.to_string(), Script::Fail(reason.to_string()));
    }

    /// Drop the script for `condition`.
    pub fn clear_condition(&self, condition: &str) {
        self.scripts.borrow_mut().remove(condition);
    }

    /// Total evaluator calls.
    #[must_use]
    pub fn evaluation_count(&self) -> usize {
        self.evaluated.borrow().len()
    }

    /// Every condition evaluated so far, in call order.
    #[must_use]
    pub fn evaluated_conditions(&self) -> Vec<String> {
        self.evaluated.borrow().clone()
    }

    pub fn clear_evaluations(&self) {
        self.evaluated.borrow_mut().clear();
    }
}

impl TimerHost for VirtualEnvironment {
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let seq = self.next_timer.get();
        self.next_timer.set(seq + 1);
        self.timers
            .borrow_mut()
            .insert((self.now.get() + delay, seq), callback);
        TimerId::new(seq)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.timers
            .borrow_mut()
            .retain(|&(_, seq), _| seq != id.get());
    }
}

impl Environment for VirtualEnvironment {
    fn evaluate(&self, condition: &str) -> Result<bool, ConditionError> {
        self.evaluated.borrow_mut().push(condition.to_string());
        let script = self.scripts.borrow().get(condition).cloned();
        match script {
            Some(Script::Match(matches)) => Ok(matches),
            Some(Script::Fail(reason)) => Err(ConditionError::new(condition, reason)),
            None if self.viewport_matching.get() => self
                .viewport
                .get()
                .matches(condition)
                .map_err(|reason| ConditionError::new(condition, reason)),
            None => Ok(self.default_match.get()),
        }
    }

    fn add_listener(&self, event: EnvEvent, listener: Listener) -> ListenerId {
        let id = ListenerId::new(self.next_listener.get());
        self.next_listener.set(id.get() + 1);
        self.listeners.borrow_mut().push((id, event, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners
            .borrow_mut()
            .retain(|(existing, _, _)| *existing != id);
    }
}
