#![forbid(unsafe_code)]

//! Visibility engine.
//!
//! Decides whether content is visible and raises show/hide notifications
//! when that decision flips.
//!
//! # Decision Rule
//!
//! 1) Resolve the [`ConditionSet`] (explicit media verbatim, else truthy
//!    breakpoint flags through the table).
//! 2) Evaluate every condition through the environment; faults count as
//!    "no match".
//! 3) `is_match` = any condition matched (false when the set is empty).
//! 4) `visible` = `is_match` when inverted, `!is_match` otherwise.
//! 5) If `visible` differs from the current state, store it and fire
//!    `on_show`/`on_hide`. Otherwise do nothing.
//!
//! # Lifecycle
//!
//! `create` subscribes to [`EnvEvent::Resize`] and
//! [`EnvEvent::OrientationChange`], routes every event through a
//! [`Debounced`] scheduler, and runs the initial check. `dispose` (or
//! dropping the handle) removes both listeners and clears the pending
//! debounce timer, so no decision runs afterwards.
//!
//! # Invariants
//!
//! - `is_visible` starts `true` and is only written by a recomputation.
//! - Callbacks fire only on an actual flip, never on re-affirmation.
//! - Listener and timer closures hold `Weak` references; a dropped engine is
//!   never revived by a late event.
//! - No `RefCell` borrow is held while user callbacks run.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use veil_core::condition::{ConditionOrigin, ConditionSet};
use veil_core::environment::{EnvEvent, Environment, Listener, ListenerId};

use crate::config::{EngineConfig, InitialCheck};
use crate::debounce::Debounced;
use crate::error::{EngineError, EngineResult};
use crate::hooks::{Transition, VisibilityHooks};

/// Visibility for a match result.
#[inline]
#[must_use]
pub const fn decide(is_match: bool, invert: bool) -> bool {
    if invert { is_match } else { !is_match }
}

/// Counters for one engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Viewport events received.
    pub events: u64,
    /// Decisions made.
    pub recomputations: u64,
    /// Decisions that flipped visibility.
    pub transitions: u64,
    pub shows: u64,
    pub hides: u64,
    /// Conditions the evaluator failed on, across all decisions.
    pub evaluator_faults: u64,
}

/// Record of one recomputation (kept when logging is enabled).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibilityDecision {
    /// Recomputation index, starting at 0.
    pub index: u64,
    pub origin: ConditionOrigin,
    /// Conditions evaluated.
    pub conditions: usize,
    pub matched: usize,
    pub faults: usize,
    pub invert: bool,
    pub was_visible: bool,
    pub is_visible: bool,
}

impl VisibilityDecision {
    /// The flip this decision caused, if any.
    #[must_use]
    pub fn transition(&self) -> Option<Transition> {
        (self.was_visible != self.is_visible).then(|| Transition::from_visibility(self.is_visible))
    }

    #[must_use]
    pub fn is_match(&self) -> bool {
        self.matched > 0
    }
}

struct EngineInner {
    env: Rc<dyn Environment>,
    config: RefCell<EngineConfig>,
    visible: Cell<bool>,
    disposed: Cell<bool>,
    listeners: RefCell<Vec<ListenerId>>,
    scheduler: RefCell<Option<Debounced<(), dyn Environment>>>,
    stats: Cell<EngineStats>,
    decisions: RefCell<VecDeque<VisibilityDecision>>,
}

impl EngineInner {
    fn install(self: &Rc<Self>) {
        let (window, leading, initial_check) = {
            let cfg = self.config.borrow();
            (cfg.debounce, cfg.leading, cfg.initial_check)
        };

        let weak = Rc::downgrade(self);
        let scheduler = Debounced::wrap(
            Rc::clone(&self.env),
            move |()| {
                if let Some(inner) = weak.upgrade() {
                    inner.recompute();
                }
            },
            window,
            leading,
        );
        *self.scheduler.borrow_mut() = Some(scheduler.clone());

        let mut ids = Vec::with_capacity(EnvEvent::ALL.len());
        for event in EnvEvent::ALL {
            let weak = Rc::downgrade(self);
            let listener: Listener = Rc::new(move |event| {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_event(event);
                }
            });
            ids.push(self.env.add_listener(event, listener));
        }
        *self.listeners.borrow_mut() = ids;

        tracing::debug!(
            target: "veil.engine",
            window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
            leading,
            initial_check = ?initial_check,
            "engine installed"
        );

        match initial_check {
            InitialCheck::Immediate => {
                self.recompute();
            }
            InitialCheck::Debounced => scheduler.trigger(()),
        }
    }

    fn teardown(&self) {
        let ids = std::mem::take(&mut *self.listeners.borrow_mut());
        for id in ids {
            self.env.remove_listener(id);
        }
        let scheduler = self.scheduler.borrow_mut().take();
        if let Some(scheduler) = scheduler {
            scheduler.cancel();
        }
    }

    fn handle_event(&self, event: EnvEvent) {
        if self.disposed.get() {
            return;
        }
        self.bump(|s| s.events += 1);
        tracing::trace!(target: "veil.engine", event = event.dom_name(), "viewport event");
        let scheduler = self.scheduler.borrow().clone();
        if let Some(scheduler) = scheduler {
            scheduler.trigger(());
        }
    }

    fn bump(&self, f: impl FnOnce(&mut EngineStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }

    fn recompute(&self) -> Option<Transition> {
        if self.disposed.get() {
            return None;
        }

        let (set, invert, log_cap) = {
            let cfg = self.config.borrow();
            let log_cap = cfg.enable_logging.then_some(cfg.max_log_entries.max(1));
            (cfg.condition_set(), cfg.invert, log_cap)
        };
        let outcome = set.evaluate(&*self.env);
        let was_visible = self.visible.get();
        let is_visible = decide(outcome.is_match(), invert);
        let index = self.stats.get().recomputations;

        self.bump(|s| {
            s.recomputations += 1;
            s.evaluator_faults += outcome.faults as u64;
        });

        tracing::debug!(
            target: "veil.engine",
            idx = index,
            origin = set.origin().as_str(),
            conditions = outcome.evaluated,
            matched = outcome.matched,
            faults = outcome.faults,
            invert,
            was_visible,
            is_visible,
            "visibility decision"
        );

        if let Some(cap) = log_cap {
            let mut log = self.decisions.borrow_mut();
            while log.len() >= cap {
                log.pop_front();
            }
            log.push_back(VisibilityDecision {
                index,
                origin: set.origin(),
                conditions: outcome.evaluated,
                matched: outcome.matched,
                faults: outcome.faults,
                invert,
                was_visible,
                is_visible,
            });
        }

        if is_visible == was_visible {
            return None;
        }

        self.visible.set(is_visible);
        let transition = Transition::from_visibility(is_visible);
        self.bump(|s| {
            s.transitions += 1;
            match transition {
                Transition::Shown => s.shows += 1,
                Transition::Hidden => s.hides += 1,
            }
        });

        let hooks = self.config.borrow().hooks.clone();
        hooks.fire(transition);
        Some(transition)
    }

    fn dispose(&self) -> bool {
        if self.disposed.replace(true) {
            return false;
        }
        self.teardown();
        tracing::debug!(target: "veil.engine", "engine disposed");
        true
    }
}

/// Handle to a running visibility engine.
///
/// Dropping the handle disposes the engine.
pub struct VisibilityEngine {
    inner: Rc<EngineInner>,
}

impl std::fmt::Debug for VisibilityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityEngine")
            .field("is_visible", &self.inner.visible.get())
            .field("disposed", &self.inner.disposed.get())
            .field("stats", &self.inner.stats.get())
            .finish()
    }
}

impl VisibilityEngine {
    /// Subscribe to viewport events and run the initial check.
    ///
    /// Conditions are not validated; each one is handed to the environment
    /// as is, and a condition it cannot evaluate counts as no match.
    ///
    /// With [`InitialCheck::Immediate`] a transition away from the initial
    /// visible state fires its callback before this returns.
    pub fn create<E>(config: EngineConfig, env: Rc<E>) -> Self
    where
        E: Environment + 'static,
    {
        let env: Rc<dyn Environment> = env;
        let inner = Rc::new(EngineInner {
            env,
            config: RefCell::new(config),
            visible: Cell::new(true),
            disposed: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
            scheduler: RefCell::new(None),
            stats: Cell::new(EngineStats::default()),
            decisions: RefCell::new(VecDeque::new()),
        });
        inner.install();
        Self { inner }
    }

    /// Current decision.
    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.inner.visible.get()
    }

    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Whether a debounced recomputation is waiting for its window.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.inner
            .scheduler
            .borrow()
            .as_ref()
            .is_some_and(|s| s.is_pending())
    }

    /// Unsubscribe from viewport events and cancel any pending recomputation.
    ///
    /// Idempotent.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Recompute synchronously, bypassing the debouncer.
    ///
    /// Returns the transition, if the decision flipped. No-op once disposed.
    pub fn recompute(&self) -> Option<Transition> {
        self.inner.recompute()
    }

    /// Replace every input, keeping the current visibility.
    ///
    /// Listeners and the pending timer are torn down and re-created, then the
    /// initial check runs again. Callbacks fire only if the new inputs flip
    /// the current state.
    pub fn reconfigure(&self, config: EngineConfig) -> EngineResult<()> {
        if self.inner.disposed.get() {
            return Err(EngineError::Disposed);
        }
        self.inner.teardown();
        *self.inner.config.borrow_mut() = config;
        self.inner.install();
        Ok(())
    }

    /// Swap the show callback without touching subscriptions.
    pub fn set_on_show<F: Fn() + 'static>(&self, callback: F) {
        self.inner
            .config
            .borrow_mut()
            .hooks
            .set_on_show(Some(Rc::new(callback)));
    }

    /// Swap the hide callback without touching subscriptions.
    pub fn set_on_hide<F: Fn() + 'static>(&self, callback: F) {
        self.inner
            .config
            .borrow_mut()
            .hooks
            .set_on_hide(Some(Rc::new(callback)));
    }

    /// Replace both callbacks.
    pub fn set_hooks(&self, hooks: VisibilityHooks) {
        self.inner.config.borrow_mut().hooks = hooks;
    }

    /// Snapshot of the current configuration.
    #[must_use]
    pub fn config(&self) -> EngineConfig {
        self.inner.config.borrow().clone()
    }

    /// The conditions a recomputation would evaluate right now.
    #[must_use]
    pub fn conditions(&self) -> ConditionSet {
        self.inner.config.borrow().condition_set()
    }

    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.inner.stats.get()
    }

    /// Retained decisions, oldest first (empty unless logging is enabled).
    ///
    /// At most `max_log_entries` are kept.
    #[must_use]
    pub fn decisions(&self) -> Vec<VisibilityDecision> {
        self.inner.decisions.borrow().iter().cloned().collect()
    }

    pub fn clear_decisions(&self) {
        self.inner.decisions.borrow_mut().clear();
    }
}

impl Drop for VisibilityEngine {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use veil_core::breakpoint::{Breakpoint, BreakpointTable};
    use veil_core::environment::{
        ConditionError, TimerCallback, TimerHost, TimerId,
    };

    use super::*;
    use crate::debounce::tests::ManualTimers;

    #[derive(Default)]
    struct TestEnv {
        timers: ManualTimers,
        matches: RefCell<HashMap<String, bool>>,
        listeners: RefCell<Vec<(ListenerId, EnvEvent, Listener)>>,
        next_listener: Cell<u64>,
    }

    impl TestEnv {
        fn set(&self, condition: &str, matches: bool) {
            self.matches
                .borrow_mut()
                .insert(condition.to_string(), matches);
        }

        fn fire(&self, event: EnvEvent) {
            let targets: Vec<Listener> = self
                .listeners
                .borrow()
                .iter()
                .filter(|(_, e, _)| *e == event)
                .map(|(_, _, l)| Rc::clone(l))
                .collect();
            for listener in targets {
                listener(event);
            }
        }

        fn listener_count(&self) -> usize {
            self.listeners.borrow().len()
        }
    }

    impl TimerHost for TestEnv {
        fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId {
            self.timers.set_timeout(delay, callback)
        }
        fn clear_timeout(&self, id: TimerId) {
            self.timers.clear_timeout(id);
        }
    }

    impl Environment for TestEnv {
        fn evaluate(&self, condition: &str) -> Result<bool, ConditionError> {
            Ok(self.matches.borrow().get(condition).copied().unwrap_or(false))
        }
        fn add_listener(&self, event: EnvEvent, listener: Listener) -> ListenerId {
            let id = ListenerId::new(self.next_listener.get());
            self.next_listener.set(id.get() + 1);
            self.listeners.borrow_mut().push((id, event, listener));
            id
        }
        fn remove_listener(&self, id: ListenerId) {
            self.listeners.borrow_mut().retain(|(lid, _, _)| *lid != id);
        }
    }

    const XS: &str = "(max-width: 575.98px)";

    fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, move || c.set(c.get() + 1))
    }

    #[test]
    fn decide_truth_table() {
        assert!(decide(false, false));
        assert!(!decide(true, false));
        assert!(!decide(false, true));
        assert!(decide(true, true));
    }

    #[test]
    fn no_conditions_is_visible() {
        let env = Rc::new(TestEnv::default());
        let engine = VisibilityEngine::create(EngineConfig::default(), Rc::clone(&env));
        assert!(engine.is_visible());
        env.fire(EnvEvent::Resize);
        env.timers.advance(Duration::from_millis(100));
        assert!(engine.is_visible());
        assert_eq!(engine.stats().recomputations, 2);
        assert_eq!(engine.stats().transitions, 0);
    }

    #[test]
    fn no_conditions_inverted_is_hidden() {
        let env = Rc::new(TestEnv::default());
        let engine =
            VisibilityEngine::create(EngineConfig::default().with_invert(true), env);
        assert!(!engine.is_visible());
    }

    #[test]
    fn matching_breakpoint_hides_immediately_on_create() {
        let env = Rc::new(TestEnv::default());
        env.set(XS, true);
        let (hides, on_hide) = counter();
        let (shows, on_show) = counter();
        let cfg = EngineConfig::new()
            .with_breakpoint(Breakpoint::Xs)
            .on_hide(on_hide)
            .on_show(on_show);
        let engine = VisibilityEngine::create(cfg, env);
        assert!(!engine.is_visible());
        assert_eq!(hides.get(), 1);
        assert_eq!(shows.get(), 0);
    }

    #[test]
    fn recompute_is_idempotent_for_unchanged_match() {
        let env = Rc::new(TestEnv::default());
        env.set(XS, true);
        let (hides, on_hide) = counter();
        let cfg = EngineConfig::new()
            .with_breakpoint(Breakpoint::Xs)
            .on_hide(on_hide);
        let engine = VisibilityEngine::create(cfg, Rc::clone(&env));
        for _ in 0..5 {
            assert_eq!(engine.recompute(), None);
        }
        assert_eq!(hides.get(), 1);
        assert_eq!(engine.stats().recomputations, 6);
    }

    #[test]
    fn events_are_debounced() {
        let env = Rc::new(TestEnv::default());
        let engine = VisibilityEngine::create(
            EngineConfig::new().with_breakpoint(Breakpoint::Xs),
            Rc::clone(&env),
        );
        env.set(XS, true);
        for _ in 0..10 {
            env.fire(EnvEvent::Resize);
            env.timers.advance(Duration::from_millis(10));
        }
        assert!(engine.is_visible(), "window still open");
        assert!(engine.has_pending());
        env.timers.advance(Duration::from_millis(100));
        assert!(!engine.is_visible());
        assert_eq!(engine.stats().events, 10);
        assert_eq!(engine.stats().recomputations, 2);
    }

    #[test]
    fn orientation_change_triggers_recompute() {
        let env = Rc::new(TestEnv::default());
        let engine = VisibilityEngine::create(
            EngineConfig::new().with_media("(orientation: portrait)"),
            Rc::clone(&env),
        );
        env.set("(orientation: portrait)", true);
        env.fire(EnvEvent::OrientationChange);
        env.timers.advance(Duration::from_millis(100));
        assert!(!engine.is_visible());
    }

    #[test]
    fn dispose_removes_listeners_and_pending_timer() {
        let env = Rc::new(TestEnv::default());
        let (hides, on_hide) = counter();
        let engine = VisibilityEngine::create(
            EngineConfig::new()
                .with_breakpoint(Breakpoint::Xs)
                .on_hide(on_hide),
            Rc::clone(&env),
        );
        assert_eq!(env.listener_count(), 2);

        env.set(XS, true);
        env.fire(EnvEvent::Resize);
        assert_eq!(env.timers.armed(), 1);
        engine.dispose();
        assert_eq!(env.listener_count(), 0);
        assert_eq!(env.timers.armed(), 0);

        env.timers.advance(Duration::from_secs(1));
        assert_eq!(hides.get(), 0);
        assert!(engine.is_visible());
        assert!(engine.is_disposed());
        assert_eq!(engine.recompute(), None);

        engine.dispose();
    }

    #[test]
    fn drop_disposes() {
        let env = Rc::new(TestEnv::default());
        let engine = VisibilityEngine::create(EngineConfig::default(), Rc::clone(&env));
        env.fire(EnvEvent::Resize);
        drop(engine);
        assert_eq!(env.listener_count(), 0);
        assert_eq!(env.timers.armed(), 0);
    }

    #[test]
    fn callbacks_swap_without_resubscribing() {
        let env = Rc::new(TestEnv::default());
        let engine = VisibilityEngine::create(
            EngineConfig::new()
                .with_breakpoint(Breakpoint::Xs)
                .on_hide(|| panic!("stale callback")),
            Rc::clone(&env),
        );
        let (hides, on_hide) = counter();
        engine.set_on_hide(on_hide);
        assert_eq!(env.listener_count(), 2);
        assert_eq!(env.next_listener.get(), 2, "no new registrations");

        env.set(XS, true);
        env.fire(EnvEvent::Resize);
        env.timers.advance(Duration::from_millis(100));
        assert_eq!(hides.get(), 1);
    }

    #[test]
    fn reconfigure_keeps_state_continuity() {
        let env = Rc::new(TestEnv::default());
        env.set(XS, true);
        let (hides, on_hide) = counter();
        let (shows, on_show) = counter();
        let engine = VisibilityEngine::create(
            EngineConfig::new()
                .with_breakpoint(Breakpoint::Xs)
                .on_hide(on_hide)
                .on_show(on_show),
            Rc::clone(&env),
        );
        assert!(!engine.is_visible());
        let hooks = engine.config().hooks;

        // Same decision under the new inputs: no callback.
        engine
            .reconfigure(
                EngineConfig::new()
                    .with_media(XS)
                    .with_hooks(hooks.clone()),
            )
            .unwrap();
        assert!(!engine.is_visible());
        assert_eq!((shows.get(), hides.get()), (0, 1));
        assert_eq!(env.listener_count(), 2);

        // Inverting flips it.
        engine
            .reconfigure(
                EngineConfig::new()
                    .with_media(XS)
                    .with_invert(true)
                    .with_hooks(hooks),
            )
            .unwrap();
        assert!(engine.is_visible());
        assert_eq!((shows.get(), hides.get()), (1, 1));
    }

    #[test]
    fn reconfigure_after_dispose_fails() {
        let env = Rc::new(TestEnv::default());
        let engine = VisibilityEngine::create(EngineConfig::default(), env);
        engine.dispose();
        assert_eq!(
            engine.reconfigure(EngineConfig::default()),
            Err(EngineError::Disposed)
        );
    }

    #[test]
    fn blank_media_entries_reach_the_environment() {
        let env = Rc::new(TestEnv::default());
        env.set(" ", true);
        let engine = VisibilityEngine::create(
            EngineConfig::new().with_media(["(a)", " "]),
            Rc::clone(&env),
        );
        assert!(!engine.is_visible());
        assert_eq!(env.listener_count(), 2);
        assert_eq!(engine.conditions().len(), 2);
    }

    #[test]
    fn deferred_initial_check_waits_for_window() {
        let env = Rc::new(TestEnv::default());
        env.set(XS, true);
        let engine = VisibilityEngine::create(
            EngineConfig::new()
                .with_breakpoint(Breakpoint::Xs)
                .with_initial_check(InitialCheck::Debounced),
            Rc::clone(&env),
        );
        assert!(engine.is_visible());
        assert!(engine.has_pending());
        env.timers.advance(Duration::from_millis(100));
        assert!(!engine.is_visible());
    }

    #[test]
    fn leading_edge_recomputes_on_first_event() {
        let env = Rc::new(TestEnv::default());
        let engine = VisibilityEngine::create(
            EngineConfig::new()
                .with_breakpoint(Breakpoint::Xs)
                .with_leading(true),
            Rc::clone(&env),
        );
        env.set(XS, true);
        env.fire(EnvEvent::Resize);
        assert!(!engine.is_visible(), "leading call runs immediately");
        env.set(XS, false);
        env.fire(EnvEvent::Resize);
        env.timers.advance(Duration::from_millis(100));
        assert!(!engine.is_visible(), "trailing edge is silent");
        assert_eq!(engine.stats().recomputations, 2);
    }

    #[test]
    fn decision_log_records_each_recomputation() {
        let env = Rc::new(TestEnv::default());
        let table = BreakpointTable::empty().with(Breakpoint::Md, "(md)");
        let engine = VisibilityEngine::create(
            EngineConfig::new()
                .with_breakpoint(Breakpoint::Md)
                .with_breakpoints(table)
                .with_logging(true),
            Rc::clone(&env),
        );
        env.set("(md)", true);
        engine.recompute();
        engine.recompute();

        let log = engine.decisions();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0].transition(), None);
        assert_eq!(log[1].transition(), Some(Transition::Hidden));
        assert!(log[1].is_match());
        assert_eq!(log[2].transition(), None);
        assert_eq!(log[2].index, 2);
        assert_eq!(log[2].origin, ConditionOrigin::Breakpoints);

        engine.clear_decisions();
        assert!(engine.decisions().is_empty());
    }

    #[test]
    fn decision_log_drops_oldest_entries_at_capacity() {
        let env = Rc::new(TestEnv::default());
        let engine = VisibilityEngine::create(
            EngineConfig::new()
                .with_media("(md)")
                .with_logging(true)
                .with_max_log_entries(2),
            Rc::clone(&env),
        );
        for _ in 0..4 {
            engine.recompute();
        }

        let log = engine.decisions();
        assert_eq!(log.len(), 2);
        assert_eq!((log[0].index, log[1].index), (3, 4));
        assert_eq!(engine.stats().recomputations, 5);
    }

    #[test]
    fn zero_log_capacity_keeps_latest_decision() {
        let env = Rc::new(TestEnv::default());
        let engine = VisibilityEngine::create(
            EngineConfig::new()
                .with_logging(true)
                .with_max_log_entries(0),
            Rc::clone(&env),
        );
        engine.recompute();
        let log = engine.decisions();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].index, 1);
    }

    #[test]
    fn callback_may_dispose_engine() {
        let env = Rc::new(TestEnv::default());
        let slot: Rc<RefCell<Option<VisibilityEngine>>> = Rc::new(RefCell::new(None));
        let engine = VisibilityEngine::create(
            EngineConfig::new().with_breakpoint(Breakpoint::Xs),
            Rc::clone(&env),
        );
        {
            let slot = Rc::clone(&slot);
            engine.set_on_hide(move || {
                if let Some(engine) = slot.borrow().as_ref() {
                    engine.dispose();
                }
            });
        }
        *slot.borrow_mut() = Some(engine);

        env.set(XS, true);
        env.fire(EnvEvent::Resize);
        env.timers.advance(Duration::from_millis(100));

        let engine = slot.borrow_mut().take().unwrap();
        assert!(engine.is_disposed());
        assert!(!engine.is_visible());
        assert_eq!(env.listener_count(), 0);
    }
}
