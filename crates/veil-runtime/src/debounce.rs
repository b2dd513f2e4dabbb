#![forbid(unsafe_code)]

//! Debounced scheduler.
//!
//! [`Debounced`] wraps an action so that a burst of triggers collapses into
//! at most one execution per quiet window.
//!
//! # Policy
//!
//! - **Trailing** (`leading = false`): every trigger (re)arms the window
//!   timer; when it elapses the action runs once with the arguments of the
//!   last trigger.
//! - **Leading** (`leading = true`): a trigger with no timer pending runs the
//!   action immediately; further triggers only extend the window. Nothing runs
//!   when the window elapses.
//!
//! # Invariants
//!
//! - At most one timer is armed per scheduler.
//! - A timer that was superseded or cancelled never runs the action, even if
//!   the host fires it anyway (guarded by a generation counter).
//! - No borrow is held while the action runs, so the action may re-trigger.
//!
//! # Usage
//!
//! ```ignore
//! let host = Rc::new(NullEnvironment::new());
//! let save = Debounced::wrap(host, |n: u32| println!("saving {n}"), Duration::from_millis(100), false);
//! save.trigger(1);
//! save.trigger(2); // only `2` is saved, 100ms after this call
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use veil_core::environment::{TimerHost, TimerId};

struct DebounceInner<A, H: ?Sized> {
    host: Rc<H>,
    action: Box<dyn Fn(A)>,
    window: Duration,
    leading: bool,
    /// Timer currently armed, if any.
    pending: Cell<Option<TimerId>>,
    /// Bumped on every (re)arm and cancel; a firing timer must match it.
    generation: Cell<u64>,
    /// Arguments of the most recent trailing trigger.
    last_args: RefCell<Option<A>>,
    triggers: Cell<u64>,
    executions: Cell<u64>,
}

impl<A, H: TimerHost + ?Sized> DebounceInner<A, H> {
    fn run(&self, args: A) {
        self.executions.set(self.executions.get() + 1);
        (self.action)(args);
    }

    fn elapse(&self, generation: u64) {
        if self.generation.get() != generation {
            tracing::trace!(target: "veil.debounce", generation, "stale timer ignored");
            return;
        }
        self.pending.set(None);
        if self.leading {
            return;
        }
        let args = self.last_args.borrow_mut().take();
        if let Some(args) = args {
            self.run(args);
        }
    }
}

/// A trigger that collapses bursts of calls into one deferred execution.
///
/// Cloning yields another handle to the same scheduler.
pub struct Debounced<A, H: ?Sized = dyn TimerHost> {
    inner: Rc<DebounceInner<A, H>>,
}

impl<A, H: ?Sized> Clone for Debounced<A, H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A, H: ?Sized> fmt::Debug for Debounced<A, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounced")
            .field("window", &self.inner.window)
            .field("leading", &self.inner.leading)
            .field("pending", &self.inner.pending.get())
            .field("triggers", &self.inner.triggers.get())
            .field("executions", &self.inner.executions.get())
            .finish()
    }
}

impl<A: 'static, H: TimerHost + ?Sized + 'static> Debounced<A, H> {
    /// Wrap `action` so it runs at most once per quiet `window`.
    pub fn wrap<F>(host: Rc<H>, action: F, window: Duration, leading: bool) -> Self
    where
        F: Fn(A) + 'static,
    {
        Self {
            inner: Rc::new(DebounceInner {
                host,
                action: Box::new(action),
                window,
                leading,
                pending: Cell::new(None),
                generation: Cell::new(0),
                last_args: RefCell::new(None),
                triggers: Cell::new(0),
                executions: Cell::new(0),
            }),
        }
    }

    /// Register a call.
    pub fn trigger(&self, args: A) {
        let inner = &self.inner;
        inner.triggers.set(inner.triggers.get() + 1);

        let call_now = inner.leading && inner.pending.get().is_none();
        if let Some(id) = inner.pending.take() {
            inner.host.clear_timeout(id);
        }

        let generation = inner.generation.get().wrapping_add(1);
        inner.generation.set(generation);

        let mut immediate = None;
        if inner.leading {
            if call_now {
                immediate = Some(args);
            }
        } else {
            *inner.last_args.borrow_mut() = Some(args);
        }

        let weak: Weak<DebounceInner<A, H>> = Rc::downgrade(inner);
        let id = inner.host.set_timeout(
            inner.window,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.elapse(generation);
                }
            }),
        );
        inner.pending.set(Some(id));

        if let Some(args) = immediate {
            inner.run(args);
        }
    }

    /// Disarm the pending timer and drop any stored arguments.
    ///
    /// Returns `true` if a timer was pending.
    pub fn cancel(&self) -> bool {
        let inner = &self.inner;
        inner.generation.set(inner.generation.get().wrapping_add(1));
        inner.last_args.borrow_mut().take();
        match inner.pending.take() {
            Some(id) => {
                inner.host.clear_timeout(id);
                tracing::trace!(target: "veil.debounce", timer = id.get(), "cancelled");
                true
            }
            None => false,
        }
    }
}

impl<A, H: ?Sized> Debounced<A, H> {
    /// Whether a window timer is armed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.pending.get().is_some()
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.inner.window
    }

    #[must_use]
    pub fn is_leading(&self) -> bool {
        self.inner.leading
    }

    /// Total calls to [`trigger`](Self::trigger).
    #[must_use]
    pub fn trigger_count(&self) -> u64 {
        self.inner.triggers.get()
    }

    /// Times the wrapped action has run.
    #[must_use]
    pub fn execution_count(&self) -> u64 {
        self.inner.executions.get()
    }
}
