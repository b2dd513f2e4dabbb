#![forbid(unsafe_code)]

//! Records show/hide callbacks as a transition sequence.

use std::cell::RefCell;
use std::rc::Rc;

use veil_runtime::{Transition, VisibilityHooks};

/// Shared log of transitions observed through [`VisibilityHooks`].
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct TransitionRecorder {
    log: Rc<RefCell<Vec<Transition>>>,
}

impl TransitionRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hooks that append to this recorder.
    #[must_use]
    pub fn hooks(&self) -> VisibilityHooks {
        let show = Rc::clone(&self.log);
        let hide = Rc::clone(&self.log);
        VisibilityHooks::new()
            .on_show(move || show.borrow_mut().push(Transition::Shown))
            .on_hide(move || hide.borrow_mut().push(Transition::Hidden))
    }

    #[must_use]
    pub fn transitions(&self) -> Vec<Transition> {
        self.log.borrow().clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<Transition> {
        self.log.borrow().last().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    #[must_use]
    pub fn shows(&self) -> usize {
        self.count(Transition::Shown)
    }

    #[must_use]
    pub fn hides(&self) -> usize {
        self.count(Transition::Hidden)
    }

    fn count(&self, kind: Transition) -> usize {
        self.log.borrow().iter().filter(|t| **t == kind).count()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_log() {
        let recorder = TransitionRecorder::new();
        let other = recorder.clone();
        let hooks = recorder.hooks();
        assert!(hooks.has_show() && hooks.has_hide());
        assert!(other.is_empty());
        assert_eq!(other.last(), None);
    }
}
