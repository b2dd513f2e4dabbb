#![forbid(unsafe_code)]

//! Show/hide callbacks.

use std::fmt;
use std::rc::Rc;

/// Direction of a visibility change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Transition {
    /// Hidden to visible.
    Shown,
    /// Visible to hidden.
    Hidden,
}

impl Transition {
    /// The transition that lands on `visible`.
    #[must_use]
    pub const fn from_visibility(visible: bool) -> Self {
        if visible { Self::Shown } else { Self::Hidden }
    }

    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Shown)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shown => "shown",
            Self::Hidden => "hidden",
        }
    }
}

type Callback = Rc<dyn Fn()>;

/// Callbacks fired on visibility transitions.
///
/// Cloning is cheap; callbacks are reference counted. The engine clones the
/// hooks out of its config before invoking them, so a callback may replace
/// the engine's hooks or dispose it.
///
/// # Example
///
/// ```ignore
/// let hooks = VisibilityHooks::new()
///     .on_show(|| println!("visible"))
///     .on_hide(|| println!("hidden"))
///     .with_tracing(true);
/// ```
#[derive(Clone, Default)]
pub struct VisibilityHooks {
    on_show: Option<Callback>,
    on_hide: Option<Callback>,
    emit_tracing: bool,
}

impl fmt::Debug for VisibilityHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityHooks")
            .field("on_show", &self.on_show.is_some())
            .field("on_hide", &self.on_hide.is_some())
            .field("emit_tracing", &self.emit_tracing)
            .finish()
    }
}

impl VisibilityHooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the callback for hidden → visible.
    #[must_use]
    pub fn on_show<F>(mut self, callback: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.on_show = Some(Rc::new(callback));
        self
    }

    /// Set the callback for visible → hidden.
    #[must_use]
    pub fn on_hide<F>(mut self, callback: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.on_hide = Some(Rc::new(callback));
        self
    }

    /// Emit an `info` event with target `veil.visibility` per transition.
    #[must_use]
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.emit_tracing = enabled;
        self
    }

    pub fn set_on_show(&mut self, callback: Option<Rc<dyn Fn()>>) {
        self.on_show = callback;
    }

    pub fn set_on_hide(&mut self, callback: Option<Rc<dyn Fn()>>) {
        self.on_hide = callback;
    }

    pub fn has_show(&self) -> bool {
        self.on_show.is_some()
    }

    pub fn has_hide(&self) -> bool {
        self.on_hide.is_some()
    }

    pub(crate) fn fire(&self, transition: Transition) {
        if self.emit_tracing {
            tracing::info!(
                target: "veil.visibility",
                transition = transition.as_str(),
                "visibility_transition"
            );
        }
        let callback = match transition {
            Transition::Shown => &self.on_show,
            Transition::Hidden => &self.on_hide,
        };
        if let Some(cb) = callback {
            cb();
        }
    }
}
