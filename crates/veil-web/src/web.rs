#![forbid(unsafe_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use veil_core::condition::MediaQuery;
use veil_core::environment::{
    ConditionError, EnvEvent, Environment, Listener, ListenerId, TimerCallback, TimerHost, TimerId,
};
use veil_runtime::{EngineConfig, VisibilityEngine, VisibilityHooks};

use crate::convert::{delay_millis, parse_breakpoints};

/// [`Environment`] backed by the browser window.
///
/// Conditions go through `window.matchMedia`, listeners are attached to the
/// window, and timers use `setTimeout`. Dropping the environment detaches
/// every listener and clears every pending timer it created.
pub struct WebEnvironment {
    window: Window,
    next_listener: Cell<u64>,
    listeners: RefCell<HashMap<u64, (EnvEvent, Closure<dyn Fn()>)>>,
    next_timer: Cell<u64>,
    /// Our timer id -> browser timeout handle, removed when the timeout runs.
    timers: Rc<RefCell<HashMap<u64, i32>>>,
}

impl WebEnvironment {
    /// Environment for the global `window`.
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global `window`"))?;
        Ok(Self::with_window(window))
    }

    pub fn with_window(window: Window) -> Self {
        Self {
            window,
            next_listener: Cell::new(0),
            listeners: RefCell::new(HashMap::new()),
            next_timer: Cell::new(0),
            timers: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl TimerHost for WebEnvironment {
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let seq = self.next_timer.get();
        self.next_timer.set(seq + 1);

        let handles = Rc::clone(&self.timers);
        // Freed when invoked; a cleared timeout keeps its closure alive.
        let js = Closure::once_into_js(move || {
            handles.borrow_mut().remove(&seq);
            callback();
        });
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                js.unchecked_ref(),
                delay_millis(delay),
            ) {
            Ok(handle) => {
                self.timers.borrow_mut().insert(seq, handle);
            }
            Err(err) => {
                tracing::warn!(target: "veil.web", error = ?err, "setTimeout failed");
            }
        }
        TimerId::new(seq)
    }

    fn clear_timeout(&self, id: TimerId) {
        let handle = self.timers.borrow_mut().remove(&id.get());
        if let Some(handle) = handle {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

impl Environment for WebEnvironment {
    fn evaluate(&self, condition: &str) -> Result<bool, ConditionError> {
        match self.window.match_media(condition) {
            Ok(Some(list)) => Ok(list.matches()),
            Ok(None) => Err(ConditionError::new(condition, "matchMedia returned null")),
            Err(err) => Err(ConditionError::new(condition, format!("{err:?}"))),
        }
    }

    fn add_listener(&self, event: EnvEvent, listener: Listener) -> ListenerId {
        let seq = self.next_listener.get();
        self.next_listener.set(seq + 1);

        let closure = Closure::<dyn Fn()>::new(move || listener(event));
        if let Err(err) = self
            .window
            .add_event_listener_with_callback(event.dom_name(), closure.as_ref().unchecked_ref())
        {
            tracing::warn!(
                target: "veil.web",
                event = event.dom_name(),
                error = ?err,
                "addEventListener failed"
            );
        }
        self.listeners.borrow_mut().insert(seq, (event, closure));
        ListenerId::new(seq)
    }

    fn remove_listener(&self, id: ListenerId) {
        let entry = self.listeners.borrow_mut().remove(&id.get());
        if let Some((event, closure)) = entry {
            let _ = self
                .window
                .remove_event_listener_with_callback(event.dom_name(), closure.as_ref().unchecked_ref());
        }
    }
}

impl Drop for WebEnvironment {
    fn drop(&mut self) {
        for (_, (event, closure)) in self.listeners.get_mut().drain() {
            let _ = self
                .window
                .remove_event_listener_with_callback(event.dom_name(), closure.as_ref().unchecked_ref());
        }
        for (_, handle) in self.timers.borrow_mut().drain() {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

fn js_callback(name: &'static str, function: js_sys::Function) -> impl Fn() + 'static {
    move || {
        if let Err(err) = function.call0(&JsValue::NULL) {
            tracing::error!(target: "veil.web", callback = name, error = ?err, "callback threw");
        }
    }
}

/// JS-facing visibility engine bound to the global window.
///
/// ```js
/// const vis = new VeilVisibility(["xs", "sm"], null, false, 100,
///   () => el.hidden = false, () => el.hidden = true);
/// // later
/// vis.dispose();
/// ```
#[wasm_bindgen(js_name = VeilVisibility)]
pub struct WebVisibility {
    engine: VisibilityEngine,
}

#[wasm_bindgen(js_class = VeilVisibility)]
impl WebVisibility {
    /// `media`, when given, replaces the breakpoint names.
    #[wasm_bindgen(constructor)]
    pub fn new(
        breakpoints: Vec<String>,
        media: Option<Vec<String>>,
        invert: bool,
        debounce_ms: u32,
        on_show: Option<js_sys::Function>,
        on_hide: Option<js_sys::Function>,
    ) -> Result<WebVisibility, JsValue> {
        let flags = parse_breakpoints(&breakpoints)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;

        let mut hooks = VisibilityHooks::new();
        if let Some(f) = on_show {
            hooks = hooks.on_show(js_callback("on_show", f));
        }
        if let Some(f) = on_hide {
            hooks = hooks.on_hide(js_callback("on_hide", f));
        }

        let mut config = EngineConfig::new()
            .with_flags(flags)
            .with_invert(invert)
            .with_debounce_ms(u64::from(debounce_ms))
            .with_hooks(hooks);
        if let Some(media) = media {
            config = config.with_media(MediaQuery::list(media));
        }

        let env = Rc::new(WebEnvironment::new()?);
        let engine = VisibilityEngine::create(config, env);
        Ok(Self { engine })
    }

    #[wasm_bindgen(getter, js_name = isVisible)]
    pub fn is_visible(&self) -> bool {
        self.engine.is_visible()
    }

    /// Re-evaluate now instead of waiting for the next viewport event.
    pub fn recompute(&self) -> bool {
        self.engine.recompute();
        self.engine.is_visible()
    }

    pub fn dispose(&self) {
        self.engine.dispose();
    }
}
