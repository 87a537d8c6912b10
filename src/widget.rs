//! MatchHighlighter: the JS-facing widget
//!
//! Owns the editor state, the surface and the tooltip, and wires them to
//! DOM events. All listeners and the tooltip debounce timer are held by one
//! `Subscriptions` handle that is released on `unmount()` (or drop).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, HtmlElement, HtmlInputElement, MouseEvent, Window};

use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::state::{EditorState, SurfaceEvent, Transition};
use crate::surface::SurfaceController;
use crate::tooltip::{TooltipCommand, TooltipController};

/// Style of the floating tooltip; positioned by `left` / `top`
const TOOLTIP_STYLE: &str = "position: fixed; display: none; pointer-events: none; \
    transform: translate(-50%, calc(-100% - 6px)); padding: 4px 8px; border-radius: 4px; \
    background: #333; color: #fff; font-size: 12px; white-space: nowrap; z-index: 1000;";

// =============================================================================
// Shared widget state
// =============================================================================

struct Inner {
    state: EditorState,
    surface: SurfaceController,
    tooltip: TooltipController,
    tooltip_element: HtmlElement,
    config: WidgetConfig,
}

type Shared = Rc<RefCell<Inner>>;

impl Inner {
    /// Apply an event and carry out the resulting transition
    fn dispatch(&mut self, event: SurfaceEvent) {
        let transition = self.state.apply(event);
        self.carry_out(transition);
    }

    fn carry_out(&mut self, transition: Transition) {
        if !transition.rebuild {
            return;
        }

        let projection = self.state.projection(&self.config.placeholder);
        if let Err(e) = self.surface.render(&projection) {
            web_sys::console::error_1(&format!("[MatchHighlighter] Rebuild failed: {}", e).into());
            return;
        }
        if transition.restore_caret {
            self.surface.schedule_caret_restore(self.state.caret_offset());
        }
    }

    fn show_tooltip(&self) {
        let state = self.tooltip.state();
        self.tooltip_element.set_text_content(Some(state.message.as_str()));
        let style = self.tooltip_element.style();
        let result = style
            .set_property("left", &format!("{}px", state.anchor_x))
            .and_then(|_| style.set_property("top", &format!("{}px", state.anchor_y)))
            .and_then(|_| style.set_property("display", "block"));
        if let Err(e) = result {
            web_sys::console::error_1(&format!("[MatchHighlighter] Tooltip show failed: {:?}", e).into());
        }
    }

    fn hide_tooltip(&mut self) {
        self.tooltip.hide();
        if let Err(e) = self.tooltip_element.style().set_property("display", "none") {
            web_sys::console::error_1(&format!("[MatchHighlighter] Tooltip hide failed: {:?}", e).into());
        }
    }
}

// =============================================================================
// Listener lifecycle
// =============================================================================

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(target: EventTarget, kind: &'static str, closure: Closure<dyn FnMut(Event)>) -> Result<Self, WidgetError> {
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref::<Function>())?;
        Ok(Self { target, kind, closure })
    }

    fn detach(&self) {
        if let Err(e) = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref::<Function>())
        {
            web_sys::console::error_1(&format!("[MatchHighlighter] Detach '{}' failed: {:?}", self.kind, e).into());
        }
    }
}

/// Debounce timer for the tooltip. One persistent callback; the ticket it
/// fires for lives in a shared cell.
struct DebounceTimer {
    window: Window,
    handle: Rc<Cell<Option<i32>>>,
    ticket: Rc<Cell<u64>>,
    callback: Closure<dyn FnMut()>,
}

impl DebounceTimer {
    fn new(window: Window, inner: &Shared) -> Self {
        let handle = Rc::new(Cell::new(None));
        let ticket = Rc::new(Cell::new(0));

        let weak = Rc::downgrade(inner);
        let fired_handle = Rc::clone(&handle);
        let fired_ticket = Rc::clone(&ticket);
        let callback = Closure::<dyn FnMut()>::new(move || {
            fired_handle.set(None);
            let Some(inner) = weak.upgrade() else { return };
            let mut inner = inner.borrow_mut();
            if inner.tooltip.fire(fired_ticket.get()) {
                inner.show_tooltip();
            }
        });

        Self { window, handle, ticket, callback }
    }

    fn schedule(&self, ticket: u64, delay_ms: u32) {
        self.cancel();
        self.ticket.set(ticket);
        match self.window.set_timeout_with_callback_and_timeout_and_arguments_0(
            self.callback.as_ref().unchecked_ref::<Function>(),
            delay_ms.min(i32::MAX as u32) as i32,
        ) {
            Ok(id) => self.handle.set(Some(id)),
            Err(e) => {
                web_sys::console::error_1(&format!("[MatchHighlighter] Tooltip timer failed: {:?}", e).into());
            }
        }
    }

    fn cancel(&self) {
        if let Some(id) = self.handle.take() {
            self.window.clear_timeout_with_handle(id);
        }
    }
}

/// Every listener plus the debounce timer, released together
struct Subscriptions {
    listeners: Vec<Listener>,
    timer: Rc<DebounceTimer>,
}

impl Subscriptions {
    fn release(&mut self) {
        for listener in self.listeners.drain(..) {
            listener.detach();
        }
        self.timer.cancel();
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.release();
    }
}

// =============================================================================
// MatchHighlighter
// =============================================================================

#[wasm_bindgen]
pub struct MatchHighlighter {
    inner: Shared,
    subscriptions: Subscriptions,
    mounted: bool,
}

#[wasm_bindgen]
impl MatchHighlighter {
    /// Mount on `surface`. `options` is an optional partial `WidgetConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(surface: HtmlElement, options: JsValue) -> Result<MatchHighlighter, JsValue> {
        let config = WidgetConfig::from_js(options)?;
        Ok(Self::mount(surface, config)?)
    }

    /// Drive the comparison string from a plain text input
    #[wasm_bindgen(js_name = bindComparisonInput)]
    pub fn bind_comparison_input(&mut self, input: HtmlInputElement) -> Result<(), JsValue> {
        if !self.mounted {
            return Ok(());
        }
        self.inner
            .borrow_mut()
            .dispatch(SurfaceEvent::ComparisonChanged(input.value()));

        let weak = Rc::downgrade(&self.inner);
        let source = input.clone();
        let closure = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            if let Some(inner) = weak.upgrade() {
                inner
                    .borrow_mut()
                    .dispatch(SurfaceEvent::ComparisonChanged(source.value()));
            }
        });

        let listener = Listener::attach(input.into(), "input", closure)?;
        self.subscriptions.listeners.push(listener);
        Ok(())
    }

    #[wasm_bindgen(js_name = setComparison)]
    pub fn set_comparison(&self, comparison: &str) {
        self.dispatch(SurfaceEvent::ComparisonChanged(comparison.to_string()));
    }

    /// Replace the content programmatically. Ignored while composing.
    #[wasm_bindgen(js_name = setText)]
    pub fn set_text(&self, text: &str) {
        self.dispatch(SurfaceEvent::Input {
            text: text.to_string(),
            caret: None,
        });
    }

    pub fn text(&self) -> String {
        self.inner.borrow().state.raw_text().to_string()
    }

    pub fn comparison(&self) -> String {
        self.inner.borrow().state.comparison_text().to_string()
    }

    #[wasm_bindgen(js_name = caretOffset)]
    pub fn caret_offset(&self) -> usize {
        self.inner.borrow().state.caret_offset()
    }

    #[wasm_bindgen(js_name = isFocused)]
    pub fn is_focused(&self) -> bool {
        self.inner.borrow().state.is_focused()
    }

    #[wasm_bindgen(js_name = isComposing)]
    pub fn is_composing(&self) -> bool {
        self.inner.borrow().state.is_composing()
    }

    /// Current segments as `[{ text, matched }, ...]`
    pub fn segments(&self) -> Result<JsValue, JsValue> {
        let segments = self.inner.borrow().state.segments();
        serde_wasm_bindgen::to_value(&segments).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = matchCount)]
    pub fn match_count(&self) -> usize {
        self.inner.borrow().state.segments().iter().filter(|s| s.matched).count()
    }

    #[wasm_bindgen(js_name = rebuildCount)]
    pub fn rebuild_count(&self) -> u64 {
        self.inner.borrow().surface.rebuild_count()
    }

    #[wasm_bindgen(js_name = tooltipVisible)]
    pub fn tooltip_visible(&self) -> bool {
        self.inner.borrow().tooltip.is_visible()
    }

    /// Remove every listener, cancel pending timers and the tooltip element
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.subscriptions.release();

        let mut inner = self.inner.borrow_mut();
        inner.tooltip.reset();
        inner.surface.cancel_caret_restore();
        inner.tooltip_element.remove();
    }
}

impl MatchHighlighter {
    /// Mount with an already-parsed configuration
    pub fn mount(surface: HtmlElement, config: WidgetConfig) -> Result<Self, WidgetError> {
        let window = web_sys::window().ok_or(WidgetError::MissingWindow)?;
        let document = window.document().ok_or(WidgetError::MissingDocument)?;

        let tooltip_element = document
            .create_element("div")?
            .dyn_into::<HtmlElement>()
            .map_err(|_| WidgetError::Dom("tooltip element is not an HTMLElement".to_string()))?;
        tooltip_element.set_attribute("role", "tooltip")?;
        tooltip_element.set_attribute("style", TOOLTIP_STYLE)?;

        let mut surface_controller = SurfaceController::new(document.clone(), surface.clone(), &config)?;
        let state = EditorState::new();
        surface_controller.render(&state.projection(&config.placeholder))?;

        let inner: Shared = Rc::new(RefCell::new(Inner {
            state,
            surface: surface_controller,
            tooltip: TooltipController::new(config.tooltip_message.clone()),
            tooltip_element,
            config,
        }));

        let timer = Rc::new(DebounceTimer::new(window, &inner));
        let mut subscriptions = Subscriptions {
            listeners: Vec::new(),
            timer: Rc::clone(&timer),
        };
        let listeners = &mut subscriptions.listeners;
        let target: EventTarget = surface.clone().into();

        listeners.push(Listener::attach(target.clone(), "input", surface_handler(&inner, |inner| {
            SurfaceEvent::Input {
                text: inner.surface.live_text(),
                caret: inner.surface.capture_caret(),
            }
        }))?);

        let weak = Rc::downgrade(&inner);
        let start_timer = Rc::clone(&timer);
        listeners.push(Listener::attach(
            target.clone(),
            "compositionstart",
            Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                let Some(inner) = weak.upgrade() else { return };
                let mut inner = inner.borrow_mut();
                inner.dispatch(SurfaceEvent::CompositionStart);
                start_timer.cancel();
                inner.tooltip.reset();
                inner.hide_tooltip();
            }),
        )?);

        listeners.push(Listener::attach(target.clone(), "compositionend", surface_handler(&inner, |inner| {
            SurfaceEvent::CompositionEnd {
                text: inner.surface.live_text(),
                caret: inner.surface.capture_caret(),
            }
        }))?);

        listeners.push(Listener::attach(target.clone(), "focus", surface_handler(&inner, |inner| {
            SurfaceEvent::Focus { caret: inner.surface.capture_caret() }
        }))?);

        listeners.push(Listener::attach(target, "blur", surface_handler(&inner, |_| SurfaceEvent::Blur))?);

        listeners.push(Listener::attach(
            document.clone().into(),
            "mousemove",
            pointer_handler(&inner, &timer),
        )?);

        // Appended after every fallible step
        let element = inner.borrow().tooltip_element.clone();
        match document.body() {
            Some(body) => body.append_child(&element)?,
            None => document.append_child(&element)?,
        };

        Ok(Self {
            inner,
            subscriptions,
            mounted: true,
        })
    }

    /// Feed a surface event directly, bypassing the DOM listeners.
    /// Ignored once unmounted.
    pub fn dispatch(&self, event: SurfaceEvent) {
        if !self.mounted {
            return;
        }
        self.inner.borrow_mut().dispatch(event);
    }
}

impl Drop for MatchHighlighter {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Listener that reads what it needs from the surface and dispatches the
/// resulting event
fn surface_handler<F>(inner: &Shared, make_event: F) -> Closure<dyn FnMut(Event)>
where
    F: Fn(&Inner) -> SurfaceEvent + 'static,
{
    let weak = Rc::downgrade(inner);
    Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        let Some(inner) = weak.upgrade() else { return };
        let mut inner = inner.borrow_mut();
        let event = make_event(&*inner);
        inner.dispatch(event);
    })
}

/// Document-wide pointer tracking for the tooltip
fn pointer_handler(inner: &Shared, timer: &Rc<DebounceTimer>) -> Closure<dyn FnMut(Event)> {
    let weak = Rc::downgrade(inner);
    let timer = Rc::clone(timer);
    Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else { return };
        let Some(inner) = weak.upgrade() else { return };
        let mut inner = inner.borrow_mut();

        let composing = inner.state.is_composing();
        let rects = if composing { Vec::new() } else { inner.surface.matched_rects() };
        let command = inner.tooltip.on_pointer_move(
            f64::from(mouse.client_x()),
            f64::from(mouse.client_y()),
            &rects,
            composing,
        );

        match command {
            TooltipCommand::Hide => {
                timer.cancel();
                inner.hide_tooltip();
            }
            TooltipCommand::Schedule { ticket } => {
                timer.schedule(ticket, inner.config.tooltip_delay_ms);
            }
        }
    })
}
