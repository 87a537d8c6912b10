//! SurfaceController: projects editor state onto the editable element
//!
//! Every rebuild throws away all children of the surface and appends one
//! `span` per segment. Nothing is diffed or reused. Caret restoration is
//! deferred to a microtask so it runs against the new children; a newer
//! rebuild supersedes any restore still queued from an older one.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Node};

use crate::caret;
use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::state::Projection;
use crate::tooltip::Rect;

/// Attribute marking the placeholder span
pub const PLACEHOLDER_ATTRIBUTE: &str = "data-placeholder";

pub struct SurfaceController {
    document: Document,
    root: HtmlElement,
    match_attribute: String,
    match_selector: String,
    match_style: String,
    placeholder_style: String,
    restore_generation: Rc<Cell<u64>>,
    rebuild_count: u64,
    debug_logging: bool,
}

impl SurfaceController {
    /// Take over `root`: makes it editable, leaves its children to `render`
    pub fn new(document: Document, root: HtmlElement, config: &WidgetConfig) -> Result<Self, WidgetError> {
        root.set_content_editable("true");
        root.set_attribute("spellcheck", "false")?;

        Ok(Self {
            document,
            root,
            match_attribute: config.match_attribute.clone(),
            match_selector: config.match_selector(),
            match_style: config.match_style(),
            placeholder_style: config.placeholder_style(),
            restore_generation: Rc::new(Cell::new(0)),
            rebuild_count: 0,
            debug_logging: config.debug_logging,
        })
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    /// Text the user currently sees in the surface
    pub fn live_text(&self) -> String {
        self.root.text_content().unwrap_or_default()
    }

    pub fn capture_caret(&self) -> Option<usize> {
        caret::capture_from_document(&self.document, &self.root)
    }

    /// Replace all children with the projection.
    /// Supersedes any caret restore still queued from an earlier rebuild.
    pub fn render(&mut self, projection: &Projection) -> Result<(), WidgetError> {
        self.cancel_caret_restore();
        self.root.set_text_content(None);

        match projection {
            Projection::Placeholder(text) => {
                let span = self.document.create_element("span")?;
                span.set_text_content(Some(text.as_str()));
                span.set_attribute(PLACEHOLDER_ATTRIBUTE, "true")?;
                span.set_attribute("style", &self.placeholder_style)?;
                self.root.append_child(&span)?;
            }
            Projection::Segments(segments) => {
                for segment in segments {
                    let span = self.document.create_element("span")?;
                    span.set_text_content(Some(segment.text.as_str()));
                    if segment.matched {
                        span.set_attribute(&self.match_attribute, "true")?;
                        span.set_attribute("style", &self.match_style)?;
                    }
                    self.root.append_child(&span)?;
                }
            }
        }

        self.rebuild_count += 1;
        if self.debug_logging {
            web_sys::console::log_1(
                &format!(
                    "[SurfaceController] Rebuild #{}: {} matches, placeholder={}",
                    self.rebuild_count,
                    projection.match_count(),
                    projection.is_placeholder()
                )
                .into(),
            );
        }
        Ok(())
    }

    /// Queue a caret restore for after the current task. Last write wins.
    pub fn schedule_caret_restore(&self, offset: usize) {
        let generation = self.restore_generation.get() + 1;
        self.restore_generation.set(generation);

        let current = Rc::clone(&self.restore_generation);
        let document = self.document.clone();
        let root: Node = self.root.clone().into();

        wasm_bindgen_futures::spawn_local(async move {
            if current.get() != generation {
                return;
            }
            caret::restore_or_fallback(&document, &root, offset);
        });
    }

    /// Drop any queued caret restore
    pub fn cancel_caret_restore(&self) {
        self.restore_generation.set(self.restore_generation.get() + 1);
    }

    /// Bounding rects of every discoverable matched span, in document order
    pub fn matched_rects(&self) -> Vec<Rect> {
        let nodes = match self.root.query_selector_all(&self.match_selector) {
            Ok(nodes) => nodes,
            Err(e) => {
                web_sys::console::error_1(&format!("[SurfaceController] Match query failed: {:?}", e).into());
                return Vec::new();
            }
        };

        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| {
                let rect = element.get_bounding_client_rect();
                Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
            })
            .collect()
    }
}
