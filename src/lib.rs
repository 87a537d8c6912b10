//! Subtext: Match-Underlining Editable Field
//!
//! A Rust/WASM widget that turns a `contenteditable` element into a text
//! field which underlines every occurrence of a comparison string and shows
//! a tooltip while the pointer rests on an underlined run.
//!
//! # Architecture
//!
//! ## Pure core (native-testable)
//! - `segment.rs` - Matcher + `compute_segments`: text → matched/unmatched runs
//! - `runs.rs` - TextRuns: prefix-sum caret offset model
//! - `state.rs` - EditorState: explicit surface phase machine + projection
//! - `tooltip.rs` - TooltipState, hit-testing and debounce bookkeeping
//! - `config.rs` - WidgetConfig and presets
//!
//! ## DOM adapters
//! - `caret.rs` - CaretTracker: selection ↔ linear offset over the live surface
//! - `surface.rs` - SurfaceController: full child replacement per projection
//! - `widget.rs` - MatchHighlighter: the JS-facing widget, listener lifecycle
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { MatchHighlighter } from 'subtext';
//!
//! await init();
//!
//! const widget = new MatchHighlighter(document.getElementById('editor'), {
//!   tooltip_delay_ms: 200,
//! });
//! widget.bindComparisonInput(document.getElementById('comparison'));
//!
//! // later
//! widget.unmount();
//! ```

pub mod caret;
pub mod config;
pub mod error;
pub mod runs;
pub mod segment;
pub mod state;
pub mod surface;
pub mod tooltip;
pub mod widget;

pub use caret::*;
pub use config::*;
pub use error::*;
pub use runs::*;
pub use segment::*;
pub use state::*;
pub use surface::*;
pub use tooltip::*;
pub use widget::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("subtext v{}", env!("CARGO_PKG_VERSION"))
}
