//! EditorState: explicit surface phase machine
//!
//! The editable surface is in exactly one `SurfacePhase`. Every DOM event is
//! turned into a `SurfaceEvent`, applied here, and the returned `Transition`
//! says whether the projection has to be rebuilt. Rebuilds are suspended in
//! both composing phases, so an IME composition is never split across
//! replaced nodes.

use serde::{Deserialize, Serialize};

use crate::segment::{Matcher, Segment};

// =============================================================================
// Phase
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SurfacePhase {
    /// Mounted, never focused
    #[default]
    Idle,
    Focused,
    FocusedComposing,
    /// Focus left while a composition was still open
    Composing,
    Blurred,
}

impl SurfacePhase {
    pub fn is_focused(self) -> bool {
        matches!(self, Self::Focused | Self::FocusedComposing)
    }

    pub fn is_composing(self) -> bool {
        matches!(self, Self::Composing | Self::FocusedComposing)
    }

    pub fn can_rebuild(self) -> bool {
        !self.is_composing()
    }

    fn on_focus(self) -> Self {
        match self {
            Self::Idle | Self::Blurred | Self::Focused => Self::Focused,
            Self::Composing | Self::FocusedComposing => Self::FocusedComposing,
        }
    }

    fn on_blur(self) -> Self {
        match self {
            Self::Idle | Self::Blurred | Self::Focused => Self::Blurred,
            Self::Composing | Self::FocusedComposing => Self::Composing,
        }
    }

    fn on_composition_start(self) -> Self {
        match self {
            Self::Focused | Self::FocusedComposing => Self::FocusedComposing,
            Self::Idle | Self::Blurred | Self::Composing => Self::Composing,
        }
    }

    fn on_composition_end(self) -> Self {
        match self {
            Self::Focused | Self::FocusedComposing => Self::Focused,
            Self::Composing => Self::Blurred,
            Self::Idle => Self::Idle,
            Self::Blurred => Self::Blurred,
        }
    }
}

// =============================================================================
// Events and transitions
// =============================================================================

/// Editing events, with the caret offset captured just before the event
/// was applied (`None` when the selection was outside the surface)
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Input { text: String, caret: Option<usize> },
    CompositionStart,
    CompositionEnd { text: String, caret: Option<usize> },
    Focus { caret: Option<usize> },
    Blur,
    ComparisonChanged(String),
}

/// Outcome of applying one event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    /// Projection must be rebuilt
    pub rebuild: bool,
    /// Caret must be restored after the rebuild
    pub restore_caret: bool,
}

/// What the surface should display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Placeholder(String),
    Segments(Vec<Segment>),
}

impl Projection {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    pub fn match_count(&self) -> usize {
        match self {
            Self::Placeholder(_) => 0,
            Self::Segments(segments) => segments.iter().filter(|s| s.matched).count(),
        }
    }

    /// Displayed text, placeholder included
    pub fn text(&self) -> String {
        match self {
            Self::Placeholder(text) => text.clone(),
            Self::Segments(segments) => segments.iter().map(|s| s.text.as_str()).collect(),
        }
    }
}

// =============================================================================
// EditorState
// =============================================================================

#[derive(Debug, Default)]
pub struct EditorState {
    raw_text: String,
    matcher: Matcher,
    caret_offset: usize,
    phase: SurfacePhase,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn comparison_text(&self) -> &str {
        self.matcher.comparison()
    }

    pub fn caret_offset(&self) -> usize {
        self.caret_offset
    }

    pub fn phase(&self) -> SurfacePhase {
        self.phase
    }

    pub fn is_focused(&self) -> bool {
        self.phase.is_focused()
    }

    pub fn is_composing(&self) -> bool {
        self.phase.is_composing()
    }

    /// Apply one event and report what the surface has to do
    pub fn apply(&mut self, event: SurfaceEvent) -> Transition {
        let mut transition = Transition::default();

        let changed = match event {
            SurfaceEvent::Input { text, caret } => {
                if self.is_composing() {
                    return transition;
                }
                self.capture(caret);
                self.set_raw_text(text)
            }
            SurfaceEvent::CompositionStart => {
                self.phase = self.phase.on_composition_start();
                false
            }
            SurfaceEvent::CompositionEnd { text, caret } => {
                self.phase = self.phase.on_composition_end();
                self.capture(caret);
                self.set_raw_text(text);
                // Composed text always gets re-projected
                true
            }
            SurfaceEvent::Focus { caret } => {
                let was_focused = self.is_focused();
                self.phase = self.phase.on_focus();
                if !self.is_composing() {
                    self.capture(caret);
                }
                !was_focused
            }
            SurfaceEvent::Blur => {
                let was_focused = self.is_focused();
                self.phase = self.phase.on_blur();
                was_focused
            }
            SurfaceEvent::ComparisonChanged(comparison) => {
                self.matcher.set_comparison(&comparison);
                if self.matcher.needs_rebuild() {
                    self.matcher.build();
                    true
                } else {
                    false
                }
            }
        };

        if changed && self.phase.can_rebuild() {
            transition.rebuild = true;
            transition.restore_caret = self.is_focused();
        }
        transition
    }

    /// Current projection: the placeholder while unfocused and empty,
    /// otherwise the segments of the raw text
    pub fn projection(&self, placeholder: &str) -> Projection {
        if !self.is_focused() && self.raw_text.is_empty() {
            return Projection::Placeholder(placeholder.to_string());
        }
        Projection::Segments(self.matcher.segments(&self.raw_text))
    }

    pub fn segments(&self) -> Vec<Segment> {
        self.matcher.segments(&self.raw_text)
    }

    fn capture(&mut self, caret: Option<usize>) {
        if let Some(offset) = caret {
            self.caret_offset = offset;
        }
    }

    fn set_raw_text(&mut self, text: String) -> bool {
        if self.raw_text == text {
            return false;
        }
        self.raw_text = text;
        true
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PLACEHOLDER: &str = "Type something...";

    fn input(text: &str, caret: usize) -> SurfaceEvent {
        SurfaceEvent::Input { text: text.to_string(), caret: Some(caret) }
    }

    fn focused_state() -> EditorState {
        let mut state = EditorState::new();
        state.apply(SurfaceEvent::Focus { caret: None });
        state
    }

    #[test]
    fn test_initial_state_shows_placeholder() {
        let state = EditorState::new();
        assert_eq!(state.phase(), SurfacePhase::Idle);
        assert_eq!(
            state.projection(PLACEHOLDER),
            Projection::Placeholder(PLACEHOLDER.to_string())
        );
    }

    #[test]
    fn test_focus_clears_placeholder() {
        let mut state = EditorState::new();
        let transition = state.apply(SurfaceEvent::Focus { caret: None });
        assert!(transition.rebuild);
        assert!(transition.restore_caret);
        assert_eq!(
            state.projection(PLACEHOLDER),
            Projection::Segments(vec![Segment::unmatched("")])
        );
    }

    #[test]
    fn test_blur_with_empty_text_shows_placeholder() {
        let mut state = focused_state();
        let transition = state.apply(SurfaceEvent::Blur);
        assert!(transition.rebuild);
        assert!(!transition.restore_caret);
        assert_eq!(state.phase(), SurfacePhase::Blurred);
        assert!(state.projection(PLACEHOLDER).is_placeholder());
    }

    #[test]
    fn test_blur_with_text_keeps_segments() {
        let mut state = focused_state();
        state.apply(input("hello", 5));
        state.apply(SurfaceEvent::Blur);
        assert_eq!(
            state.projection(PLACEHOLDER),
            Projection::Segments(vec![Segment::unmatched("hello")])
        );
    }

    #[test]
    fn test_input_updates_text_and_caret() {
        let mut state = focused_state();
        state.apply(SurfaceEvent::ComparisonChanged("lo".to_string()));
        let transition = state.apply(input("hello", 3));
        assert!(transition.rebuild);
        assert!(transition.restore_caret);
        assert_eq!(state.raw_text(), "hello");
        assert_eq!(state.caret_offset(), 3);
        assert_eq!(state.projection(PLACEHOLDER).match_count(), 1);
    }

    #[test]
    fn test_unchanged_input_does_not_rebuild() {
        let mut state = focused_state();
        state.apply(input("same", 4));
        let transition = state.apply(input("same", 2));
        assert!(!transition.rebuild);
        assert_eq!(state.caret_offset(), 2);
    }

    #[test]
    fn test_selection_outside_keeps_prior_caret() {
        let mut state = focused_state();
        state.apply(input("abc", 2));
        state.apply(SurfaceEvent::Input { text: "abcd".to_string(), caret: None });
        assert_eq!(state.caret_offset(), 2);
    }

    // -------------------------------------------------------------------------
    // Composition guard
    // -------------------------------------------------------------------------
    #[test]
    fn test_no_rebuild_or_caret_change_during_composition() {
        let mut state = focused_state();
        state.apply(input("ab", 2));

        assert!(!state.apply(SurfaceEvent::CompositionStart).rebuild);
        assert_eq!(state.phase(), SurfacePhase::FocusedComposing);

        let during = [
            input("abに", 3),
            SurfaceEvent::ComparisonChanged("b".to_string()),
            input("abにほ", 4),
            SurfaceEvent::Blur,
            SurfaceEvent::Focus { caret: Some(1) },
            SurfaceEvent::ComparisonChanged("a".to_string()),
        ];
        for event in during {
            let transition = state.apply(event);
            assert!(!transition.rebuild);
            assert!(!transition.restore_caret);
            assert_eq!(state.caret_offset(), 2);
            assert_eq!(state.raw_text(), "ab");
            assert!(state.is_composing());
        }

        let transition = state.apply(SurfaceEvent::CompositionEnd {
            text: "ab日本".to_string(),
            caret: Some(4),
        });
        assert!(transition.rebuild);
        assert!(transition.restore_caret);
        assert_eq!(state.phase(), SurfacePhase::Focused);
        assert_eq!(state.raw_text(), "ab日本");
        assert_eq!(state.caret_offset(), 4);
        assert_eq!(state.comparison_text(), "a");
    }

    #[test]
    fn test_blur_mid_composition_settles_blurred() {
        let mut state = focused_state();
        state.apply(SurfaceEvent::CompositionStart);
        state.apply(SurfaceEvent::Blur);
        assert_eq!(state.phase(), SurfacePhase::Composing);

        let transition = state.apply(SurfaceEvent::CompositionEnd {
            text: String::new(),
            caret: None,
        });
        assert!(transition.rebuild);
        assert!(!transition.restore_caret);
        assert_eq!(state.phase(), SurfacePhase::Blurred);
        assert!(state.projection(PLACEHOLDER).is_placeholder());
    }

    #[test]
    fn test_phase_table() {
        use SurfacePhase::*;
        assert_eq!(Idle.on_focus(), Focused);
        assert_eq!(Blurred.on_focus(), Focused);
        assert_eq!(Composing.on_focus(), FocusedComposing);
        assert_eq!(Focused.on_blur(), Blurred);
        assert_eq!(FocusedComposing.on_blur(), Composing);
        assert_eq!(Idle.on_composition_start(), Composing);
        assert_eq!(Focused.on_composition_start(), FocusedComposing);
        assert_eq!(FocusedComposing.on_composition_end(), Focused);
        assert_eq!(Composing.on_composition_end(), Blurred);
        assert!(!Composing.can_rebuild());
        assert!(!FocusedComposing.can_rebuild());
        assert!(Blurred.can_rebuild());
    }

    // -------------------------------------------------------------------------
    // Rebuild idempotence
    // -------------------------------------------------------------------------
    #[test]
    fn test_projection_is_idempotent() {
        let mut state = focused_state();
        state.apply(SurfaceEvent::ComparisonChanged("an".to_string()));
        state.apply(input("banana bandana", 6));

        let first = state.projection(PLACEHOLDER);
        let second = state.projection(PLACEHOLDER);
        assert_eq!(first, second);
        assert_eq!(first.text(), "banana bandana");
        assert_eq!(first.match_count(), 4);
    }

    #[test]
    fn test_same_comparison_does_not_rebuild() {
        let mut state = focused_state();
        assert!(state.apply(SurfaceEvent::ComparisonChanged("x".to_string())).rebuild);
        assert!(!state.apply(SurfaceEvent::ComparisonChanged("x".to_string())).rebuild);
    }
}
