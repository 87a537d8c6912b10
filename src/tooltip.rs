//! Tooltip controller: hit-testing and debounced show / immediate hide
//!
//! Pure bookkeeping only. The widget feeds pointer positions and the
//! bounding rects of matched spans in, and executes the returned
//! `TooltipCommand` against the DOM (timer + tooltip element).

use serde::{Deserialize, Serialize};

// =============================================================================
// Types
// =============================================================================

/// Viewport-relative rectangle, as reported by `getBoundingClientRect`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    /// Edges are inclusive
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TooltipState {
    pub visible: bool,
    pub anchor_x: f64,
    pub anchor_y: f64,
    pub message: String,
}

/// What the DOM side must do after a pointer move
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipCommand {
    /// Cancel any timer and hide now
    Hide,
    /// Cancel any timer, then call `fire(ticket)` after the debounce delay
    Schedule { ticket: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingShow {
    ticket: u64,
    anchor_x: f64,
    anchor_y: f64,
}

/// First rect containing the point, in document order
pub fn hit_test(x: f64, y: f64, rects: &[Rect]) -> Option<usize> {
    rects.iter().position(|rect| rect.contains(x, y))
}

// =============================================================================
// TooltipController
// =============================================================================

#[derive(Debug, Default)]
pub struct TooltipController {
    state: TooltipState,
    pending: Option<PendingShow>,
    next_ticket: u64,
}

impl TooltipController {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            state: TooltipState {
                message: message.into(),
                ..TooltipState::default()
            },
            pending: None,
            next_ticket: 0,
        }
    }

    pub fn state(&self) -> &TooltipState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Handle a pointer move. Any pending show is superseded.
    pub fn on_pointer_move(&mut self, x: f64, y: f64, rects: &[Rect], composing: bool) -> TooltipCommand {
        self.pending = None;

        if composing {
            self.hide();
            return TooltipCommand::Hide;
        }

        match hit_test(x, y, rects) {
            Some(index) => {
                let rect = rects[index];
                self.next_ticket += 1;
                self.pending = Some(PendingShow {
                    ticket: self.next_ticket,
                    anchor_x: rect.center_x(),
                    anchor_y: rect.top,
                });
                TooltipCommand::Schedule { ticket: self.next_ticket }
            }
            None => {
                self.hide();
                TooltipCommand::Hide
            }
        }
    }

    /// Debounce timer elapsed. Returns true when the tooltip became visible;
    /// stale tickets are ignored.
    pub fn fire(&mut self, ticket: u64) -> bool {
        match self.pending {
            Some(pending) if pending.ticket == ticket => {
                self.pending = None;
                self.state.visible = true;
                self.state.anchor_x = pending.anchor_x;
                self.state.anchor_y = pending.anchor_y;
                true
            }
            _ => false,
        }
    }

    pub fn hide(&mut self) {
        self.state.visible = false;
    }

    /// Drop the pending show and hide; used on unmount
    pub fn reset(&mut self) {
        self.pending = None;
        self.hide();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rects() -> Vec<Rect> {
        vec![
            Rect::new(10.0, 20.0, 40.0, 16.0),
            Rect::new(80.0, 20.0, 30.0, 16.0),
        ]
    }

    #[test]
    fn test_rect_contains_edges() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(0.0, 0.0));
        assert!(rect.contains(10.0, 10.0));
        assert!(!rect.contains(10.1, 5.0));
        assert_eq!(rect.center_x(), 5.0);
    }

    #[test]
    fn test_hit_test_first_match_wins() {
        let overlapping = vec![Rect::new(0.0, 0.0, 20.0, 20.0), Rect::new(5.0, 5.0, 20.0, 20.0)];
        assert_eq!(hit_test(10.0, 10.0, &overlapping), Some(0));
        assert_eq!(hit_test(22.0, 22.0, &overlapping), Some(1));
        assert_eq!(hit_test(100.0, 100.0, &overlapping), None);
    }

    #[test]
    fn test_hit_schedules_then_shows_anchored() {
        let mut tooltip = TooltipController::new("Matched");
        let command = tooltip.on_pointer_move(90.0, 25.0, &rects(), false);
        let TooltipCommand::Schedule { ticket } = command else {
            panic!("expected schedule, got {:?}", command);
        };
        assert!(!tooltip.is_visible());

        assert!(tooltip.fire(ticket));
        let state = tooltip.state();
        assert!(state.visible);
        assert_eq!(state.anchor_x, 95.0);
        assert_eq!(state.anchor_y, 20.0);
        assert_eq!(state.message, "Matched");
    }

    #[test]
    fn test_reschedule_cancels_previous_ticket() {
        let mut tooltip = TooltipController::new("m");
        let first = tooltip.on_pointer_move(15.0, 25.0, &rects(), false);
        let second = tooltip.on_pointer_move(16.0, 25.0, &rects(), false);
        let (TooltipCommand::Schedule { ticket: a }, TooltipCommand::Schedule { ticket: b }) =
            (first, second)
        else {
            panic!("expected two schedules");
        };
        assert_ne!(a, b);
        assert!(!tooltip.fire(a));
        assert!(tooltip.fire(b));
    }

    // -------------------------------------------------------------------------
    // Hide-on-miss
    // -------------------------------------------------------------------------
    #[test]
    fn test_miss_hides_synchronously_and_drops_pending() {
        let mut tooltip = TooltipController::new("m");
        let TooltipCommand::Schedule { ticket } = tooltip.on_pointer_move(15.0, 25.0, &rects(), false)
        else {
            panic!("expected schedule");
        };
        assert!(tooltip.fire(ticket));
        assert!(tooltip.is_visible());

        let TooltipCommand::Schedule { ticket } = tooltip.on_pointer_move(20.0, 25.0, &rects(), false)
        else {
            panic!("expected schedule");
        };
        assert_eq!(tooltip.on_pointer_move(300.0, 300.0, &rects(), false), TooltipCommand::Hide);
        assert!(!tooltip.is_visible());
        assert!(!tooltip.has_pending());
        assert!(!tooltip.fire(ticket));
        assert!(!tooltip.is_visible());
    }

    #[test]
    fn test_composing_skips_hit_test() {
        let mut tooltip = TooltipController::new("m");
        assert_eq!(tooltip.on_pointer_move(15.0, 25.0, &rects(), true), TooltipCommand::Hide);
        assert!(!tooltip.has_pending());
        assert!(!tooltip.is_visible());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut tooltip = TooltipController::new("m");
        let TooltipCommand::Schedule { ticket } = tooltip.on_pointer_move(15.0, 25.0, &rects(), false)
        else {
            panic!("expected schedule");
        };
        tooltip.reset();
        assert!(!tooltip.fire(ticket));
        assert!(!tooltip.is_visible());
    }
}
