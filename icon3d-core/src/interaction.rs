/// Drag-to-rotate and click-to-navigate state machine for a single icon.
///
/// A press on the icon starts a drag, page-wide motion accumulates yaw, and a
/// page-wide release ends it. Once the pointer has travelled further than the
/// threshold from where the press started, the gesture counts as a rotation
/// and the click that follows does not navigate.

use crate::config::GalleryConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { start_x: f64, last_x: f64 },
}

/// What a click on the icon should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    Navigate,
    Suppress,
}

#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    has_dragged: bool,
    sensitivity: f32,
    threshold: f64,
}

impl DragController {
    pub fn new(sensitivity: f32, threshold: f64) -> Self {
        Self {
            state: DragState::Idle,
            has_dragged: false,
            sensitivity,
            threshold,
        }
    }

    pub fn from_config(config: &GalleryConfig) -> Self {
        Self::new(config.drag_sensitivity, config.drag_threshold)
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn has_dragged(&self) -> bool {
        self.has_dragged
    }

    /// Mouse-down / touch-start on the icon element
    pub fn press(&mut self, x: f64) {
        self.state = DragState::Dragging { start_x: x, last_x: x };
        self.has_dragged = false;
    }

    /// Page-wide mouse-move / touch-move. Returns the yaw delta to apply, or
    /// `None` when this icon is not being dragged.
    pub fn motion(&mut self, x: f64) -> Option<f32> {
        let DragState::Dragging { start_x, last_x } = self.state else {
            return None;
        };

        if (x - start_x).abs() > self.threshold {
            self.has_dragged = true;
        }
        self.state = DragState::Dragging { start_x, last_x: x };

        Some((x - last_x) as f32 * self.sensitivity)
    }

    /// Page-wide mouse-up / touch-end
    pub fn release(&mut self) {
        self.state = DragState::Idle;
    }

    pub fn click(&self) -> ClickAction {
        if self.has_dragged {
            ClickAction::Suppress
        } else {
            ClickAction::Navigate
        }
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::from_config(&GalleryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_while_idle_is_ignored() {
        let mut drag = DragController::default();
        assert_eq!(drag.motion(50.0), None);
        assert_eq!(drag.state(), DragState::Idle);
        assert_eq!(drag.click(), ClickAction::Navigate);
    }

    #[test]
    fn test_drag_back_and_forth_suppresses_click() {
        let mut drag = DragController::default();
        drag.press(100.0);
        let first = drag.motion(110.0).unwrap();
        let second = drag.motion(95.0).unwrap();
        drag.release();

        assert!((first - 0.2).abs() < 1e-6);
        assert!((second + 0.3).abs() < 1e-6);
        assert!(drag.has_dragged());
        assert!(!drag.is_dragging());
        assert_eq!(drag.click(), ClickAction::Suppress);
    }

    #[test]
    fn test_small_wobble_still_navigates() {
        let mut drag = DragController::default();
        drag.press(100.0);
        drag.motion(101.0);
        drag.release();

        assert!(!drag.has_dragged());
        assert_eq!(drag.click(), ClickAction::Navigate);
    }

    #[test]
    fn test_threshold_measured_from_press_point() {
        let mut drag = DragController::default();
        drag.press(0.0);
        for x in [1.0, 2.0, 1.0, 0.0] {
            drag.motion(x);
        }
        assert!(!drag.has_dragged());
        drag.motion(-2.5);
        assert!(drag.has_dragged());
    }

    #[test]
    fn test_new_press_clears_previous_drag() {
        let mut drag = DragController::default();
        drag.press(0.0);
        drag.motion(30.0);
        drag.release();
        assert!(drag.has_dragged());

        drag.press(5.0);
        assert!(!drag.has_dragged());
        assert_eq!(drag.state(), DragState::Dragging { start_x: 5.0, last_x: 5.0 });
    }
}
