//! Input mapping for keyboard and mouse.
//!
//! Raw device events are folded into a small set of logical flags and deltas.
//! The event dispatcher is the only writer; the frame loop is the only reader and
//! drains the per-frame deltas exactly once with [`InputState::take_frame`] and
//! [`InputState::drain_wheel`].

use glam::Vec2;

/// Designated mouse button that drags the camera around the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragButton {
    Left,
    #[default]
    Right,
    Middle,
}

impl DragButton {
    fn matches(self, button: MouseButton) -> bool {
        matches!(
            (self, button),
            (DragButton::Left, MouseButton::Left)
                | (DragButton::Right, MouseButton::Right)
                | (DragButton::Middle, MouseButton::Middle)
        )
    }
}

/// Held movement keys. Each flag is independent; no repeat or debounce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementFlags {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Jump on land, swim up in water.
    pub ascend: bool,
}

/// Keys and drag motion accumulated between two frames, handed to the frame loop once.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Held movement keys at the time of draining.
    pub movement: MovementFlags,
    /// Horizontal pixels dragged since the previous frame. Only motion made while the
    /// drag button was down is counted, even if it has been released since.
    pub drag_delta_x: f32,
}

/// Outcome of a mouse-button event for the platform layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonResponse {
    Ignored,
    /// The press started or ended a camera drag; the platform's context menu
    /// for this button must be suppressed.
    SuppressContextMenu,
}

/// Logical input state, mutated in place for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InputState {
    movement: MovementFlags,
    drag_button: DragButton,
    drag_active: bool,
    /// Last cursor position seen while dragging, for absolute cursor events.
    last_cursor: Option<Vec2>,
    drag_delta_x: f32,
    /// Wheel events since the last drain, in arrival order.
    wheel: Vec<f32>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input state that drags the camera with `button`.
    pub fn with_drag_button(button: DragButton) -> Self {
        Self {
            drag_button: button,
            ..Self::default()
        }
    }

    /// Process a keyboard event. Unmapped keys are ignored.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        let pressed = state.is_pressed();
        let flag = match key {
            KeyCode::KeyW => &mut self.movement.forward,
            KeyCode::KeyS => &mut self.movement.backward,
            KeyCode::KeyA => &mut self.movement.left,
            KeyCode::KeyD => &mut self.movement.right,
            KeyCode::Space => &mut self.movement.ascend,
            _ => return,
        };
        *flag = pressed;
    }

    /// Process a mouse button event.
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) -> ButtonResponse {
        if !self.drag_button.matches(button) {
            return ButtonResponse::Ignored;
        }
        match state {
            ElementState::Pressed => self.drag_active = true,
            ElementState::Released => self.drag_active = false,
        }
        self.last_cursor = None;
        log::trace!("Camera drag active: {}", self.drag_active);
        ButtonResponse::SuppressContextMenu
    }

    /// Process an absolute cursor position (window event). Ignored unless dragging;
    /// the first position after a press only anchors the drag.
    pub fn process_cursor_position(&mut self, position: (f64, f64)) {
        let position = Vec2::new(position.0 as f32, position.1 as f32);
        if !self.drag_active {
            return;
        }
        if let Some(previous) = self.last_cursor {
            self.drag_delta_x += position.x - previous.x;
        }
        self.last_cursor = Some(position);
    }

    /// Process a wheel event, in pixel-equivalent units (positive = zoom out).
    /// Events are kept individually so each one can be clamped on its own.
    pub fn process_scroll(&mut self, delta_y: f32) {
        self.wheel.push(delta_y);
    }

    /// Currently held movement keys.
    pub fn movement(&self) -> MovementFlags {
        self.movement
    }

    /// Whether a camera drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag_active
    }

    /// Drain this frame's drag motion. Movement flags persist.
    pub fn take_frame(&mut self) -> FrameInput {
        let frame = FrameInput {
            movement: self.movement,
            drag_delta_x: self.drag_delta_x,
        };
        self.drag_delta_x = 0.0;
        frame
    }

    /// Drain this frame's wheel events in arrival order. The buffer keeps its capacity.
    pub fn drain_wheel(&mut self) -> std::vec::Drain<'_, f32> {
        self.wheel.drain(..)
    }

    /// Release everything, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        let drag_button = self.drag_button;
        *self = Self::with_drag_button(drag_button);
    }
}

/// Wheel lines are converted to pixels with this factor, matching a browser's
/// `deltaMode = DOM_DELTA_LINE` scale.
pub const PIXELS_PER_LINE: f32 = 100.0;

/// Normalize a winit wheel delta to pixel-equivalent units, positive = scroll towards the user.
pub fn scroll_delta_pixels(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * PIXELS_PER_LINE,
        MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
    }
}

// Re-export for convenience
pub use winit::event::{ElementState, MouseButton, MouseScrollDelta};
pub use winit::keyboard::KeyCode;
