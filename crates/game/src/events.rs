//! Window event handling for GameState.

use input::{scroll_delta_pixels, ButtonResponse};
use winit::event::WindowEvent;
use winit::keyboard::PhysicalKey;

impl crate::GameState {
    /// Handle a window event. Returns true if the app should exit.
    pub(crate) fn handle_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => {
                self.running = false;
                true
            }
            WindowEvent::Resized(size) => {
                self.sim.resize(size.width, size.height);
                false
            }
            WindowEvent::Focused(false) => {
                // Key-up events are lost while unfocused.
                self.sim.input.clear();
                false
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.sim.input.process_keyboard(key, event.state);
                }
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if self.sim.input.process_mouse_button(button, state) == ButtonResponse::SuppressContextMenu {
                    // Desktop windows have no context menu to cancel; the press is ours.
                    log::trace!("Camera drag {:?} (dragging: {})", state, self.sim.input.is_dragging());
                }
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.sim.input.process_cursor_position((position.x, position.y));
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.sim.input.process_scroll(scroll_delta_pixels(delta));
                false
            }
            WindowEvent::RedrawRequested => {
                self.frame();
                self.window.request_redraw();
                false
            }
            _ => false,
        }
    }
}
