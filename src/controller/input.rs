/// Platform-agnostic input handling system
use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// Input events the frame loop cares about, decoupled from winit's event types
#[derive(Debug, Clone)]
pub enum InputEvent {
    KeyDown { code: KeyCode, repeat: bool },
    KeyUp(KeyCode),
    MouseMove { dx: f32, dy: f32 },
    FocusLost,
}

/// Keys held right now, keys pressed since the last frame, and pending mouse look
pub struct InputState {
    held: HashSet<KeyCode>,
    pressed: HashSet<KeyCode>,
    look_delta: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            pressed: HashSet::new(),
            look_delta: (0.0, 0.0),
        }
    }

    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown { code, repeat } => {
                if !*repeat && self.held.insert(*code) {
                    self.pressed.insert(*code);
                }
            }
            InputEvent::KeyUp(code) => {
                self.held.remove(code);
            }
            InputEvent::MouseMove { dx, dy } => {
                self.look_delta.0 += dx;
                self.look_delta.1 += dy;
            }
            InputEvent::FocusLost => {
                self.clear_keys();
            }
        }
    }

    /// Event the UI already handled. Only releases are applied so that keys
    /// let go while a widget has focus don't stay held.
    pub fn process_consumed_event(&mut self, event: &InputEvent) {
        if matches!(event, InputEvent::KeyUp(_) | InputEvent::FocusLost) {
            self.process_event(event);
        }
    }

    /// Held down right now.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Went down since the last [`InputState::end_frame`].
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    pub fn clear_keys(&mut self) {
        self.held.clear();
        self.pressed.clear();
    }

    pub fn consume_look(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.look_delta)
    }

    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub exit: KeyCode,
    pub toggle_lights: [KeyCode; 2],
    pub toggle_cursor: KeyCode,
    pub light_left: KeyCode,
    pub light_right: KeyCode,
    pub light_forward: KeyCode,
    pub light_backward: KeyCode,
    pub forward: KeyCode,
    pub backward: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub up: KeyCode,
    pub down: KeyCode,
    pub boost: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            exit: KeyCode::Escape,
            toggle_lights: [KeyCode::KeyB, KeyCode::KeyR],
            toggle_cursor: KeyCode::AltLeft,
            light_left: KeyCode::KeyH,
            light_right: KeyCode::KeyL,
            light_forward: KeyCode::KeyK,
            light_backward: KeyCode::KeyJ,
            forward: KeyCode::KeyW,
            backward: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            up: KeyCode::Space,
            down: KeyCode::ShiftLeft,
            boost: KeyCode::ControlLeft,
        }
    }
}

pub mod native {
    use super::*;
    use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
    use winit::keyboard::PhysicalKey;

    pub fn window_event_to_input(event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key: PhysicalKey::Code(code), state, repeat, .. },
                ..
            } => Some(match state {
                ElementState::Pressed => InputEvent::KeyDown { code: *code, repeat: *repeat },
                ElementState::Released => InputEvent::KeyUp(*code),
            }),
            WindowEvent::Focused(false) => Some(InputEvent::FocusLost),
            _ => None,
        }
    }

    pub fn device_event_to_input(event: &DeviceEvent) -> Option<InputEvent> {
        match event {
            DeviceEvent::MouseMotion { delta } => Some(InputEvent::MouseMove {
                dx: delta.0 as f32,
                dy: delta.1 as f32,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(code: KeyCode) -> InputEvent {
        InputEvent::KeyDown { code, repeat: false }
    }

    #[test]
    fn consumed_release_still_clears_held_key() {
        let mut input = InputState::new();
        input.process_event(&down(KeyCode::KeyH));
        input.end_frame();

        input.process_consumed_event(&down(KeyCode::KeyL));
        input.process_consumed_event(&InputEvent::KeyUp(KeyCode::KeyH));

        assert!(!input.is_key_down(KeyCode::KeyH));
        assert!(!input.is_key_down(KeyCode::KeyL));
        assert!(!input.is_key_pressed(KeyCode::KeyL));
    }

    #[test]
    fn consumed_focus_loss_drops_every_key() {
        let mut input = InputState::new();
        input.process_event(&down(KeyCode::KeyJ));
        input.process_event(&down(KeyCode::KeyK));

        input.process_consumed_event(&InputEvent::FocusLost);

        assert!(!input.is_key_down(KeyCode::KeyJ));
        assert!(!input.is_key_down(KeyCode::KeyK));
    }

    #[test]
    fn press_lasts_one_frame_hold_persists() {
        let mut input = InputState::new();
        input.process_event(&down(KeyCode::KeyB));
        assert!(input.is_key_pressed(KeyCode::KeyB));
        assert!(input.is_key_down(KeyCode::KeyB));

        input.end_frame();
        assert!(!input.is_key_pressed(KeyCode::KeyB));
        assert!(input.is_key_down(KeyCode::KeyB));

        input.process_event(&InputEvent::KeyUp(KeyCode::KeyB));
        assert!(!input.is_key_down(KeyCode::KeyB));
    }

    #[test]
    fn os_key_repeat_is_not_a_new_press() {
        let mut input = InputState::new();
        input.process_event(&down(KeyCode::KeyR));
        input.end_frame();
        input.process_event(&InputEvent::KeyDown { code: KeyCode::KeyR, repeat: true });
        input.process_event(&down(KeyCode::KeyR));
        assert!(!input.is_key_pressed(KeyCode::KeyR));
    }

    #[test]
    fn look_delta_accumulates_until_consumed() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::MouseMove { dx: 2.0, dy: -1.0 });
        input.process_event(&InputEvent::MouseMove { dx: 3.0, dy: 0.5 });
        assert_eq!(input.consume_look(), (5.0, -0.5));
        assert_eq!(input.consume_look(), (0.0, 0.0));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut input = InputState::new();
        input.process_event(&down(KeyCode::KeyH));
        input.process_event(&InputEvent::FocusLost);
        assert!(!input.is_key_down(KeyCode::KeyH));
        assert!(!input.is_key_pressed(KeyCode::KeyH));
    }
}
