use tracing::{debug, info};

use crate::config::Variant;
use crate::controller::{CameraController, InputState, KeyBindings};
use crate::model::Scene;

/// What the window side has to do after a frame update
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutcome {
    /// New cursor capture state, if it changed this frame
    pub cursor_captured: Option<bool>,
    /// Exit key went down this frame
    pub exit_requested: bool,
}

/// Per-frame update sequence: camera, uniforms, key actions, light sync.
/// Drawing happens afterwards in the renderer.
pub struct FrameLoop {
    pub variant: Variant,
    pub bindings: KeyBindings,
    pub camera_controller: CameraController,
}

impl FrameLoop {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            bindings: KeyBindings::default(),
            camera_controller: CameraController::new(),
        }
    }

    pub fn update(&mut self, scene: &mut Scene, input: &mut InputState, dt: f32) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();

        // Camera follows input only while the cursor is captured
        let (dx, dy) = input.consume_look();
        if scene.cursor_captured {
            self.camera_controller.apply_look(&mut scene.camera, dx, dy);
            self.camera_controller
                .update_movement(&mut scene.camera, input, &self.bindings, dt);
        }

        scene.push_camera();
        scene.push_lighting_factors();

        // Discrete presses
        if input.is_key_pressed(self.bindings.exit) {
            outcome.exit_requested = true;
        }
        for (slot, key) in self.bindings.toggle_lights.iter().enumerate() {
            if input.is_key_pressed(*key) {
                if let Some(light) = scene.lights.get_mut(slot) {
                    light.toggle();
                    debug!(slot, enabled = light.is_enabled(), "light toggled");
                }
            }
        }
        if self.variant.has_cursor_toggle() && input.is_key_pressed(self.bindings.toggle_cursor) {
            scene.cursor_captured ^= true;
            info!(captured = scene.cursor_captured, "cursor capture toggled");
            outcome.cursor_captured = Some(scene.cursor_captured);
        }

        // Held keys, one step per frame
        if self.variant.has_movable_light() {
            let light = &mut scene.lights[0];
            if input.is_key_down(self.bindings.light_left) {
                light.move_left();
            }
            if input.is_key_down(self.bindings.light_right) {
                light.move_right();
            }
            if input.is_key_down(self.bindings.light_forward) {
                light.move_forward();
            }
            if input.is_key_down(self.bindings.light_backward) {
                light.move_backward();
            }
        }

        scene.sync_lights(self.variant.has_gui());
        input.end_frame();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DemoConfig;
    use crate::controller::input::InputEvent;
    use crate::model::MOVE_STEP;
    use crate::view::uniforms::UniformValue;
    use glam::Vec3;
    use winit::keyboard::KeyCode;

    fn setup(config: DemoConfig) -> (FrameLoop, Scene, InputState) {
        let scene = Scene::new(&config, 1500, 900);
        (FrameLoop::new(config.variant), scene, InputState::new())
    }

    fn press(input: &mut InputState, code: KeyCode) {
        input.process_event(&InputEvent::KeyDown { code, repeat: false });
    }

    #[test]
    fn toggle_key_flips_light_once_per_press() {
        let (mut frame, mut scene, mut input) = setup(DemoConfig::basic());
        press(&mut input, KeyCode::KeyB);

        frame.update(&mut scene, &mut input, 1.0 / 60.0);
        frame.update(&mut scene, &mut input, 1.0 / 60.0);

        assert!(!scene.lights[0].is_enabled());
        assert!(scene.lights[1].is_enabled());
        assert_eq!(scene.uniforms.value_of("lights[0].enabled"), Some(UniformValue::Int(0)));
        assert_eq!(scene.uniforms.value_of("lights[1].enabled"), Some(UniformValue::Int(1)));
    }

    #[test]
    fn held_key_moves_one_step_per_frame() {
        let (mut frame, mut scene, mut input) = setup(DemoConfig::interactive());
        let start = scene.lights[0].position();
        press(&mut input, KeyCode::KeyH);

        for _ in 0..3 {
            frame.update(&mut scene, &mut input, 1.0 / 60.0);
        }

        let expected = start - Vec3::X * MOVE_STEP * 3.0;
        assert!(scene.lights[0].position().abs_diff_eq(expected, 1e-5));
        assert_eq!(
            scene.uniforms.value_of("lights[0].position"),
            Some(UniformValue::Vec3(scene.lights[0].position().to_array()))
        );
    }

    #[test]
    fn basic_variant_ignores_interactive_keys() {
        let (mut frame, mut scene, mut input) = setup(DemoConfig::basic());
        let start = scene.lights[0].position();
        press(&mut input, KeyCode::KeyL);
        press(&mut input, KeyCode::AltLeft);

        let outcome = frame.update(&mut scene, &mut input, 1.0 / 60.0);

        assert_eq!(scene.lights[0].position(), start);
        assert_eq!(outcome.cursor_captured, None);
        assert!(scene.cursor_captured);
    }

    #[test]
    fn escape_requests_exit_in_both_variants() {
        for config in [DemoConfig::basic(), DemoConfig::interactive()] {
            let (mut frame, mut scene, mut input) = setup(config);
            let idle = frame.update(&mut scene, &mut input, 1.0 / 60.0);
            assert!(!idle.exit_requested);

            press(&mut input, KeyCode::Escape);
            let outcome = frame.update(&mut scene, &mut input, 1.0 / 60.0);
            assert!(outcome.exit_requested);
        }
    }

    #[test]
    fn released_cursor_freezes_camera() {
        let (mut frame, mut scene, mut input) = setup(DemoConfig::interactive());
        press(&mut input, KeyCode::AltLeft);
        let outcome = frame.update(&mut scene, &mut input, 1.0 / 60.0);
        assert_eq!(outcome.cursor_captured, Some(false));

        let eye = scene.camera.eye;
        press(&mut input, KeyCode::KeyW);
        input.process_event(&InputEvent::MouseMove { dx: 40.0, dy: 10.0 });
        frame.update(&mut scene, &mut input, 1.0 / 60.0);
        assert_eq!(scene.camera.eye, eye);
    }

    #[test]
    fn camera_position_is_pushed_every_frame() {
        let (mut frame, mut scene, mut input) = setup(DemoConfig::basic());
        press(&mut input, KeyCode::KeyW);
        frame.update(&mut scene, &mut input, 0.5);

        assert_eq!(
            scene.uniforms.value_of("viewPos"),
            Some(UniformValue::Vec3(scene.camera.eye.to_array()))
        );
        assert_eq!(
            scene.uniforms.value_of("cameraTarget"),
            Some(UniformValue::Vec3(scene.camera.target().to_array()))
        );
    }
}
