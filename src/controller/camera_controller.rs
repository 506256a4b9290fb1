use glam::Vec3;

use crate::controller::input::{InputState, KeyBindings};
use crate::model::camera::PITCH_LIMIT;
use crate::model::Camera;

/// Free-fly camera: mouse look plus WASD/Space/Shift movement
pub struct CameraController {
    pub move_speed: f32,
    pub boost_multiplier: f32,
    pub mouse_sensitivity: f32,
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            move_speed: 5.0,
            boost_multiplier: 4.0,
            mouse_sensitivity: 0.002,
        }
    }

    /// Apply mouse look delta to camera
    pub fn apply_look(&self, camera: &mut Camera, dx: f32, dy: f32) {
        camera.yaw += dx * self.mouse_sensitivity;
        camera.pitch = (camera.pitch - dy * self.mouse_sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Update camera position based on held keys
    pub fn update_movement(&self, camera: &mut Camera, input: &InputState, bindings: &KeyBindings, dt: f32) {
        let mut cam_move = Vec3::ZERO;
        let mut speed = self.move_speed * dt;

        if input.is_key_down(bindings.boost) {
            speed *= self.boost_multiplier;
        }

        if input.is_key_down(bindings.forward) {
            cam_move += camera.forward();
        }
        if input.is_key_down(bindings.backward) {
            cam_move -= camera.forward();
        }

        let cam_right = camera.forward().cross(camera.up).normalize();
        if input.is_key_down(bindings.left) {
            cam_move -= cam_right;
        }
        if input.is_key_down(bindings.right) {
            cam_move += cam_right;
        }

        if input.is_key_down(bindings.up) {
            cam_move += Vec3::Y;
        }
        if input.is_key_down(bindings.down) {
            cam_move -= Vec3::Y;
        }

        if cam_move.length_squared() > 0.0 {
            camera.eye += cam_move.normalize() * speed;
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::InputEvent;
    use winit::keyboard::KeyCode;

    #[test]
    fn pitch_is_clamped() {
        let controller = CameraController::new();
        let mut camera = Camera::new(800, 600);
        controller.apply_look(&mut camera, 0.0, -1.0e6);
        assert_eq!(camera.pitch, PITCH_LIMIT);
    }

    #[test]
    fn forward_key_moves_along_view_direction() {
        let controller = CameraController::new();
        let bindings = KeyBindings::default();
        let mut camera = Camera::new(800, 600);
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown { code: KeyCode::KeyW, repeat: false });

        let start = camera.eye;
        let forward = camera.forward();
        controller.update_movement(&mut camera, &input, &bindings, 1.0);

        let moved = camera.eye - start;
        assert!(moved.abs_diff_eq(forward * controller.move_speed, 1e-4));
    }
}
