use glam::Vec3;
use std::ops::{Index, IndexMut};

use crate::model::Color;
use crate::view::uniforms::{UniformLocation, UniformTarget, UniformValue};

/// Number of light slots declared by the lighting shader.
pub const MAX_LIGHTS: usize = 2;

/// Distance a light travels per `move_*` call.
pub const MOVE_STEP: f32 = 0.1;

pub fn light_uniform_name(id: usize, field: &str) -> String {
    format!("lights[{id}].{field}")
}

/// One shader light and the uniform locations of its `lights[id]` entry.
///
/// Locations are resolved once in [`Light::new`] and are only valid for the
/// uniform target passed there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    id: usize,
    enabled: bool,
    position: Vec3,
    target: Vec3,
    color: Color,

    enabled_loc: UniformLocation,
    position_loc: UniformLocation,
    target_loc: UniformLocation,
    color_loc: UniformLocation,
}

impl Light {
    pub fn new(id: usize, position: Vec3, target: Vec3, color: Color, shader: &impl UniformTarget) -> Self {
        Self {
            id,
            enabled: true,
            position,
            target,
            color,
            enabled_loc: shader.location(&light_uniform_name(id, "enabled")),
            position_loc: shader.location(&light_uniform_name(id, "position")),
            target_loc: shader.location(&light_uniform_name(id, "target")),
            color_loc: shader.location(&light_uniform_name(id, "color")),
        }
    }

    /// Push the current state into the shader's uniforms.
    pub fn update(&self, shader: &mut impl UniformTarget) {
        shader.set_value(self.enabled_loc, UniformValue::Int(self.enabled as i32));
        shader.set_value(self.position_loc, UniformValue::Vec3(self.position.to_array()));
        shader.set_value(self.target_loc, UniformValue::Vec3(self.target.to_array()));
        shader.set_value(self.color_loc, UniformValue::Vec4(self.color.normalized()));
    }

    pub fn toggle(&mut self) {
        self.enabled ^= true;
    }

    pub fn move_left(&mut self) {
        self.position.x -= MOVE_STEP;
    }

    pub fn move_right(&mut self) {
        self.position.x += MOVE_STEP;
    }

    pub fn move_forward(&mut self) {
        self.position.z += MOVE_STEP;
    }

    pub fn move_backward(&mut self) {
        self.position.z -= MOVE_STEP;
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

/// Initial state of one light slot.
#[derive(Debug, Clone, Copy)]
pub struct LightSpec {
    pub position: Vec3,
    pub target: Vec3,
    pub color: Color,
}

/// Fixed set of lights where the slot index is also the `lights[i]` suffix.
#[derive(Debug, Clone)]
pub struct LightRig<const N: usize> {
    lights: [Light; N],
}

impl<const N: usize> LightRig<N> {
    pub fn new(specs: [LightSpec; N], shader: &impl UniformTarget) -> Self {
        let mut slot = 0;
        let lights = specs.map(|spec| {
            let light = Light::new(slot, spec.position, spec.target, spec.color, shader);
            slot += 1;
            light
        });
        Self { lights }
    }

    pub fn get(&self, slot: usize) -> Option<&Light> {
        self.lights.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Light> {
        self.lights.get_mut(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Light> {
        self.lights.iter_mut()
    }

    pub fn update_all(&self, shader: &mut impl UniformTarget) {
        for light in &self.lights {
            light.update(shader);
        }
    }
}

impl<const N: usize> Index<usize> for LightRig<N> {
    type Output = Light;

    fn index(&self, slot: usize) -> &Light {
        &self.lights[slot]
    }
}

impl<const N: usize> IndexMut<usize> for LightRig<N> {
    fn index_mut(&mut self, slot: usize) -> &mut Light {
        &mut self.lights[slot]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::uniforms::{UniformBlock, UniformLayout};

    fn shader() -> UniformBlock {
        UniformBlock::new(UniformLayout::scene(MAX_LIGHTS))
    }

    fn light_at(position: Vec3, shader: &UniformBlock) -> Light {
        Light::new(0, position, Vec3::ZERO, Color::BLUE, shader)
    }

    #[test]
    fn toggle_parity() {
        let shader = shader();
        let mut light = light_at(Vec3::ZERO, &shader);
        for n in 1..=7 {
            light.toggle();
            assert_eq!(light.is_enabled(), n % 2 == 0, "after {n} toggles");
        }
    }

    #[test]
    fn single_step_round_trip_is_exact() {
        let shader = shader();
        for x in [-13.0, -10.0, 0.0, 1.0, 2.5, 13.0] {
            let mut light = light_at(Vec3::new(x, 1.0, -10.0), &shader);
            light.move_left();
            light.move_right();
            assert_eq!(light.position().x, x);
        }
    }

    #[test]
    fn moves_stay_on_their_axis() {
        let shader = shader();
        let start = Vec3::new(-13.0, 1.0, -10.0);
        let mut light = light_at(start, &shader);
        light.move_forward();
        light.move_backward();
        light.move_right();
        assert_eq!(light.position().y, start.y);
        assert_eq!(light.position().z, start.z);
        assert!(light.position().x > start.x);
    }

    #[test]
    fn update_writes_all_four_fields() {
        let mut shader = shader();
        let mut light = Light::new(1, Vec3::new(13.0, 1.0, -10.0), Vec3::ZERO, Color::RED, &shader);
        light.toggle();
        light.update(&mut shader);

        assert_eq!(shader.value_of("lights[1].enabled"), Some(UniformValue::Int(0)));
        assert_eq!(shader.value_of("lights[1].position"), Some(UniformValue::Vec3([13.0, 1.0, -10.0])));
        assert_eq!(shader.value_of("lights[1].target"), Some(UniformValue::Vec3([0.0; 3])));
        assert_eq!(shader.value_of("lights[1].color"), Some(UniformValue::Vec4(Color::RED.normalized())));
        // slot 0 untouched
        assert_eq!(shader.value_of("lights[0].enabled"), Some(UniformValue::Int(0)));
        assert_eq!(shader.value_of("lights[0].color"), Some(UniformValue::Vec4([0.0; 4])));
    }

    #[test]
    fn light_without_shader_slot_does_nothing() {
        let mut shader = shader();
        shader.take_dirty();
        let light = Light::new(MAX_LIGHTS, Vec3::ONE, Vec3::ZERO, Color::WHITE, &shader);
        light.update(&mut shader);
        assert!(!shader.take_dirty());
    }

    #[test]
    fn rig_assigns_slot_ids_in_order() {
        let shader = shader();
        let spec = |color| LightSpec { position: Vec3::ZERO, target: Vec3::ZERO, color };
        let rig = LightRig::new([spec(Color::BLUE), spec(Color::RED)], &shader);

        let ids: Vec<_> = rig.iter().map(Light::id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(rig[1].color(), Color::RED);
        assert!(rig.get(2).is_none());
    }
}
