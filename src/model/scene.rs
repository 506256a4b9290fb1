use glam::{Mat4, Vec3};

use crate::config::DemoConfig;
use crate::model::{Camera, Color, LightRig, Material, MAX_LIGHTS};
use crate::view::uniforms::{UniformBlock, UniformLayout, UniformLocation, UniformTarget, UniformValue};

/// Mesh a scene object is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Floor,
    Sphere,
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: &'static str,
    pub shape: Shape,
    pub position: Vec3,
    pub scale: f32,
    pub material: Material,
}

impl SceneObject {
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), glam::Quat::IDENTITY, self.position)
    }
}

/// `ambient` uniform for a given ambient factor.
pub fn ambient_uniform(factor: f32) -> [f32; 4] {
    [factor, factor, factor, 1.0]
}

struct SceneLocations {
    view_proj: UniformLocation,
    view_pos: UniformLocation,
    camera_target: UniformLocation,
    ambient: UniformLocation,
    smoothness: UniformLocation,
}

/// Everything the frame loop mutates: camera, lights, materials and the
/// scene uniform block they are mirrored into.
pub struct Scene {
    pub camera: Camera,
    pub lights: LightRig<MAX_LIGHTS>,
    pub objects: Vec<SceneObject>,
    pub uniforms: UniformBlock,
    pub ambient_factor: f32,
    pub smoothness: f32,
    /// GUI-editable light colors, copied into the lights each frame.
    pub palette: [Color; MAX_LIGHTS],
    pub cursor_captured: bool,
    locs: SceneLocations,
}

impl Scene {
    pub fn new(config: &DemoConfig, width: u32, height: u32) -> Self {
        let uniforms = UniformBlock::new(UniformLayout::scene(MAX_LIGHTS));
        let locs = SceneLocations {
            view_proj: uniforms.location("viewProj"),
            view_pos: uniforms.location("viewPos"),
            camera_target: uniforms.location("cameraTarget"),
            ambient: uniforms.location("ambient"),
            smoothness: uniforms.location("smoothness"),
        };
        let lights = LightRig::new(config.lights, &uniforms);
        let palette = config.lights.map(|spec| spec.color);

        let mut objects = vec![SceneObject {
            name: "Floor",
            shape: Shape::Floor,
            position: Vec3::ZERO,
            scale: 1.0,
            material: Material::with_factors(Color::DARKBLUE, 1.0, 0.1),
        }];
        for (i, x) in [-4.5, -1.5, 1.5, 4.5].into_iter().enumerate() {
            objects.push(SceneObject {
                name: ["Sphere 1", "Sphere 2", "Sphere 3", "Sphere 4"][i],
                shape: Shape::Sphere,
                position: Vec3::new(x, 1.0, 0.0),
                scale: 1.0,
                material: Material::with_factors(Color::WHITE, 1.0, 0.25 * (i + 1) as f32),
            });
        }

        let mut scene = Self {
            camera: Camera::new(width, height),
            lights,
            objects,
            uniforms,
            ambient_factor: config.ambient_factor,
            smoothness: config.smoothness,
            palette,
            cursor_captured: true,
            locs,
        };
        scene.push_camera();
        scene.push_lighting_factors();
        scene.lights.update_all(&mut scene.uniforms);
        scene
    }

    /// View-dependent uniforms: `viewProj`, `viewPos`, `cameraTarget`.
    pub fn push_camera(&mut self) {
        let camera = &self.camera;
        self.uniforms.set_value(self.locs.view_proj, UniformValue::Mat4(camera.view_proj().to_cols_array()));
        self.uniforms.set_value(self.locs.view_pos, UniformValue::Vec3(camera.eye.to_array()));
        self.uniforms.set_value(self.locs.camera_target, UniformValue::Vec3(camera.target().to_array()));
    }

    /// `ambient` and `smoothness`, both driven by GUI sliders.
    pub fn push_lighting_factors(&mut self) {
        self.uniforms.set_value(self.locs.ambient, UniformValue::Vec4(ambient_uniform(self.ambient_factor)));
        self.uniforms.set_value(self.locs.smoothness, UniformValue::Float(self.smoothness));
    }

    /// Push every light, optionally taking its color from the palette first.
    pub fn sync_lights(&mut self, use_palette: bool) {
        for (light, color) in self.lights.iter_mut().zip(self.palette) {
            if use_palette {
                light.set_color(color);
            }
            light.update(&mut self.uniforms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambient_factor_extremes() {
        assert_eq!(ambient_uniform(0.0), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(ambient_uniform(1.0), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn scene_has_a_floor_and_four_spheres() {
        let scene = Scene::new(&DemoConfig::basic(), 1500, 900);
        assert_eq!(scene.objects.iter().filter(|o| o.shape == Shape::Floor).count(), 1);
        assert_eq!(scene.objects.iter().filter(|o| o.shape == Shape::Sphere).count(), 4);
        assert!(scene.lights.iter().all(|l| l.is_enabled()));
    }

    #[test]
    fn lighting_factors_reach_the_uniforms() {
        let mut scene = Scene::new(&DemoConfig::interactive(), 800, 600);
        scene.ambient_factor = 1.0;
        scene.smoothness = 100.0;
        scene.push_lighting_factors();

        assert_eq!(scene.uniforms.value_of("ambient"), Some(UniformValue::Vec4([1.0; 4])));
        assert_eq!(scene.uniforms.value_of("smoothness"), Some(UniformValue::Float(100.0)));
    }

    #[test]
    fn palette_only_applies_when_requested() {
        let mut scene = Scene::new(&DemoConfig::interactive(), 800, 600);
        scene.palette[0] = Color::LIME;

        scene.sync_lights(false);
        assert_eq!(scene.lights[0].color(), Color::BLUE);

        scene.sync_lights(true);
        assert_eq!(scene.lights[0].color(), Color::LIME);
        assert_eq!(scene.uniforms.value_of("lights[0].color"), Some(UniformValue::Vec4(Color::LIME.normalized())));
    }
}
