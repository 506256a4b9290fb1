use glam::Vec3;

use crate::model::{Color, LightSpec, MAX_LIGHTS};

/// Which of the two demos is running. The interactive one is a strict superset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Basic,
    Interactive,
}

impl Variant {
    pub fn has_gui(self) -> bool {
        self == Variant::Interactive
    }

    pub fn has_movable_light(self) -> bool {
        self == Variant::Interactive
    }

    pub fn has_cursor_toggle(self) -> bool {
        self == Variant::Interactive
    }
}

/// Start-up settings for one demo window.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub variant: Variant,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub target_fps: u32,
    /// Requested MSAA sample count, lowered if the surface format can't do it.
    pub msaa_samples: u32,
    pub ambient_factor: f32,
    pub smoothness: f32,
    pub lights: [LightSpec; MAX_LIGHTS],
}

impl DemoConfig {
    pub fn basic() -> Self {
        Self {
            variant: Variant::Basic,
            title: "Lighting shaders".to_string(),
            width: 1500,
            height: 900,
            target_fps: 60,
            msaa_samples: 4,
            ambient_factor: 0.1,
            smoothness: 32.0,
            lights: [
                LightSpec { position: Vec3::new(-13.0, 1.0, -10.0), target: Vec3::ZERO, color: Color::BLUE },
                LightSpec { position: Vec3::new(13.0, 1.0, -10.0), target: Vec3::ZERO, color: Color::RED },
            ],
        }
    }

    pub fn interactive() -> Self {
        Self {
            variant: Variant::Interactive,
            title: "Lighting shaders (interactive)".to_string(),
            ..Self::basic()
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self::basic()
    }
}
