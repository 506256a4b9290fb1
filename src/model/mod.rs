// MODEL: scene state, lights and materials
pub mod camera;
pub mod color;
pub mod light;
pub mod material;
pub mod scene;

pub use camera::Camera;
pub use color::Color;
pub use light::{Light, LightRig, LightSpec, MAX_LIGHTS, MOVE_STEP};
pub use material::{Material, MaterialSlots};
pub use scene::{Scene, SceneObject, Shape};
