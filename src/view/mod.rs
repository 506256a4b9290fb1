// VIEW: GPU setup, meshes, uniforms and drawing
pub mod gpu_init;
pub mod mesh;
pub mod render;
pub mod uniforms;

pub use gpu_init::GpuContext;
pub use render::{marker_style, MarkerShape, Renderer, UiFrame};
pub use uniforms::{UniformBlock, UniformLayout, UniformLocation, UniformTarget, UniformValue};
