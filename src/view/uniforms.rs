//! CPU-side images of the WGSL uniform structs.
//!
//! WGSL has no by-name uniform lookup, so each uniform struct is mirrored by a
//! [`UniformLayout`] (name -> byte offset + kind). Names are resolved once into
//! [`UniformLocation`]s, writes go into a byte image, and the renderer uploads
//! the whole image with `Queue::write_buffer` before drawing.

use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Int,
    Float,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformKind {
    pub fn size(self) -> usize {
        match self {
            UniformKind::Int | UniformKind::Float => 4,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 => 16,
            UniformKind::Mat4 => 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4([f32; 16]),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }

    fn bytes(&self) -> &[u8] {
        match self {
            UniformValue::Int(v) => bytemuck::bytes_of(v),
            UniformValue::Float(v) => bytemuck::bytes_of(v),
            UniformValue::Vec3(v) => bytemuck::bytes_of(v),
            UniformValue::Vec4(v) => bytemuck::bytes_of(v),
            UniformValue::Mat4(v) => bytemuck::bytes_of(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformField {
    pub name: String,
    pub offset: usize,
    pub kind: UniformKind,
}

/// Opaque handle to one field of a [`UniformLayout`].
///
/// Only meaningful for the layout it was resolved against. The invalid handle
/// turns every write into a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UniformLocation(Option<usize>);

impl UniformLocation {
    pub const INVALID: UniformLocation = UniformLocation(None);

    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }
}

/// Byte layout of a WGSL uniform struct (uniform address space rules).
#[derive(Debug, Clone)]
pub struct UniformLayout {
    label: &'static str,
    size: usize,
    fields: Vec<UniformField>,
}

/// Byte stride of one `Light` entry inside `SceneUniforms.lights`.
pub const LIGHT_STRIDE: usize = 48;
const LIGHTS_OFFSET: usize = 112;

impl UniformLayout {
    pub fn new(label: &'static str, size: usize) -> Self {
        Self { label, size, fields: Vec::new() }
    }

    pub fn with_field(mut self, name: impl Into<String>, offset: usize, kind: UniformKind) -> Self {
        debug_assert!(offset + kind.size() <= self.size, "uniform field outside of block");
        self.fields.push(UniformField { name: name.into(), offset, kind });
        self
    }

    /// Mirrors `SceneUniforms` in `shaders/lighting.wgsl` and `shaders/unlit.wgsl`.
    pub fn scene(max_lights: usize) -> Self {
        let mut layout = Self::new("scene", LIGHTS_OFFSET + LIGHT_STRIDE * max_lights)
            .with_field("viewProj", 0, UniformKind::Mat4)
            .with_field("viewPos", 64, UniformKind::Vec3)
            .with_field("smoothness", 76, UniformKind::Float)
            .with_field("cameraTarget", 80, UniformKind::Vec3)
            .with_field("ambient", 96, UniformKind::Vec4);

        for id in 0..max_lights {
            let base = LIGHTS_OFFSET + id * LIGHT_STRIDE;
            layout = layout
                .with_field(format!("lights[{id}].position"), base, UniformKind::Vec3)
                .with_field(format!("lights[{id}].enabled"), base + 12, UniformKind::Int)
                .with_field(format!("lights[{id}].target"), base + 16, UniformKind::Vec3)
                .with_field(format!("lights[{id}].color"), base + 32, UniformKind::Vec4);
        }
        layout
    }

    /// Mirrors `ObjectUniforms`, one instance per drawable.
    pub fn object() -> Self {
        Self::new("object", 96)
            .with_field("model", 0, UniformKind::Mat4)
            .with_field("tint", 64, UniformKind::Vec4)
            .with_field("diffuseFactor", 80, UniformKind::Float)
            .with_field("specularFactor", 84, UniformKind::Float)
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Something uniform names can be resolved against and values written to.
pub trait UniformTarget {
    fn location(&self, name: &str) -> UniformLocation;
    fn set_value(&mut self, location: UniformLocation, value: UniformValue);
}

/// Byte image of one uniform struct plus its layout.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: UniformLayout,
    data: Vec<u8>,
    dirty: bool,
}

impl UniformBlock {
    pub fn new(layout: UniformLayout) -> Self {
        let data = vec![0u8; layout.size()];
        Self { layout, data, dirty: true }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns whether anything was written since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Read back the value currently stored at `location`.
    pub fn value(&self, location: UniformLocation) -> Option<UniformValue> {
        let field = self.layout.fields.get(location.0?)?;
        let bytes = &self.data[field.offset..field.offset + field.kind.size()];
        Some(match field.kind {
            UniformKind::Int => UniformValue::Int(bytemuck::pod_read_unaligned(bytes)),
            UniformKind::Float => UniformValue::Float(bytemuck::pod_read_unaligned(bytes)),
            UniformKind::Vec3 => UniformValue::Vec3(bytemuck::pod_read_unaligned(bytes)),
            UniformKind::Vec4 => UniformValue::Vec4(bytemuck::pod_read_unaligned(bytes)),
            UniformKind::Mat4 => UniformValue::Mat4(bytemuck::pod_read_unaligned(bytes)),
        })
    }

    pub fn value_of(&self, name: &str) -> Option<UniformValue> {
        self.layout.find(name).and_then(|idx| self.value(UniformLocation(Some(idx))))
    }
}

impl UniformTarget for UniformBlock {
    fn location(&self, name: &str) -> UniformLocation {
        match self.layout.find(name) {
            Some(idx) => UniformLocation(Some(idx)),
            None => {
                warn!(block = self.layout.label, uniform = name, "uniform not found, writes to it are ignored");
                UniformLocation::INVALID
            }
        }
    }

    fn set_value(&mut self, location: UniformLocation, value: UniformValue) {
        let Some(field) = location.0.and_then(|idx| self.layout.fields.get(idx)) else {
            return;
        };
        if field.kind != value.kind() {
            debug!(uniform = %field.name, expected = ?field.kind, got = ?value.kind(), "uniform kind mismatch");
            return;
        }
        let end = field.offset + field.kind.size();
        self.data[field.offset..end].copy_from_slice(value.bytes());
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_layout_matches_wgsl_struct() {
        let layout = UniformLayout::scene(2);
        assert_eq!(layout.size(), 208);
        assert_eq!(layout.size() % 16, 0);

        let offset = |name: &str| layout.fields().iter().find(|f| f.name == name).map(|f| f.offset);
        assert_eq!(offset("ambient"), Some(96));
        assert_eq!(offset("lights[0].position"), Some(112));
        assert_eq!(offset("lights[1].enabled"), Some(112 + 48 + 12));
        assert_eq!(offset("lights[1].color"), Some(112 + 48 + 32));
    }

    #[test]
    fn fields_never_overlap() {
        for layout in [UniformLayout::scene(2), UniformLayout::object()] {
            let mut ranges: Vec<_> = layout
                .fields()
                .iter()
                .map(|f| (f.offset, f.offset + f.kind.size()))
                .collect();
            ranges.sort();
            for pair in ranges.windows(2) {
                assert!(pair[0].1 <= pair[1].0, "{} overlaps: {:?}", layout.label(), pair);
            }
        }
    }

    #[test]
    fn written_values_read_back() {
        let mut block = UniformBlock::new(UniformLayout::object());
        let loc = block.location("diffuseFactor");
        block.set_value(loc, UniformValue::Float(0.75));
        assert_eq!(block.value(loc), Some(UniformValue::Float(0.75)));
        assert_eq!(&block.as_bytes()[80..84], &0.75f32.to_ne_bytes());
    }

    #[test]
    fn missing_uniform_is_a_silent_no_op() {
        let mut block = UniformBlock::new(UniformLayout::scene(2));
        block.take_dirty();

        let loc = block.location("lights[5].color");
        assert!(!loc.is_valid());
        block.set_value(loc, UniformValue::Vec4([1.0; 4]));

        assert!(!block.take_dirty());
        assert!(block.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn mismatched_kind_is_ignored() {
        let mut block = UniformBlock::new(UniformLayout::object());
        let loc = block.location("tint");
        block.set_value(loc, UniformValue::Float(3.0));
        assert_eq!(block.value(loc), Some(UniformValue::Vec4([0.0; 4])));
    }
}
