use crate::model::Color;
use crate::view::uniforms::{UniformLocation, UniformTarget, UniformValue};

/// Per-drawable surface parameters fed to the lighting shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub tint: Color,
    pub diffuse_factor: f32,
    pub specular_factor: f32,
}

impl Material {
    pub fn new(tint: Color) -> Self {
        Self { tint, diffuse_factor: 1.0, specular_factor: 0.5 }
    }

    pub fn with_factors(tint: Color, diffuse_factor: f32, specular_factor: f32) -> Self {
        Self { tint, diffuse_factor, specular_factor }
    }

    /// Write this material into an object uniform block.
    pub fn apply(&self, target: &mut impl UniformTarget, slots: &MaterialSlots) {
        target.set_value(slots.tint, UniformValue::Vec4(self.tint.normalized()));
        target.set_value(slots.diffuse_factor, UniformValue::Float(self.diffuse_factor));
        target.set_value(slots.specular_factor, UniformValue::Float(self.specular_factor));
    }
}

/// Resolved uniform locations of the material fields.
#[derive(Debug, Clone, Copy)]
pub struct MaterialSlots {
    pub tint: UniformLocation,
    pub diffuse_factor: UniformLocation,
    pub specular_factor: UniformLocation,
}

impl MaterialSlots {
    pub fn resolve(target: &impl UniformTarget) -> Self {
        Self {
            tint: target.location("tint"),
            diffuse_factor: target.location("diffuseFactor"),
            specular_factor: target.location("specularFactor"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::uniforms::{UniformBlock, UniformLayout};

    #[test]
    fn apply_writes_tint_and_factors() {
        let mut block = UniformBlock::new(UniformLayout::object());
        let slots = MaterialSlots::resolve(&block);

        Material::with_factors(Color::DARKBLUE, 0.8, 0.1).apply(&mut block, &slots);

        assert_eq!(block.value_of("tint"), Some(UniformValue::Vec4(Color::DARKBLUE.normalized())));
        assert_eq!(block.value_of("diffuseFactor"), Some(UniformValue::Float(0.8)));
        assert_eq!(block.value_of("specularFactor"), Some(UniformValue::Float(0.1)));
    }
}
