/// 8-bit RGBA color, the way colors are authored and edited in the demos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const RAYWHITE: Color = Color::new(245, 245, 245, 255);
    pub const DARKGRAY: Color = Color::new(80, 80, 80, 255);
    pub const LIME: Color = Color::new(0, 158, 47, 255);
    pub const BLUE: Color = Color::new(0, 121, 241, 255);
    pub const DARKBLUE: Color = Color::new(0, 82, 172, 255);
    pub const RED: Color = Color::new(230, 41, 55, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_array([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Channels divided by 255, as pushed into `vec4` uniforms.
    pub fn normalized(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Same color with alpha replaced by `alpha` (0..=1).
    pub fn fade(self, alpha: f32) -> Self {
        Self { a: (255.0 * alpha.clamp(0.0, 1.0)) as u8, ..self }
    }

    /// Clear color for an sRGB surface (wgpu expects linear values).
    pub fn to_linear_wgpu(self) -> wgpu::Color {
        let [r, g, b, a] = self.normalized();
        let linear = |c: f32| (c as f64).powf(2.2);
        wgpu::Color { r: linear(r), g: linear(g), b: linear(b), a: a as f64 }
    }

    pub fn to_egui(self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_hits_both_ends_exactly() {
        assert_eq!(Color::WHITE.normalized(), [1.0; 4]);
        assert_eq!(Color::new(0, 0, 0, 0).normalized(), [0.0; 4]);
    }

    #[test]
    fn normalization_divides_every_channel() {
        for c in 0..=255u8 {
            let [r, g, b, a] = Color::new(c, c, c, c).normalized();
            let expected = c as f32 / 255.0;
            assert_eq!((r, g, b, a), (expected, expected, expected, expected));
        }
    }

    #[test]
    fn fade_only_touches_alpha() {
        let faded = Color::RED.fade(0.3);
        assert_eq!(faded.a, 76);
        assert_eq!((faded.r, faded.g, faded.b), (230, 41, 55));
        assert_eq!(Color::RED.fade(2.0).a, 255);
    }
}
