//! RGB colors stored as normalized floats

/// Opaque RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from a `0xRRGGBB` value; bits above 24 are ignored
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    pub fn to_hex(self) -> u32 {
        let [r, g, b] = self.to_rgb8();
        (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }

    pub fn to_rgba(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }

    /// Decodes sRGB components to linear light, the space shaders and
    /// sRGB render targets expect
    pub fn to_linear(self) -> Self {
        let decode = |c: f32| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        Self::new(decode(self.r), decode(self.g), decode(self.b))
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }
}

impl From<Color> for wgpu::Color {
    fn from(color: Color) -> Self {
        let color = color.to_linear();
        wgpu::Color {
            r: color.r as f64,
            g: color.g as f64,
            b: color.b as f64,
            a: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip_of_night_sky() {
        let night = Color::from_hex(0x0d1b2a);
        assert_eq!(night.to_rgb8(), [13, 27, 42]);
        assert_eq!(night.to_hex(), 0x0d1b2a);
    }

    #[test]
    fn test_night_sky_clear_color_is_linear() {
        let clear = wgpu::Color::from(Color::from_hex(crate::gfx::day_night::NIGHT_SKY));
        assert!((clear.r - 0.0040).abs() < 1e-4);
        assert!((clear.g - 0.0110).abs() < 1e-4);
        assert!((clear.b - 0.0232).abs() < 1e-4);
        assert_eq!(clear.a, 1.0);
    }

    #[test]
    fn test_linear_keeps_extremes_and_darkens_midtones() {
        assert!((Color::WHITE.to_linear().g - 1.0).abs() < 1e-5);
        assert_eq!(Color::BLACK.to_linear(), Color::BLACK);
        let mid = Color::new(0.5, 0.5, 0.5).to_linear();
        assert!((mid.r - 0.2140).abs() < 1e-3);
    }

    #[test]
    fn test_from_hex_ignores_high_bits() {
        assert_eq!(Color::from_hex(0xff00_ff00), Color::from_hex(0x00ff00));
    }
}
