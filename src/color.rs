/// Struct, representing raw rgba8 pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

pub const BLACK: Color = Color { r: 0,   g: 0,   b: 0,   a: 255 };
pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Color {
        return Color { r, g, b, a };
    }

    /// Reads a color from the first four bytes of a slice.
    pub fn from_rgba_slice(bytes: &[u8]) -> Color {
        return Color { r: bytes[0], g: bytes[1], b: bytes[2], a: bytes[3] };
    }

    pub fn to_bytes(self) -> [u8; 4] {
        return [self.r, self.g, self.b, self.a];
    }

    /// Scales rgb channels by a light intensity, saturating at 0 and 255. Alpha is kept.
    pub fn apply_light_intensity(self, intensity: f32) -> Color {
        fn scale(channel: u8, intensity: f32) -> u8 {
            return (channel as f32 * intensity).clamp(0.0, 255.0) as u8;
        }
        return Color {
            r: scale(self.r, intensity),
            g: scale(self.g, intensity),
            b: scale(self.b, intensity),
            a: self.a,
        };
    }
}
