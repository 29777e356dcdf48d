use std::fmt;
use std::path::Path;

use image::{DynamicImage, ImageResult};

use crate::color::Color;
use crate::util::{Vector2f, Vector3f};

/// Which slot of a mesh a texture fills. Decides the pixel layout the image is converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    NormalMap,
    Specular,
}

impl TextureKind {
    /// Diffuse and normal maps are kept as rgba8, specular maps as a single luma8 channel.
    pub fn bytes_per_pixel(self) -> usize {
        return match self {
            TextureKind::Diffuse | TextureKind::NormalMap => 4,
            TextureKind::Specular => 1,
        };
    }
}

impl fmt::Display for TextureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextureKind::Diffuse => "diffuse",
            TextureKind::NormalMap => "normal map",
            TextureKind::Specular => "specular",
        };
        return f.write_str(name);
    }
}

/// Decoded texture. Row 0 of `data` is the bottom row of the source image, so uv (0, 0)
/// lands on the bottom left texel.
#[derive(Debug, Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
    pitch: usize,  // Row stride in bytes.
    data: Vec<u8>,
}

impl Texture {
    /// Wraps raw bytes, already laid out bottom row first.
    pub fn new(width: u32, height: u32, bytes_per_pixel: usize, data: Vec<u8>) -> Texture {
        assert!(width > 0 && height > 0, "texture must not be empty");
        assert!(bytes_per_pixel > 0, "texture needs at least one byte per pixel");
        let pitch = width as usize * bytes_per_pixel;
        assert_eq!(
            data.len(),
            pitch * height as usize,
            "texture data does not match {}x{}x{}",
            width, height, bytes_per_pixel
        );
        return Texture { width, height, bytes_per_pixel, pitch, data };
    }

    /// Converts a decoded image into the layout required by `kind`, flipping it vertically.
    pub fn from_image(kind: TextureKind, image: DynamicImage) -> Texture {
        let flipped = image.flipv();
        let (width, height) = (flipped.width(), flipped.height());
        let data = match kind {
            TextureKind::Diffuse | TextureKind::NormalMap => flipped.to_rgba8().into_raw(),
            TextureKind::Specular => flipped.to_luma8().into_raw(),
        };
        return Texture::new(width, height, kind.bytes_per_pixel(), data);
    }

    pub fn load<P: AsRef<Path>>(kind: TextureKind, path: P) -> ImageResult<Texture> {
        let image = image::open(path)?;
        return Ok(Texture::from_image(kind, image));
    }

    pub fn width(&self) -> u32 {
        return self.width;
    }

    pub fn height(&self) -> u32 {
        return self.height;
    }

    pub fn pitch(&self) -> usize {
        return self.pitch;
    }

    pub fn bytes_per_pixel(&self) -> usize {
        return self.bytes_per_pixel;
    }

    /// Nearest texel lookup, no filtering. The pixel index is truncated and clamped into
    /// the texture, so uv outside of [0, 1] reads the border texels.
    pub fn texel(&self, uv: &Vector2f) -> &[u8] {
        fn to_texel_coord(t: f32, size: u32) -> usize {
            // Saturating cast, NaN goes to 0.
            let coord = (t * size as f32) as i64;
            return coord.clamp(0, size as i64 - 1) as usize;
        }
        let ux = to_texel_coord(uv.x, self.width);
        let uy = to_texel_coord(uv.y, self.height);
        let index = ux * self.bytes_per_pixel + uy * self.pitch;
        return &self.data[index..index + self.bytes_per_pixel];
    }

    /// Texel as a color. Single channel textures read as gray.
    pub fn color(&self, uv: &Vector2f) -> Color {
        let texel = self.texel(uv);
        return match texel.len() {
            1 => Color::new(texel[0], texel[0], texel[0], 255),
            3 => Color::new(texel[0], texel[1], texel[2], 255),
            _ => Color::from_rgba_slice(texel),
        };
    }

    /// Texel decoded as a tangent-space normal, each channel mapped from [0, 255] to [-1, 1].
    pub fn normal(&self, uv: &Vector2f) -> Vector3f {
        let texel = self.texel(uv);
        assert!(texel.len() >= 3, "normal map needs at least 3 channels");
        let decode = |b: u8| (b as f32 / 255.0) * 2.0 - 1.0;
        return Vector3f::new(decode(texel[0]), decode(texel[1]), decode(texel[2]));
    }

    /// First channel of a texel as a plain number.
    pub fn scalar(&self, uv: &Vector2f) -> f32 {
        return self.texel(uv)[0] as f32;
    }
}
