use super::gouraud::GouraudShader;
use super::{Fragment, ShaderError, ShaderKind, Stage, Uniforms};
use crate::color::Color;
use crate::mesh::Mesh;
use crate::util::Vector3f;

/// Gouraud shading with the blended intensity snapped to a few bands.
pub struct ClampIlluminationShader {
    gouraud: GouraudShader,
}

impl ClampIlluminationShader {
    pub fn new(uniforms: &Uniforms) -> Result<Self, ShaderError> {
        let gouraud = GouraudShader::with_kind(ShaderKind::ClampIllumination, uniforms)?;
        return Ok(Self { gouraud });
    }
}

/// Steps of the banded lighting, upper bounds are exclusive.
fn band(intensity: f32) -> f32 {
    if intensity > 0.8 {
        return 0.8;
    } else if intensity > 0.6 {
        return 0.6;
    } else if intensity > 0.2 {
        return 0.2;
    }
    return 0.0;
}

impl Stage for ClampIlluminationShader {
    fn begin_triangle(&mut self) {
        self.gouraud.begin_triangle();
    }

    fn vertex(&mut self, mesh: &Mesh, face: usize, nth: usize) -> Option<Vector3f> {
        return self.gouraud.vertex(mesh, face, nth);
    }

    fn fragment(&self, mesh: &Mesh, _fragment: &Fragment, bar: &Vector3f) -> Color {
        let (color, intensity) = self.gouraud.sample(mesh, bar);
        return color.apply_light_intensity(band(intensity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensities_snap_down_to_bands() {
        assert_eq!(band(1.0), 0.8);
        assert_eq!(band(0.8), 0.6);
        assert_eq!(band(0.61), 0.6);
        assert_eq!(band(0.6), 0.2);
        assert_eq!(band(0.2), 0.0);
        assert_eq!(band(-0.5), 0.0);
    }
}
