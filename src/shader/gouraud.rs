use super::{project, Fragment, ShaderError, ShaderKind, Stage, Uniforms, Varying};
use crate::color::Color;
use crate::mesh::Mesh;
use crate::util::{from_hom_vector, invert_transpose, magnitude, normalized, to_hom_vector, Matrix4f, Vector2f, Vector3f};

/// Light intensity computed per vertex and blended over the triangle.
pub struct GouraudShader {
    transform: Matrix4f,
    normal_matrix: Matrix4f,  // Inverse-transpose of the model matrix.
    light_direction: Vector3f,
    uvs: Varying<Vector2f>,
    intensities: Varying<f32>,
}

impl GouraudShader {
    pub fn new(uniforms: &Uniforms) -> Result<Self, ShaderError> {
        return Self::with_kind(ShaderKind::Gouraud, uniforms);
    }

    pub(super) fn with_kind(kind: ShaderKind, uniforms: &Uniforms) -> Result<Self, ShaderError> {
        let normal_matrix = invert_transpose(&uniforms.model)
            .ok_or(ShaderError::SingularTransform { shader: kind, matrix: "model" })?;
        return Ok(Self {
            transform: uniforms.transform,
            normal_matrix,
            light_direction: uniforms.light_direction,
            uvs: Varying::default(),
            intensities: Varying::default(),
        });
    }

    /// Diffuse sample and blended light intensity at a fragment, before any clamping.
    pub(super) fn sample(&self, mesh: &Mesh, bar: &Vector3f) -> (Color, f32) {
        let uv = self.uvs.interpolate(bar);
        return (mesh.diffuse_color(&uv), self.intensities.interpolate(bar));
    }
}

impl Stage for GouraudShader {
    fn begin_triangle(&mut self) {
        self.uvs.reset();
        self.intensities.reset();
    }

    fn vertex(&mut self, mesh: &Mesh, face: usize, nth: usize) -> Option<Vector3f> {
        let uv = mesh.uv(face, nth);
        self.uvs.set(nth, Vector2f::new(uv.x, uv.y));

        let normal = from_hom_vector(&(self.normal_matrix * to_hom_vector(&mesh.normal(face, nth))));
        // A zero normal in the source data lights nothing.
        let intensity = if magnitude(&normal) == 0.0 {
            0.0
        } else {
            normalized(&normal).dot(&self.light_direction)
        };
        self.intensities.set(nth, intensity);

        return project(&self.transform, &mesh.position(face, nth));
    }

    fn fragment(&self, mesh: &Mesh, _fragment: &Fragment, bar: &Vector3f) -> Color {
        let (color, intensity) = self.sample(mesh, bar);
        return color.apply_light_intensity(intensity.max(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::tests::{identity_uniforms, lit_triangle};

    #[test]
    fn normals_follow_the_model_rotation() {
        let mesh = lit_triangle();
        let mut uniforms = identity_uniforms();
        // Normals tilted away from the light by 60 degrees.
        uniforms.model = crate::util::rotation_x(std::f32::consts::FRAC_PI_3);
        let mut shader = GouraudShader::new(&uniforms).unwrap();
        shader.begin_triangle();
        for nth in 0..3 {
            shader.vertex(&mesh, 0, nth);
        }
        let (_, intensity) = shader.sample(&mesh, &Vector3f::new(0.2, 0.3, 0.5));
        assert!((intensity - 0.5).abs() < 1e-5);
    }
}
