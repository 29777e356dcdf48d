use super::tangent::TangentSpace;
use super::{Fragment, ShaderError, ShaderKind, Stage, Uniforms};
use crate::color::Color;
use crate::mesh::Mesh;
use crate::util::{normalized, Vector3f};

/// Weight of the specular term against the diffuse one.
const SPECULAR_WEIGHT: f32 = 0.08;

/// Normal mapped diffuse plus a specular highlight whose exponent comes from the specular map.
pub struct PhongShader {
    space: TangentSpace,
}

impl PhongShader {
    pub fn new(uniforms: &Uniforms) -> Result<Self, ShaderError> {
        return Ok(Self { space: TangentSpace::new(ShaderKind::Phong, uniforms)? });
    }
}

impl Stage for PhongShader {
    fn begin_triangle(&mut self) {
        self.space.reset();
    }

    fn vertex(&mut self, mesh: &Mesh, face: usize, nth: usize) -> Option<Vector3f> {
        return self.space.vertex(mesh, face, nth);
    }

    fn fragment(&self, mesh: &Mesh, _fragment: &Fragment, bar: &Vector3f) -> Color {
        let uv = self.space.uv(bar);
        let normal = self.space.normal(mesh, bar);
        let light = self.space.light_direction();

        let diffuse = normal.dot(light);
        // Unit length whenever both inputs are.
        let reflected = normalized(&(normal * (2.0 * diffuse) - light));
        let specular = reflected.z.max(0.0).powf(mesh.specular_intensity(&uv));

        return mesh
            .diffuse_color(&uv)
            .apply_light_intensity((diffuse + SPECULAR_WEIGHT * specular).max(0.0));
    }
}
