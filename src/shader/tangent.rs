use super::{project, ShaderError, ShaderKind, Uniforms, Varying};
use crate::mesh::Mesh;
use crate::util::{
    from_hom_point, from_hom_vector, invert, invert_transpose, normalized, to_hom_point, to_hom_vector, Matrix3f,
    Matrix4f, Vector2f, Vector3f,
};

/// Per-triangle state of the Phong variant. Builds a per-fragment (tangent, bitangent,
/// normal) basis from the uv to position Jacobian and brings normal map samples out of it.
pub(super) struct TangentSpace {
    transform: Matrix4f,
    mwp: Matrix4f,            // projection * view * model
    normal_matrix: Matrix4f,  // Inverse-transpose of mwp.
    light_direction: Vector3f, // Light in the same space as the transformed normals.
    uvs: Varying<Vector2f>,
    normals: Varying<Vector3f>,
    ndc: Varying<Vector3f>,
}

impl TangentSpace {
    pub(super) fn new(kind: ShaderKind, uniforms: &Uniforms) -> Result<Self, ShaderError> {
        let mwp = uniforms.projection * uniforms.view * uniforms.model;
        let normal_matrix = invert_transpose(&mwp)
            .ok_or(ShaderError::SingularTransform { shader: kind, matrix: "projection * view * model" })?;
        let light_direction = normalized(&from_hom_vector(&(mwp * to_hom_vector(&uniforms.light_direction))));
        return Ok(Self {
            transform: uniforms.transform,
            mwp,
            normal_matrix,
            light_direction,
            uvs: Varying::default(),
            normals: Varying::default(),
            ndc: Varying::default(),
        });
    }

    pub(super) fn light_direction(&self) -> &Vector3f {
        return &self.light_direction;
    }

    pub(super) fn reset(&mut self) {
        self.uvs.reset();
        self.normals.reset();
        self.ndc.reset();
    }

    pub(super) fn vertex(&mut self, mesh: &Mesh, face: usize, nth: usize) -> Option<Vector3f> {
        let uv = mesh.uv(face, nth);
        self.uvs.set(nth, Vector2f::new(uv.x, uv.y));
        let normal = from_hom_vector(&(self.normal_matrix * to_hom_vector(&mesh.normal(face, nth))));
        self.normals.set(nth, normal);

        let position = mesh.position(face, nth);
        self.ndc.set(nth, from_hom_point(&(self.mwp * to_hom_point(&position)))?);
        return project(&self.transform, &position);
    }

    pub(super) fn uv(&self, bar: &Vector3f) -> Vector2f {
        return self.uvs.interpolate(bar);
    }

    /// Unit normal at the fragment with the normal map applied. Falls back to the
    /// interpolated normal when the triangle has no usable tangent basis.
    pub(super) fn normal(&self, mesh: &Mesh, bar: &Vector3f) -> Vector3f {
        let uv = self.uv(bar);
        let n = match self.normals.interpolate(bar).try_normalize(0.0) {
            Some(n) => n,
            None => return mesh.normal_from_map(&uv).try_normalize(0.0).unwrap_or_else(Vector3f::z),
        };

        let a = Matrix3f::from_rows(&[
            (self.ndc.get(1) - self.ndc.get(0)).transpose(),
            (self.ndc.get(2) - self.ndc.get(0)).transpose(),
            n.transpose(),
        ]);
        let ai = match invert(&a) {
            Some(ai) => ai,
            None => return n,
        };

        let (uv0, uv1, uv2) = (self.uvs.get(0), self.uvs.get(1), self.uvs.get(2));
        let i = ai * Vector3f::new(uv1.x - uv0.x, uv2.x - uv0.x, 0.0);
        let j = ai * Vector3f::new(uv1.y - uv0.y, uv2.y - uv0.y, 0.0);
        let (i, j) = match (i.try_normalize(0.0), j.try_normalize(0.0)) {
            (Some(i), Some(j)) => (i, j),
            _ => return n,
        };

        let basis = Matrix3f::from_columns(&[i, j, n]);
        return (basis * mesh.normal_from_map(&uv)).try_normalize(0.0).unwrap_or(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::tests::{identity_uniforms, lit_triangle};
    use crate::texture::{Texture, TextureKind};

    fn approx_eq(a: f32, b: f32) -> bool {
        return (a - b).abs() < 1e-2;
    }

    fn space_for(mesh: &Mesh) -> TangentSpace {
        let mut space = TangentSpace::new(ShaderKind::Phong, &identity_uniforms()).unwrap();
        space.reset();
        for nth in 0..3 {
            space.vertex(mesh, 0, nth).unwrap();
        }
        return space;
    }

    #[test]
    fn flat_map_keeps_the_surface_normal() {
        let mut mesh = lit_triangle();
        // (128, 128, 255) decodes to roughly (0, 0, 1) in tangent space.
        mesh.set_texture(TextureKind::NormalMap, Texture::new(1, 1, 4, vec![128, 128, 255, 255]));
        let normal = space_for(&mesh).normal(&mesh, &Vector3f::new(0.3, 0.3, 0.4));
        assert!(approx_eq(normal.x, 0.0) && approx_eq(normal.y, 0.0) && approx_eq(normal.z, 1.0));
    }

    #[test]
    fn map_tilt_follows_the_uv_direction() {
        let mut mesh = lit_triangle();
        // Tilted toward +u, which runs along +x on this triangle.
        mesh.set_texture(TextureKind::NormalMap, Texture::new(1, 1, 4, vec![255, 128, 128, 255]));
        let normal = space_for(&mesh).normal(&mesh, &Vector3f::new(0.3, 0.3, 0.4));
        assert!(approx_eq(normal.x, 1.0) && approx_eq(normal.z, 0.0));
    }

    #[test]
    fn singular_transform_is_reported() {
        let mut uniforms = identity_uniforms();
        uniforms.view = crate::util::scaling(0.0, 1.0, 1.0);
        assert!(matches!(
            TangentSpace::new(ShaderKind::Phong, &uniforms),
            Err(ShaderError::SingularTransform { shader: ShaderKind::Phong, .. })
        ));
    }
}
