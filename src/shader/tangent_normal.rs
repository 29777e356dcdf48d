use super::{project, Fragment, Stage, Uniforms, Varying};
use crate::color::Color;
use crate::mesh::Mesh;
use crate::util::{Matrix4f, Vector2f, Vector3f};

/// Shows the tangent-space normal map itself, texels written out as colors. Ignores the light.
pub struct TangentNormalShader {
    transform: Matrix4f,
    uvs: Varying<Vector2f>,
}

impl TangentNormalShader {
    pub fn new(uniforms: &Uniforms) -> Self {
        return Self {
            transform: uniforms.transform,
            uvs: Varying::default(),
        };
    }
}

impl Stage for TangentNormalShader {
    fn begin_triangle(&mut self) {
        self.uvs.reset();
    }

    fn vertex(&mut self, mesh: &Mesh, face: usize, nth: usize) -> Option<Vector3f> {
        let uv = mesh.uv(face, nth);
        self.uvs.set(nth, Vector2f::new(uv.x, uv.y));
        return project(&self.transform, &mesh.position(face, nth));
    }

    fn fragment(&self, mesh: &Mesh, _fragment: &Fragment, bar: &Vector3f) -> Color {
        return mesh.normal_map_color(&self.uvs.interpolate(bar));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::tests::{identity_uniforms, lit_triangle};
    use crate::texture::{Texture, TextureKind};

    #[test]
    fn fragment_is_the_normal_map_texel() {
        let mut mesh = lit_triangle();
        mesh.set_texture(TextureKind::NormalMap, Texture::new(1, 1, 4, vec![90, 200, 240, 255]));
        let mut shader = TangentNormalShader::new(&identity_uniforms());
        shader.begin_triangle();
        for nth in 0..3 {
            shader.vertex(&mesh, 0, nth);
        }
        let fragment = Fragment { x: 0, y: 0, depth: 0.0 };
        let color = shader.fragment(&mesh, &fragment, &Vector3f::new(0.3, 0.3, 0.4));
        assert_eq!(color, Color::new(90, 200, 240, 255));
    }
}
