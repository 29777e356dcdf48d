use super::{project, Fragment, Stage, Uniforms};
use crate::color::{Color, WHITE};
use crate::mesh::Mesh;
use crate::util::{Matrix4f, Vector3f};

/// Depth mapped to full white.
pub const DEPTH_REFERENCE: f32 = 320.0;

/// Gray level proportional to the depth stored at the fragment. Ignores textures and light.
pub struct ZBufferShader {
    transform: Matrix4f,
}

impl ZBufferShader {
    pub fn new(uniforms: &Uniforms) -> Self {
        return Self { transform: uniforms.transform };
    }
}

impl Stage for ZBufferShader {
    fn begin_triangle(&mut self) {}

    fn vertex(&mut self, mesh: &Mesh, face: usize, nth: usize) -> Option<Vector3f> {
        return project(&self.transform, &mesh.position(face, nth));
    }

    fn fragment(&self, _mesh: &Mesh, fragment: &Fragment, _bar: &Vector3f) -> Color {
        return WHITE.apply_light_intensity(fragment.depth / DEPTH_REFERENCE);
    }
}
