use super::{project, Fragment, Stage, Uniforms};
use crate::color::{Color, BLACK};
use crate::mesh::Mesh;
use crate::util::{normalized, Matrix4f, Vector2f, Vector3f};

/// Flat shading: one light intensity and one diffuse sample per triangle.
pub struct FaceIlluminationShader {
    transform: Matrix4f,
    light_direction: Vector3f,
    intensity: f32,
    color: Color,
}

impl FaceIlluminationShader {
    pub fn new(uniforms: &Uniforms) -> Self {
        return Self {
            transform: uniforms.transform,
            light_direction: uniforms.light_direction,
            intensity: 0.0,
            color: BLACK,
        };
    }
}

impl Stage for FaceIlluminationShader {
    fn begin_triangle(&mut self) {
        self.intensity = 0.0;
        self.color = BLACK;
    }

    fn vertex(&mut self, mesh: &Mesh, face: usize, nth: usize) -> Option<Vector3f> {
        return project(&self.transform, &mesh.position(face, nth));
    }

    fn geometry(&mut self, mesh: &Mesh, face: usize, screen: &[Vector3f; 3]) {
        // Zero area faces never get here, the rasterizer drops them first.
        let normal = normalized(&(screen[1] - screen[0]).cross(&(screen[2] - screen[0])));
        self.intensity = normal.dot(&self.light_direction);
        let uv = mesh.uv(face, 0);
        self.color = mesh.diffuse_color(&Vector2f::new(uv.x, uv.y));
    }

    fn fragment(&self, _mesh: &Mesh, _fragment: &Fragment, _bar: &Vector3f) -> Color {
        return self.color.apply_light_intensity(self.intensity.clamp(0.0, 1.0));
    }
}
