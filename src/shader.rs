//! Shading stage of the pipeline.
//!
//! Every variant runs in three steps: `vertex` once per triangle corner (returns the screen
//! position and caches varyings), `geometry` once per triangle (face level attributes) and
//! `fragment` once per covered pixel (blends the cached varyings into a color).
//! Variants form a closed set, picked by `ShaderKind` at draw time.

mod clamp_illumination;
mod face_illumination;
mod gouraud;
mod phong;
mod tangent;
mod tangent_normal;
mod zbuffer;

use std::fmt;
use std::ops::{Add, Mul};
use std::str::FromStr;

use crate::color::Color;
use crate::mesh::{AttributeError, FaceAttribute, Mesh};
use crate::texture::TextureKind;
use crate::util::{from_hom_point, to_hom_point, Matrix4f, Vector3f};

pub use clamp_illumination::ClampIlluminationShader;
pub use face_illumination::FaceIlluminationShader;
pub use gouraud::GouraudShader;
pub use phong::PhongShader;
pub use tangent_normal::TangentNormalShader;
pub use zbuffer::ZBufferShader;

/// Selector for the shader variant used by a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    FaceIllumination,
    Gouraud,
    ClampIllumination,
    ZBuffer,
    Phong,
    TangentNormal,
}

impl ShaderKind {
    pub const ALL: [ShaderKind; 6] = [
        ShaderKind::FaceIllumination,
        ShaderKind::Gouraud,
        ShaderKind::ClampIllumination,
        ShaderKind::ZBuffer,
        ShaderKind::Phong,
        ShaderKind::TangentNormal,
    ];

    pub fn name(self) -> &'static str {
        return match self {
            ShaderKind::FaceIllumination => "flat",
            ShaderKind::Gouraud => "gouraud",
            ShaderKind::ClampIllumination => "clamp",
            ShaderKind::ZBuffer => "zbuffer",
            ShaderKind::Phong => "phong",
            ShaderKind::TangentNormal => "tangent",
        };
    }

    /// Textures that have to be loaded before this variant can run.
    pub fn required_textures(self) -> &'static [TextureKind] {
        return match self {
            ShaderKind::FaceIllumination | ShaderKind::Gouraud | ShaderKind::ClampIllumination => {
                &[TextureKind::Diffuse]
            }
            ShaderKind::ZBuffer => &[],
            ShaderKind::Phong => &[TextureKind::Diffuse, TextureKind::NormalMap, TextureKind::Specular],
            ShaderKind::TangentNormal => &[TextureKind::NormalMap],
        };
    }

    /// Face corner attributes read by this variant, besides positions.
    pub fn required_attributes(self) -> &'static [FaceAttribute] {
        return match self {
            ShaderKind::FaceIllumination | ShaderKind::TangentNormal => &[FaceAttribute::Position, FaceAttribute::Uv],
            ShaderKind::ZBuffer => &[FaceAttribute::Position],
            ShaderKind::Gouraud | ShaderKind::ClampIllumination | ShaderKind::Phong => &[FaceAttribute::Position, FaceAttribute::Uv, FaceAttribute::Normal],
        };
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(self.name());
    }
}

impl FromStr for ShaderKind {
    type Err = ShaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return ShaderKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ShaderError::UnknownShader(s.to_string()));
    }
}

/// Reasons a shader cannot be activated for a mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    UnknownShader(String),
    MissingTexture { shader: ShaderKind, texture: TextureKind },
    Attribute { shader: ShaderKind, source: AttributeError },
    SingularTransform { shader: ShaderKind, matrix: &'static str },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            ShaderError::UnknownShader(name) => write!(f, "unknown shader '{}'", name),
            ShaderError::MissingTexture { shader, texture } => {
                write!(f, "{} shader needs a {} texture, none is loaded", shader, texture)
            }
            ShaderError::Attribute { shader, source } => write!(f, "{} shader: {}", shader, source),
            ShaderError::SingularTransform { shader, matrix } => {
                write!(f, "{} shader: {} matrix is not invertible", shader, matrix)
            }
        };
    }
}

impl std::error::Error for ShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        return match self {
            ShaderError::Attribute { source, .. } => Some(source),
            _ => None,
        };
    }
}

/// Per-draw constants, computed by the rasterizer before the face loop.
#[derive(Debug, Clone, Copy)]
pub struct Uniforms {
    pub transform: Matrix4f,  // viewport * projection * view * model
    pub projection: Matrix4f,
    pub view: Matrix4f,
    pub model: Matrix4f,
    pub light_direction: Vector3f,
}

/// Covered pixel handed to the fragment step, coordinates with (0, 0) at the bottom left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub x: i32,
    pub y: i32,
    pub depth: f32,  // Depth buffer value at the pixel after the test.
}

/// Per-vertex value cached for the triangle being drawn, one slot per corner.
/// Slots are cleared by `reset` and all three have to be written before blending.
#[derive(Debug, Clone, Copy, Default)]
pub struct Varying<T> {
    values: [T; 3],
    written: [bool; 3],
}

impl<T> Varying<T>
where
    T: Copy + Default + Add<Output = T> + Mul<f32, Output = T>,
{
    pub fn reset(&mut self) {
        self.values = [T::default(); 3];
        self.written = [false; 3];
    }

    pub fn set(&mut self, nth: usize, value: T) {
        self.values[nth] = value;
        self.written[nth] = true;
    }

    pub fn get(&self, nth: usize) -> T {
        debug_assert!(self.written[nth], "varying slot {} read before it was written", nth);
        return self.values[nth];
    }

    pub fn is_complete(&self) -> bool {
        return self.written.iter().all(|&w| w);
    }

    /// Barycentric blend of the three slots.
    pub fn interpolate(&self, bar: &Vector3f) -> T {
        debug_assert!(self.is_complete(), "varying interpolated before all corners were written");
        return self.values[0] * bar.x + self.values[1] * bar.y + self.values[2] * bar.z;
    }
}

/// Common interface of the variants, dispatched through `Shader`.
trait Stage {
    /// Forgets everything cached for the previous triangle.
    fn begin_triangle(&mut self);

    /// Screen position of the `nth` corner of `face`. None if the corner ends up with w == 0.
    fn vertex(&mut self, mesh: &Mesh, face: usize, nth: usize) -> Option<Vector3f>;

    fn geometry(&mut self, _mesh: &Mesh, _face: usize, _screen: &[Vector3f; 3]) {}

    fn fragment(&self, mesh: &Mesh, fragment: &Fragment, bar: &Vector3f) -> Color;
}

/// Full transform of a model space position followed by the homogeneous divide.
pub(crate) fn project(transform: &Matrix4f, position: &Vector3f) -> Option<Vector3f> {
    return from_hom_point(&(transform * to_hom_point(position)));
}

pub enum Shader {
    FaceIllumination(FaceIlluminationShader),
    Gouraud(GouraudShader),
    ClampIllumination(ClampIlluminationShader),
    ZBuffer(ZBufferShader),
    Phong(PhongShader),
    TangentNormal(TangentNormalShader),
}

impl Shader {
    /// Builds the `kind` variant for this draw. Textures, face attributes and matrices the
    /// variant depends on are checked here, before any triangle is rasterized.
    pub fn new(kind: ShaderKind, mesh: &Mesh, uniforms: &Uniforms) -> Result<Shader, ShaderError> {
        for &texture in kind.required_textures() {
            if !mesh.has_texture(texture) {
                return Err(ShaderError::MissingTexture { shader: kind, texture });
            }
        }
        mesh.check_attributes(kind.required_attributes())
            .map_err(|source| ShaderError::Attribute { shader: kind, source })?;

        let shader = match kind {
            ShaderKind::FaceIllumination => Shader::FaceIllumination(FaceIlluminationShader::new(uniforms)),
            ShaderKind::Gouraud => Shader::Gouraud(GouraudShader::new(uniforms)?),
            ShaderKind::ClampIllumination => Shader::ClampIllumination(ClampIlluminationShader::new(uniforms)?),
            ShaderKind::ZBuffer => Shader::ZBuffer(ZBufferShader::new(uniforms)),
            ShaderKind::Phong => Shader::Phong(PhongShader::new(uniforms)?),
            ShaderKind::TangentNormal => Shader::TangentNormal(TangentNormalShader::new(uniforms)),
        };
        log::debug!("activated {} shader", kind);
        return Ok(shader);
    }

    pub fn kind(&self) -> ShaderKind {
        return match self {
            Shader::FaceIllumination(_) => ShaderKind::FaceIllumination,
            Shader::Gouraud(_) => ShaderKind::Gouraud,
            Shader::ClampIllumination(_) => ShaderKind::ClampIllumination,
            Shader::ZBuffer(_) => ShaderKind::ZBuffer,
            Shader::Phong(_) => ShaderKind::Phong,
            Shader::TangentNormal(_) => ShaderKind::TangentNormal,
        };
    }

    fn stage(&self) -> &dyn Stage {
        return match self {
            Shader::FaceIllumination(s) => s,
            Shader::Gouraud(s) => s,
            Shader::ClampIllumination(s) => s,
            Shader::ZBuffer(s) => s,
            Shader::Phong(s) => s,
            Shader::TangentNormal(s) => s,
        };
    }

    fn stage_mut(&mut self) -> &mut dyn Stage {
        return match self {
            Shader::FaceIllumination(s) => s,
            Shader::Gouraud(s) => s,
            Shader::ClampIllumination(s) => s,
            Shader::ZBuffer(s) => s,
            Shader::Phong(s) => s,
            Shader::TangentNormal(s) => s,
        };
    }

    pub fn begin_triangle(&mut self) {
        self.stage_mut().begin_triangle();
    }

    pub fn vertex(&mut self, mesh: &Mesh, face: usize, nth: usize) -> Option<Vector3f> {
        return self.stage_mut().vertex(mesh, face, nth);
    }

    pub fn geometry(&mut self, mesh: &Mesh, face: usize, screen: &[Vector3f; 3]) {
        self.stage_mut().geometry(mesh, face, screen);
    }

    pub fn fragment(&self, mesh: &Mesh, fragment: &Fragment, bar: &Vector3f) -> Color {
        return self.stage().fragment(mesh, fragment, bar);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::texture::Texture;

    /// Unit triangle in the z = 0 plane with all attributes, normals facing +z.
    pub(crate) fn lit_triangle() -> Mesh {
        let mut mesh = Mesh::from_text(
            "v -1 -1 0\nv 1 -1 0\nv 0 1 0\n\
             vt 0 0\nvt 1 0\nvt 0.5 1\n\
             vn 0 0 1\nvn 0 0 1\nvn 0 0 1\n\
             f 1/1/1 2/2/2 3/3/3\n",
        )
        .unwrap();
        mesh.set_texture(TextureKind::Diffuse, Texture::new(1, 1, 4, vec![255, 255, 255, 255]));
        return mesh;
    }

    pub(crate) fn identity_uniforms() -> Uniforms {
        return Uniforms {
            transform: Matrix4f::identity(),
            projection: Matrix4f::identity(),
            view: Matrix4f::identity(),
            model: Matrix4f::identity(),
            light_direction: Vector3f::z(),
        };
    }

    #[test]
    fn kinds_round_trip_through_names() {
        for kind in ShaderKind::ALL {
            assert_eq!(kind.name().parse::<ShaderKind>(), Ok(kind));
        }
        assert_eq!("toon".parse::<ShaderKind>(), Err(ShaderError::UnknownShader(String::from("toon"))));
    }

    #[test]
    fn activation_reports_missing_textures() {
        let mesh = lit_triangle();
        let result = Shader::new(ShaderKind::Phong, &mesh, &identity_uniforms());
        assert!(matches!(
            result,
            Err(ShaderError::MissingTexture { shader: ShaderKind::Phong, texture: TextureKind::NormalMap })
        ));
        assert!(Shader::new(ShaderKind::Gouraud, &mesh, &identity_uniforms()).is_ok());
    }

    #[test]
    fn activation_reports_missing_attributes() {
        let mesh = Mesh::from_text("v -1 -1 0\nv 1 -1 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert!(Shader::new(ShaderKind::ZBuffer, &mesh, &identity_uniforms()).is_ok());
        let mut textured = mesh;
        textured.set_texture(TextureKind::Diffuse, Texture::new(1, 1, 4, vec![0, 0, 0, 255]));
        let result = Shader::new(ShaderKind::FaceIllumination, &textured, &identity_uniforms());
        assert!(matches!(result, Err(ShaderError::Attribute { shader: ShaderKind::FaceIllumination, .. })));
    }

    #[test]
    fn activation_reports_singular_model() {
        let mesh = lit_triangle();
        let mut uniforms = identity_uniforms();
        uniforms.model = crate::util::scaling(1.0, 0.0, 1.0);
        let result = Shader::new(ShaderKind::Gouraud, &mesh, &uniforms);
        assert!(matches!(result, Err(ShaderError::SingularTransform { .. })));
    }

    #[test]
    fn varyings_are_replaced_per_triangle() {
        let mut varying = Varying::<f32>::default();
        varying.set(0, 1.0);
        varying.set(1, 2.0);
        varying.set(2, 3.0);
        assert!(varying.is_complete());
        assert_eq!(varying.interpolate(&Vector3f::new(0.5, 0.25, 0.25)), 1.75);
        varying.reset();
        assert!(!varying.is_complete());
        varying.set(0, 4.0);
        varying.set(1, 4.0);
        varying.set(2, 4.0);
        assert_eq!(varying.interpolate(&Vector3f::new(0.2, 0.3, 0.5)), 4.0);
    }

    #[test]
    fn gouraud_writes_all_corners_before_blending() {
        let mesh = lit_triangle();
        let mut shader = Shader::new(ShaderKind::Gouraud, &mesh, &identity_uniforms()).unwrap();
        shader.begin_triangle();
        for nth in 0..3 {
            assert!(shader.vertex(&mesh, 0, nth).is_some());
        }
        let fragment = Fragment { x: 0, y: 0, depth: 0.0 };
        let color = shader.fragment(&mesh, &fragment, &Vector3f::new(0.5, 0.25, 0.25));
        assert_eq!(color, crate::color::WHITE);
    }

    #[test]
    fn vertex_with_zero_w_is_degenerate() {
        let mesh = lit_triangle();
        let mut uniforms = identity_uniforms();
        uniforms.transform[(3, 3)] = 0.0;
        let mut shader = Shader::new(ShaderKind::ZBuffer, &mesh, &uniforms).unwrap();
        shader.begin_triangle();
        assert_eq!(shader.vertex(&mesh, 0, 0), None);
    }
}
