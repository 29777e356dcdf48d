mod parse;

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::color::Color;
use crate::texture::{Texture, TextureKind};
use crate::util::{self, Matrix4f, Vector2f, Vector3f};

/// Indices of one face corner into the position, uv and normal lists (0-based).
/// uv and normal are None when the source record left them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceVertex {
    pub position: usize,
    pub uv: Option<usize>,
    pub normal: Option<usize>,
}

pub type Face = [FaceVertex; 3];

/// Per-corner attribute a shader can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceAttribute {
    Position,
    Uv,
    Normal,
}

impl fmt::Display for FaceAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FaceAttribute::Position => "position",
            FaceAttribute::Uv => "uv",
            FaceAttribute::Normal => "normal",
        };
        return f.write_str(name);
    }
}

/// A line of geometry text that was ignored because it could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    pub reason: String,
}

#[derive(Debug)]
pub enum MeshError {
    Io(io::Error),
    Image { kind: TextureKind, source: image::ImageError },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            MeshError::Io(err) => write!(f, "failed to read geometry: {}", err),
            MeshError::Image { kind, source } => write!(f, "failed to decode {} texture: {}", kind, source),
        };
    }
}

impl std::error::Error for MeshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        return match self {
            MeshError::Io(err) => Some(err),
            MeshError::Image { source, .. } => Some(source),
        };
    }
}

impl From<io::Error> for MeshError {
    fn from(err: io::Error) -> Self {
        return MeshError::Io(err);
    }
}

/// A face references an attribute that is not there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    Missing { face: usize, attribute: FaceAttribute },
    OutOfRange { face: usize, attribute: FaceAttribute, index: usize, len: usize },
}

impl fmt::Display for AttributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            AttributeError::Missing { face, attribute } => {
                write!(f, "face {} has no {} index", face, attribute)
            }
            AttributeError::OutOfRange { face, attribute, index, len } => write!(
                f,
                "face {} references {} {} but only {} are loaded",
                face, attribute, index, len
            ),
        };
    }
}

impl std::error::Error for AttributeError {}

/// Geometry, textures and model transform of a single object.
/// Geometry is fixed after loading, only the model matrix changes.
pub struct Mesh {
    vertices: Vec<Vector3f>,
    uvs: Vec<Vector3f>,      // z is always 0.
    normals: Vec<Vector3f>,
    faces: Vec<Face>,
    model: Matrix4f,
    diffuse: Option<Texture>,
    normal_map: Option<Texture>,
    specular: Option<Texture>,
    skipped_lines: Vec<SkippedLine>,
}

impl Default for Mesh {
    fn default() -> Self {
        return Mesh::new();
    }
}

impl Mesh {
    /// Empty mesh with identity model transform.
    pub fn new() -> Mesh {
        return Mesh {
            vertices: Vec::new(),
            uvs: Vec::new(),
            normals: Vec::new(),
            faces: Vec::new(),
            model: Matrix4f::identity(),
            diffuse: None,
            normal_map: None,
            specular: None,
            skipped_lines: Vec::new(),
        };
    }

    /// Loads geometry text from a file, see `from_reader`.
    pub fn load_geometry<P: AsRef<Path>>(path: P) -> Result<Mesh, MeshError> {
        let file = File::open(path.as_ref())?;
        log::info!("loading geometry from {}", path.as_ref().display());
        return Mesh::from_reader(BufReader::new(file));
    }

    /// Parses line-oriented geometry text (v, vt, vn and f records).
    /// Malformed lines are skipped and recorded, only read failures are errors.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Mesh, MeshError> {
        let mesh = parse::parse_geometry(reader)?;
        log::info!(
            "geometry: {} vertices, {} uvs, {} normals, {} faces",
            mesh.vertex_count(), mesh.uv_count(), mesh.normal_count(), mesh.face_count()
        );
        if !mesh.skipped_lines.is_empty() {
            log::warn!("skipped {} malformed geometry lines", mesh.skipped_lines.len());
        }
        return Ok(mesh);
    }

    pub fn from_text(text: &str) -> Result<Mesh, MeshError> {
        return Mesh::from_reader(text.as_bytes());
    }

    pub fn push_vertex(&mut self, v: Vector3f) {
        self.vertices.push(v);
    }

    pub fn push_uv(&mut self, u: f32, v: f32) {
        self.uvs.push(Vector3f::new(u, v, 0.0));
    }

    pub fn push_normal(&mut self, n: Vector3f) {
        self.normals.push(n);
    }

    pub fn push_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    fn push_skipped_line(&mut self, line: usize, reason: String) {
        log::warn!("geometry line {} skipped: {}", line, reason);
        self.skipped_lines.push(SkippedLine { line, reason });
    }

    pub fn skipped_lines(&self) -> &[SkippedLine] {
        return &self.skipped_lines;
    }

    pub fn vertex_count(&self) -> usize {
        return self.vertices.len();
    }

    pub fn uv_count(&self) -> usize {
        return self.uvs.len();
    }

    pub fn normal_count(&self) -> usize {
        return self.normals.len();
    }

    pub fn face_count(&self) -> usize {
        return self.faces.len();
    }

    pub fn faces(&self) -> &[Face] {
        return &self.faces;
    }

    pub fn face(&self, index: usize) -> &Face {
        assert!(index < self.faces.len(), "face {} out of range ({} faces)", index, self.faces.len());
        return &self.faces[index];
    }

    /// Position of the `nth` corner of a face, in model space.
    pub fn position(&self, face: usize, nth: usize) -> Vector3f {
        let index = self.face(face)[nth].position;
        assert!(index < self.vertices.len(), "face {} references missing vertex {}", face, index);
        return self.vertices[index];
    }

    pub fn uv(&self, face: usize, nth: usize) -> Vector3f {
        let index = match self.face(face)[nth].uv {
            Some(index) => index,
            None => panic!("face {} corner {} has no uv index", face, nth),
        };
        assert!(index < self.uvs.len(), "face {} references missing uv {}", face, index);
        return self.uvs[index];
    }

    pub fn normal(&self, face: usize, nth: usize) -> Vector3f {
        let index = match self.face(face)[nth].normal {
            Some(index) => index,
            None => panic!("face {} corner {} has no normal index", face, nth),
        };
        assert!(index < self.normals.len(), "face {} references missing normal {}", face, index);
        return self.normals[index];
    }

    /// Verifies that every face corner has a valid index for each requested attribute.
    pub fn check_attributes(&self, attributes: &[FaceAttribute]) -> Result<(), AttributeError> {
        for (face_index, face) in self.faces.iter().enumerate() {
            for corner in face {
                for &attribute in attributes {
                    let (index, len) = match attribute {
                        FaceAttribute::Position => (Some(corner.position), self.vertices.len()),
                        FaceAttribute::Uv => (corner.uv, self.uvs.len()),
                        FaceAttribute::Normal => (corner.normal, self.normals.len()),
                    };
                    match index {
                        None => return Err(AttributeError::Missing { face: face_index, attribute }),
                        Some(index) if index >= len => {
                            return Err(AttributeError::OutOfRange { face: face_index, attribute, index, len })
                        }
                        Some(_) => (),
                    }
                }
            }
        }
        return Ok(());
    }

    pub fn model_matrix(&self) -> &Matrix4f {
        return &self.model;
    }

    /// Each transform is right-multiplied, so it applies before the ones issued earlier.
    pub fn translate(&mut self, translation: Vector3f) {
        self.model = self.model * util::translation(&translation);
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.model = self.model * util::scaling(x, y, z);
    }

    /// Rotation around x, in radians.
    pub fn rotate_pitch(&mut self, radians: f32) {
        self.model = self.model * util::rotation_x(radians);
    }

    /// Rotation around z, in radians.
    pub fn rotate_roll(&mut self, radians: f32) {
        self.model = self.model * util::rotation_z(radians);
    }

    /// Rotation around y, in radians.
    pub fn rotate_yaw(&mut self, radians: f32) {
        self.model = self.model * util::rotation_y(radians);
    }

    pub fn load_texture<P: AsRef<Path>>(&mut self, kind: TextureKind, path: P) -> Result<(), MeshError> {
        let texture = Texture::load(kind, path.as_ref()).map_err(|source| MeshError::Image { kind, source })?;
        log::info!(
            "loaded {} texture {} ({}x{})",
            kind, path.as_ref().display(), texture.width(), texture.height()
        );
        self.set_texture(kind, texture);
        return Ok(());
    }

    pub fn set_texture(&mut self, kind: TextureKind, texture: Texture) {
        assert_eq!(
            texture.bytes_per_pixel(),
            kind.bytes_per_pixel(),
            "{} texture has the wrong pixel layout",
            kind
        );
        match kind {
            TextureKind::Diffuse => self.diffuse = Some(texture),
            TextureKind::NormalMap => self.normal_map = Some(texture),
            TextureKind::Specular => self.specular = Some(texture),
        }
    }

    pub fn texture(&self, kind: TextureKind) -> Option<&Texture> {
        return match kind {
            TextureKind::Diffuse => self.diffuse.as_ref(),
            TextureKind::NormalMap => self.normal_map.as_ref(),
            TextureKind::Specular => self.specular.as_ref(),
        };
    }

    pub fn has_texture(&self, kind: TextureKind) -> bool {
        return self.texture(kind).is_some();
    }

    fn loaded_texture(&self, kind: TextureKind) -> &Texture {
        return match self.texture(kind) {
            Some(texture) => texture,
            None => panic!("{} texture sampled before it was loaded", kind),
        };
    }

    pub fn diffuse_color(&self, uv: &Vector2f) -> Color {
        return self.loaded_texture(TextureKind::Diffuse).color(uv);
    }

    pub fn normal_from_map(&self, uv: &Vector2f) -> Vector3f {
        return self.loaded_texture(TextureKind::NormalMap).normal(uv);
    }

    /// Normal map texel read as a plain color, for displaying the map.
    pub fn normal_map_color(&self, uv: &Vector2f) -> Color {
        return self.loaded_texture(TextureKind::NormalMap).color(uv);
    }

    /// Specular exponent stored in the specular map.
    pub fn specular_intensity(&self, uv: &Vector2f) -> f32 {
        return self.loaded_texture(TextureKind::Specular).scalar(uv);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{from_hom_point, to_hom_point};

    const TRIANGLE: &str = "v -1 -1 0\nv 1 -1 0\nv 0 1 0\nf 1/1/1 2/2/2 3/3/3\n";

    #[test]
    fn loads_single_triangle() {
        let mesh = Mesh::from_text(TRIANGLE).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.uv_count(), 0);
        assert_eq!(mesh.normal_count(), 0);
        for (nth, corner) in mesh.face(0).iter().enumerate() {
            assert_eq!(*corner, FaceVertex { position: nth, uv: Some(nth), normal: Some(nth) });
        }
        assert_eq!(mesh.position(0, 2), Vector3f::new(0.0, 1.0, 0.0));
        assert!(mesh.skipped_lines().is_empty());
    }

    #[test]
    fn check_attributes_reports_dangling_indices() {
        let mesh = Mesh::from_text(TRIANGLE).unwrap();
        assert_eq!(mesh.check_attributes(&[FaceAttribute::Position]), Ok(()));
        assert_eq!(
            mesh.check_attributes(&[FaceAttribute::Uv]),
            Err(AttributeError::OutOfRange { face: 0, attribute: FaceAttribute::Uv, index: 0, len: 0 })
        );
        let mesh = Mesh::from_text("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(
            mesh.check_attributes(&[FaceAttribute::Normal]),
            Err(AttributeError::Missing { face: 0, attribute: FaceAttribute::Normal })
        );
    }

    #[test]
    #[should_panic(expected = "missing uv")]
    fn uv_access_out_of_range_panics() {
        let mesh = Mesh::from_text(TRIANGLE).unwrap();
        mesh.uv(0, 0);
    }

    #[test]
    #[should_panic(expected = "sampled before it was loaded")]
    fn sampling_missing_texture_panics() {
        Mesh::new().diffuse_color(&Vector2f::new(0.5, 0.5));
    }

    #[test]
    fn transforms_compose_in_call_order() {
        let mut mesh = Mesh::new();
        mesh.translate(Vector3f::new(1.0, 0.0, 0.0));
        mesh.scale(2.0, 2.0, 2.0);
        // model = T * S, so the point is scaled first and then moved.
        let p = from_hom_point(&(mesh.model_matrix() * to_hom_point(&Vector3f::new(1.0, 1.0, 1.0)))).unwrap();
        assert_eq!(p, Vector3f::new(3.0, 2.0, 2.0));
    }

    #[test]
    fn textures_are_owned_per_kind() {
        let mut mesh = Mesh::new();
        assert!(!mesh.has_texture(TextureKind::Diffuse));
        mesh.set_texture(TextureKind::Diffuse, Texture::new(1, 1, 4, vec![1, 2, 3, 4]));
        mesh.set_texture(TextureKind::Specular, Texture::new(1, 1, 1, vec![42]));
        assert_eq!(mesh.diffuse_color(&Vector2f::new(0.3, 0.3)), Color::new(1, 2, 3, 4));
        assert_eq!(mesh.specular_intensity(&Vector2f::new(0.3, 0.3)), 42.0);
        assert!(!mesh.has_texture(TextureKind::NormalMap));
    }
}
