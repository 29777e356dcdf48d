//! Per-frame pipeline: transform setup, face loop with culling, and the bounding box scan that
//! feeds covered pixels through the depth test and the fragment step.

pub mod buffer;
pub mod triangle;

use crate::camera::Camera;
use crate::color::{Color, BLACK};
use crate::mesh::Mesh;
use crate::shader::{project, Fragment, Shader, ShaderError, ShaderKind, Uniforms};
use crate::util::{self, normalized, Matrix4f, Vector2f, Vector2i, Vector3f};

use buffer::FrameBuffer;

/// Depth range of the viewport transform.
pub const DEPTH: f32 = 255.0;

/// Counters of a single `draw` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub faces: usize,
    pub culled: usize,      // Facing away from the light.
    pub degenerate: usize,  // Vertex with w == 0 or zero area on screen.
    pub fragments: usize,   // Pixels that passed the depth test.
}

pub struct Rasterizer {
    buffer: FrameBuffer,
    camera: Camera,
    light_direction: Vector3f,
    viewport: Matrix4f,
    view: Matrix4f,
    projection: Matrix4f,
}

impl Rasterizer {
    /// The viewport keeps a margin of one eighth of the buffer on every side.
    pub fn new(width: u32, height: u32) -> Rasterizer {
        let (w, h) = (width as f32, height as f32);
        return Rasterizer {
            buffer: FrameBuffer::new(width, height, BLACK),
            camera: Camera::default(),
            light_direction: Vector3f::z(),
            viewport: util::viewport(w / 8.0, h / 8.0, w * 3.0 / 4.0, h * 3.0 / 4.0, DEPTH),
            view: Matrix4f::identity(),
            projection: Matrix4f::identity(),
        };
    }

    pub fn with_background(mut self, background: Color) -> Rasterizer {
        self.buffer.set_background(background);
        self.buffer.clear();
        return self;
    }

    pub fn width(&self) -> u32 {
        return self.buffer.width();
    }

    pub fn height(&self) -> u32 {
        return self.buffer.height();
    }

    pub fn camera(&self) -> &Camera {
        return &self.camera;
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        return &mut self.camera;
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn light_direction(&self) -> &Vector3f {
        return &self.light_direction;
    }

    /// Panics on a zero vector.
    pub fn set_light_direction(&mut self, direction: Vector3f) {
        self.light_direction = normalized(&direction);
    }

    pub fn buffer(&self) -> &FrameBuffer {
        return &self.buffer;
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Recomputes view and projection from the camera and composes the full transform with the
    /// model matrix of `mesh`.
    pub fn setup_transforms(&mut self, mesh: &Mesh) -> Uniforms {
        self.view = self.camera.look_at();
        self.projection = util::projection(self.camera.distance());
        let model = *mesh.model_matrix();
        return Uniforms {
            transform: self.viewport * self.projection * self.view * model,
            projection: self.projection,
            view: self.view,
            model,
            light_direction: self.light_direction,
        };
    }

    /// Draws every face of `mesh` with the `kind` shader on top of the current buffer contents.
    /// Does not clear, call `clear` between frames.
    pub fn draw(&mut self, mesh: &Mesh, kind: ShaderKind) -> Result<FrameStats, ShaderError> {
        let uniforms = self.setup_transforms(mesh);
        let mut shader = Shader::new(kind, mesh, &uniforms)?;
        let mut stats = FrameStats::default();

        'faces: for face in 0..mesh.face_count() {
            stats.faces += 1;
            shader.begin_triangle();

            let mut screen = [Vector3f::zeros(); 3];
            for nth in 0..3 {
                match shader.vertex(mesh, face, nth) {
                    Some(position) => screen[nth] = position,
                    None => {
                        stats.degenerate += 1;
                        continue 'faces;
                    }
                }
            }

            let normal = match (screen[1] - screen[0]).cross(&(screen[2] - screen[0])).try_normalize(0.0) {
                Some(normal) => normal,
                None => {
                    stats.degenerate += 1;
                    continue;
                }
            };
            shader.geometry(mesh, face, &screen);

            // Light and view usually point the same way, so this also drops faces turned away
            // from the camera.
            if normal.dot(&self.light_direction) <= 0.0 {
                stats.culled += 1;
                continue;
            }

            stats.fragments += self.draw_triangle(&screen, mesh, &shader);
        }

        log::debug!("{} frame: {:?}", kind, stats);
        return Ok(stats);
    }

    /// Scans the bounding box of a screen triangle and returns the number of pixels that
    /// passed the depth test.
    pub fn draw_triangle(&mut self, screen: &[Vector3f; 3], mesh: &Mesh, shader: &Shader) -> usize {
        if triangle::is_degenerate(screen) {
            return 0;
        }
        let bbox = match triangle::bounding_box(screen, self.buffer.width(), self.buffer.height()) {
            Some(bbox) => bbox,
            None => return 0,
        };
        let z_values = Vector3f::new(screen[0].z, screen[1].z, screen[2].z);

        let mut accepted = 0;
        for x in bbox.min.x..=bbox.max.x {
            for y in bbox.min.y..=bbox.max.y {
                let bar = triangle::barycentric(screen, &Vector2i::new(x, y));
                if !triangle::is_inside(&bar) {
                    continue;
                }
                let depth = bar.dot(&z_values);
                if !self.buffer.test_and_set_depth(x, y, depth) {
                    continue;
                }
                let color = shader.fragment(mesh, &Fragment { x, y, depth }, &bar);
                self.buffer.set_pixel(x, y, color);
                accepted += 1;
            }
        }
        return accepted;
    }

    /// Outlines every face of `mesh` with the current transform. The depth buffer is neither
    /// tested nor written.
    pub fn draw_wireframe(&mut self, mesh: &Mesh, color: Color) {
        let transform = self.setup_transforms(mesh).transform;
        for face in 0..mesh.face_count() {
            let mut corners = [Vector2f::zeros(); 3];
            let mut projected = true;
            for nth in 0..3 {
                match project(&transform, &mesh.position(face, nth)) {
                    Some(p) => corners[nth] = Vector2f::new(p.x, p.y),
                    None => projected = false,
                }
            }
            if !projected {
                continue;
            }
            for nth in 0..3 {
                self.buffer.draw_line(&corners[nth], &corners[(nth + 1) % 3], color);
            }
        }
    }

    /// Color at (x, y), origin at the bottom left.
    pub fn pixel(&self, x: i32, y: i32) -> Color {
        return self.buffer.pixel(x, y);
    }

    pub fn depth(&self, x: i32, y: i32) -> f32 {
        return self.buffer.depth_at(x, y);
    }

    /// Frame as rgba8, top row first, ready for presentation.
    pub fn as_render_data(&self) -> &[u8] {
        return self.buffer.as_render_data();
    }
}
