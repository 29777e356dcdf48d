//! CPU-only triangle rasterizer.
//!
//! A `Mesh` (geometry text plus optional diffuse, normal and specular textures) is pushed through
//! `Rasterizer::draw` with one of the `ShaderKind` variants. The result is an rgba8 frame ready for
//! presentation, with a depth buffer that keeps the closest surface per pixel.

pub mod camera;
pub mod color;
pub mod logging;
pub mod mesh;
pub mod rasterizer;
pub mod shader;
pub mod texture;
pub mod util;

pub use camera::Camera;
pub use color::Color;
pub use mesh::{Mesh, MeshError};
pub use rasterizer::{FrameStats, Rasterizer};
pub use shader::{ShaderError, ShaderKind};
pub use texture::{Texture, TextureKind};
