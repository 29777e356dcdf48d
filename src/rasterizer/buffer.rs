use crate::color::Color;
use crate::util::Vector2f;

/// Color and depth storage of a frame.
/// Callers address pixels with (0, 0) at the bottom left, `render_data` is stored top row first.
pub struct FrameBuffer {
    width: u32,
    height: u32,
    background: Color,
    depth: Vec<f32>,       // Larger is closer, f32::NEG_INFINITY means nothing drawn yet.
    render_data: Vec<u8>,  // rgba8
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, background: Color) -> FrameBuffer {
        assert!(width > 0 && height > 0, "frame buffer must not be empty");
        let n_pixels = width as usize * height as usize;
        let mut buffer = FrameBuffer {
            width,
            height,
            background,
            depth: vec![f32::NEG_INFINITY; n_pixels],
            render_data: vec![0; 4 * n_pixels],
        };
        buffer.clear();
        return buffer;
    }

    pub fn width(&self) -> u32 {
        return self.width;
    }

    pub fn height(&self) -> u32 {
        return self.height;
    }

    pub fn background(&self) -> Color {
        return self.background;
    }

    /// Takes effect on the next `clear`.
    pub fn set_background(&mut self, background: Color) {
        self.background = background;
    }

    /// Fills every pixel with the background color and forgets all depths.
    pub fn clear(&mut self) {
        let background = self.background.to_bytes();
        for pixel in self.render_data.chunks_exact_mut(4) {
            pixel.copy_from_slice(&background);
        }
        self.depth.fill(f32::NEG_INFINITY);
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        return x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32;
    }

    /// Index into the depth buffer, rows counted from the bottom.
    fn depth_index(&self, x: i32, y: i32) -> usize {
        assert!(self.in_bounds(x, y), "pixel ({}, {}) outside of {}x{} buffer", x, y, self.width, self.height);
        return x as usize + y as usize * self.width as usize;
    }

    /// Byte offset of a pixel in `render_data`. Rows are flipped here and nowhere else.
    fn color_index(&self, x: i32, y: i32) -> usize {
        assert!(self.in_bounds(x, y), "pixel ({}, {}) outside of {}x{} buffer", x, y, self.width, self.height);
        let row = (self.height as i32 - 1 - y) as usize;
        return 4 * (x as usize + row * self.width as usize);
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        let index = self.color_index(x, y);
        self.render_data[index..index + 4].copy_from_slice(&color.to_bytes());
    }

    pub fn pixel(&self, x: i32, y: i32) -> Color {
        let index = self.color_index(x, y);
        return Color::from_rgba_slice(&self.render_data[index..index + 4]);
    }

    pub fn depth_at(&self, x: i32, y: i32) -> f32 {
        return self.depth[self.depth_index(x, y)];
    }

    /// Stores `z` and returns true if it is strictly closer than what the pixel holds.
    /// Ties keep the earlier value.
    pub fn test_and_set_depth(&mut self, x: i32, y: i32, z: f32) -> bool {
        let index = self.depth_index(x, y);
        if z > self.depth[index] {
            self.depth[index] = z;
            return true;
        }
        return false;
    }

    /// Pixel data as rgba8, top row first.
    pub fn as_render_data(&self) -> &[u8] {
        return &self.render_data[..];
    }

    /// Clips the segment a-b to the buffer rectangle with the Liang-Barsky algorithm.
    /// Works in f64 so endpoints far outside of the buffer neither overflow nor saturate.
    fn clip_segment(&self, a: &Vector2f, b: &Vector2f) -> Option<((f64, f64), (f64, f64))> {
        if !(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()) {
            return None;
        }
        let (x_0, y_0) = (a.x as f64, a.y as f64);
        let (dx, dy) = (b.x as f64 - x_0, b.y as f64 - y_0);
        let x_max = (self.width - 1) as f64;
        let y_max = (self.height - 1) as f64;

        let mut t_0: f64 = 0.0;
        let mut t_1: f64 = 1.0;
        for (p, q) in [(-dx, x_0), (dx, x_max - x_0), (-dy, y_0), (dy, y_max - y_0)] {
            if p == 0.0 {
                // Parallel to this edge and outside of it.
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                t_0 = t_0.max(t);
            } else {
                t_1 = t_1.min(t);
            }
            if t_0 > t_1 {
                return None;
            }
        }
        return Some(((x_0 + t_0 * dx, y_0 + t_0 * dy), (x_0 + t_1 * dx, y_0 + t_1 * dy)));
    }

    /// Draws a line between a and b with Bresenham's algorithm as presented in
    /// https://en.wikipedia.org/wiki/Bresenham%27s_line_algorithm
    /// Ignores the depth buffer. The segment is clipped to the buffer first, so only visible
    /// pixels are stepped through.
    pub fn draw_line(&mut self, a: &Vector2f, b: &Vector2f, color: Color) {
        let (start, end) = match self.clip_segment(a, b) {
            Some(segment) => segment,
            None => return,
        };
        // Clipped endpoints can land a rounding error below the boundary they were moved to.
        let to_pixel = |v: f64, max: u32| (v + 1.0e-6).floor().clamp(0.0, (max - 1) as f64) as i32;
        let (mut x_0, mut y_0) = (to_pixel(start.0, self.width), to_pixel(start.1, self.height));
        let (x_1, y_1) = (to_pixel(end.0, self.width), to_pixel(end.1, self.height));

        let dx = (x_1 - x_0).abs();
        let sx = if x_0 < x_1 { 1 } else { -1 };
        let dy = -(y_1 - y_0).abs();
        let sy = if y_0 < y_1 { 1 } else { -1 };
        let mut error = dx + dy;

        loop {
            self.set_pixel(x_0, y_0, color);
            if x_0 == x_1 && y_0 == y_1 {
                break;
            }
            let e2 = 2 * error;
            if e2 >= dy {
                error += dy;
                x_0 += sx;
            }
            if e2 <= dx {
                error += dx;
                y_0 += sy;
            }
        }
    }
}
