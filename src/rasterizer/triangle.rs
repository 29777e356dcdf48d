use crate::util::{Vector2i, Vector3f};

/// Pixel rectangle scanned for a triangle, both corners inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min: Vector2i,  // lower left corner
    pub max: Vector2i,  // upper right corner
}

/// Bounding box of the screen triangle clipped to a width x height buffer.
/// None when nothing of it is inside the buffer.
pub fn bounding_box(screen: &[Vector3f; 3], width: u32, height: u32) -> Option<BoundingBox> {
    let min_x = screen[0].x.min(screen[1].x).min(screen[2].x);
    let min_y = screen[0].y.min(screen[1].y).min(screen[2].y);
    let max_x = screen[0].x.max(screen[1].x).max(screen[2].x);
    let max_y = screen[0].y.max(screen[1].y).max(screen[2].y);

    // Float to int casts saturate, so far away vertices do not wrap around.
    let bbox = BoundingBox {
        min: Vector2i::new((min_x as i32).max(0), (min_y as i32).max(0)),
        max: Vector2i::new((max_x as i32).min(width as i32 - 1), (max_y as i32).min(height as i32 - 1)),
    };
    if bbox.min.x > bbox.max.x || bbox.min.y > bbox.max.y {
        return None;
    }
    return Some(bbox);
}

/// All three vertices on the same row, such a triangle covers no area worth scanning.
pub fn is_degenerate(screen: &[Vector3f; 3]) -> bool {
    return screen[0].y == screen[1].y && screen[0].y == screen[2].y;
}

/// Barycentric weights of pixel `p` relative to the screen triangle, z of the vertices is ignored.
/// Returns (-1, 1, 1) for a triangle of zero area, which is never inside.
pub fn barycentric(screen: &[Vector3f; 3], p: &Vector2i) -> Vector3f {
    let (v0, v1, v2) = (&screen[0], &screen[1], &screen[2]);
    let (px, py) = (p.x as f32, p.y as f32);
    let u = Vector3f::new(v2.x - v0.x, v1.x - v0.x, v0.x - px)
        .cross(&Vector3f::new(v2.y - v0.y, v1.y - v0.y, v0.y - py));
    if u.z == 0.0 {
        return Vector3f::new(-1.0, 1.0, 1.0);
    }
    return Vector3f::new(1.0 - (u.x + u.y) / u.z, u.y / u.z, u.x / u.z);
}

/// Edges count as inside.
pub fn is_inside(bar: &Vector3f) -> bool {
    return bar.x >= 0.0 && bar.y >= 0.0 && bar.z >= 0.0;
}
