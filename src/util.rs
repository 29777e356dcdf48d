//! Small fixed-size math kernel on top of nalgebra: type aliases, homogeneous conversions,
//! cofactor-based inversion and the elementary transforms used by the pipeline.
//!
//! All rotation helpers take their angle in radians.

use nalgebra as na;
use na::{matrix, vector, DMatrix, SMatrix, SVector};

pub type Vector2f = na::Vector2<f32>;
pub type Vector2i = na::Vector2<i32>;
pub type Vector3f = na::Vector3<f32>;
pub type Vector3i = na::Vector3<i32>;
pub type Vector4f = na::Vector4<f32>;
pub type Matrix3f = na::Matrix3<f32>;
pub type Matrix4f = na::Matrix4<f32>;

/// Euclidean norm of a vector.
pub fn magnitude<const D: usize>(v: &SVector<f32, D>) -> f32 {
    return v.norm();
}

/// Divides every component of a vector by a scalar.
///
/// Panics if the scalar is zero.
pub fn div_scalar<const D: usize>(v: &SVector<f32, D>, scalar: f32) -> SVector<f32, D> {
    assert!(scalar != 0.0, "division of a vector by a zero scalar");
    return v.unscale(scalar);
}

/// Unit vector pointing in the direction of `v`.
///
/// Panics on a zero-length vector instead of handing back zeros.
pub fn normalized<const D: usize>(v: &SVector<f32, D>) -> SVector<f32, D> {
    let length = magnitude(v);
    assert!(length != 0.0, "cannot normalize a zero-length vector");
    return v.unscale(length);
}

/// Transformation of a point to homogenous coordinates.
pub fn to_hom_point(v: &Vector3f) -> Vector4f {
    return vector![v.x, v.y, v.z, 1.0];
}

/// Transformation of a vector (direction) to homogenous coordinates.
pub fn to_hom_vector(v: &Vector3f) -> Vector4f {
    return vector![v.x, v.y, v.z, 0.0];
}

/// Transformation of a point from homogenous coordinates.
/// Returns None for w == 0, which has no 3D counterpart.
pub fn from_hom_point(v: &Vector4f) -> Option<Vector3f> {
    if v.w == 0.0 {
        return None;
    }
    return Some(vector![v.x / v.w, v.y / v.w, v.z / v.w]);
}

/// Transformation of a vector from homogenous coordinates, w is dropped.
pub fn from_hom_vector(v: &Vector4f) -> Vector3f {
    return vector![v.x, v.y, v.z];
}

/// Matrix with the given row and column removed.
pub fn minor(m: &DMatrix<f32>, row: usize, col: usize) -> DMatrix<f32> {
    assert!(m.is_square(), "minor of a non-square {}x{} matrix", m.nrows(), m.ncols());
    assert!(
        row < m.nrows() && col < m.ncols(),
        "minor ({}, {}) out of range for a {}x{} matrix",
        row, col, m.nrows(), m.ncols()
    );
    return m.clone().remove_row(row).remove_column(col);
}

/// Determinant by recursive cofactor expansion along the first row.
/// The determinant of a 1x1 matrix is its only element, the empty matrix gives 1.
pub fn determinant(m: &DMatrix<f32>) -> f32 {
    assert!(m.is_square(), "determinant of a non-square {}x{} matrix", m.nrows(), m.ncols());
    match m.nrows() {
        0 => return 1.0,
        1 => return m[(0, 0)],
        _ => (),
    }
    let mut det = 0.0;
    for col in 0..m.ncols() {
        det += m[(0, col)] * cofactor(m, 0, col);
    }
    return det;
}

/// Signed minor determinant.
pub fn cofactor(m: &DMatrix<f32>, row: usize, col: usize) -> f32 {
    let sign = if (row + col) % 2 == 0 { 1.0 } else { -1.0 };
    return sign * determinant(&minor(m, row, col));
}

fn to_dynamic<const N: usize>(m: &SMatrix<f32, N, N>) -> DMatrix<f32> {
    return DMatrix::from_fn(N, N, |i, j| m[(i, j)]);
}

/// Matrix of all cofactors, C[i][j] = cofactor(i, j).
pub fn cofactor_matrix<const N: usize>(m: &SMatrix<f32, N, N>) -> SMatrix<f32, N, N> {
    let dynamic = to_dynamic(m);
    return SMatrix::from_fn(|i, j| cofactor(&dynamic, i, j));
}

/// Classical adjoint, the transposed cofactor matrix.
pub fn adjugate<const N: usize>(m: &SMatrix<f32, N, N>) -> SMatrix<f32, N, N> {
    return cofactor_matrix(m).transpose();
}

/// (M^-1)^T, which is what normals get transformed with.
/// None for singular matrices.
pub fn invert_transpose<const N: usize>(m: &SMatrix<f32, N, N>) -> Option<SMatrix<f32, N, N>> {
    let cofactors = cofactor_matrix(m);
    // Expansion along the first row reuses the cofactors we already have.
    let mut det = 0.0;
    for col in 0..N {
        det += m[(0, col)] * cofactors[(0, col)];
    }
    if det == 0.0 {
        return None;
    }
    return Some(cofactors / det);
}

/// Inverse via the adjugate, None for singular matrices.
pub fn invert<const N: usize>(m: &SMatrix<f32, N, N>) -> Option<SMatrix<f32, N, N>> {
    return invert_transpose(m).map(|it| it.transpose());
}

pub fn translation(t: &Vector3f) -> Matrix4f {
    return matrix![1.0, 0.0, 0.0, t.x;
                   0.0, 1.0, 0.0, t.y;
                   0.0, 0.0, 1.0, t.z;
                   0.0, 0.0, 0.0, 1.0];
}

pub fn scaling(x: f32, y: f32, z: f32) -> Matrix4f {
    return matrix![x,   0.0, 0.0, 0.0;
                   0.0, y,   0.0, 0.0;
                   0.0, 0.0, z,   0.0;
                   0.0, 0.0, 0.0, 1.0];
}

/// Rotation around the x axis (pitch), angle in radians.
pub fn rotation_x(radians: f32) -> Matrix4f {
    let (s, c) = radians.sin_cos();
    return matrix![1.0, 0.0, 0.0, 0.0;
                   0.0, c,   -s,  0.0;
                   0.0, s,   c,   0.0;
                   0.0, 0.0, 0.0, 1.0];
}

/// Rotation around the y axis (yaw), angle in radians.
pub fn rotation_y(radians: f32) -> Matrix4f {
    let (s, c) = radians.sin_cos();
    return matrix![c,   0.0, s,   0.0;
                   0.0, 1.0, 0.0, 0.0;
                   -s,  0.0, c,   0.0;
                   0.0, 0.0, 0.0, 1.0];
}

/// Rotation around the z axis (roll), angle in radians.
pub fn rotation_z(radians: f32) -> Matrix4f {
    let (s, c) = radians.sin_cos();
    return matrix![c,   -s,  0.0, 0.0;
                   s,   c,   0.0, 0.0;
                   0.0, 0.0, 1.0, 0.0;
                   0.0, 0.0, 0.0, 1.0];
}

/// Maps the [-1, 1] cube into the pixel rectangle starting at (x, y) of size w x h
/// and the depth range [0, depth].
pub fn viewport(x: f32, y: f32, w: f32, h: f32, depth: f32) -> Matrix4f {
    return matrix![w / 2.0, 0.0,     0.0,         x + w / 2.0;
                   0.0,     h / 2.0, 0.0,         y + h / 2.0;
                   0.0,     0.0,     depth / 2.0, depth / 2.0;
                   0.0,     0.0,     0.0,         1.0];
}

/// Simple perspective, w = 1 - z / distance.
pub fn projection(distance: f32) -> Matrix4f {
    assert!(distance != 0.0, "projection with a zero camera distance");
    let mut m = Matrix4f::identity();
    m[(3, 2)] = -1.0 / distance;
    return m;
}
