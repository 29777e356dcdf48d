use crate::util::{normalized, Matrix4f, Vector3f};

/// Camera placed at `eye`, looking at `center`, with `up` giving the rough vertical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vector3f,
    pub center: Vector3f,
    pub up: Vector3f,
}

impl Default for Camera {
    fn default() -> Self {
        return Camera::new(Vector3f::new(0.0, 0.0, 3.0), Vector3f::zeros(), Vector3f::y());
    }
}

impl Camera {
    pub fn new(eye: Vector3f, center: Vector3f, up: Vector3f) -> Camera {
        return Camera { eye, center, up };
    }

    /// Distance between eye and center, drives the perspective strength.
    pub fn distance(&self) -> f32 {
        return (self.eye - self.center).norm();
    }

    /// Orthonormal (right, true up, forward) basis. Forward points from center back to the eye.
    ///
    /// Panics if eye and center coincide or up is parallel to the view direction.
    pub fn basis(&self) -> (Vector3f, Vector3f, Vector3f) {
        let forward = normalized(&(self.eye - self.center));
        let right = normalized(&self.up.cross(&forward));
        let true_up = normalized(&forward.cross(&right));
        return (right, true_up, forward);
    }

    /// View matrix: basis vectors as rows and the center moved to the origin.
    pub fn look_at(&self) -> Matrix4f {
        let (right, true_up, forward) = self.basis();
        let mut view = Matrix4f::identity();
        for i in 0..3 {
            view[(0, i)] = right[i];
            view[(1, i)] = true_up[i];
            view[(2, i)] = forward[i];
            view[(i, 3)] = -self.center[i];
        }
        return view;
    }
}
