//! TRS transform with a cached local matrix.
//!
//! Position, rotation and scale are plain public fields; the matrix is
//! rebuilt lazily by comparing them against a shadow copy, so setting the
//! same value twice costs nothing.

use glam::{Affine3A, EulerRot, Mat4, Quat, Vec3};

#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    local_matrix: Affine3A,

    // Shadow state for the dirty check.
    last_position: Vec3,
    last_rotation: Quat,
    last_scale: Vec3,
    force_update: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            local_matrix: Affine3A::IDENTITY,
            last_position: Vec3::ZERO,
            last_rotation: Quat::IDENTITY,
            last_scale: Vec3::ONE,
            force_update: true,
        }
    }

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        let mut t = Self::new();
        t.position = position;
        t
    }

    /// Rebuilds the local matrix if any TRS field changed. Returns whether a
    /// rebuild happened.
    pub fn update_local_matrix(&mut self) -> bool {
        let changed = self.position != self.last_position
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale
            || self.force_update;

        if changed {
            self.local_matrix = Affine3A::from_scale_rotation_translation(
                self.scale,
                self.rotation,
                self.position,
            );
            self.last_position = self.position;
            self.last_rotation = self.rotation;
            self.last_scale = self.scale;
            self.force_update = false;
        }

        changed
    }

    /// Current local matrix, refreshing the cache first.
    pub fn matrix(&mut self) -> Mat4 {
        self.update_local_matrix();
        Mat4::from(self.local_matrix)
    }

    /// Helper: set rotation from XYZ Euler angles in radians.
    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebuild_happens_only_when_trs_changes() {
        let mut t = Transform::new();
        assert!(t.update_local_matrix(), "first update populates the cache");
        assert!(!t.update_local_matrix(), "unchanged TRS is a no-op");

        t.position = Vec3::new(1.0, 2.0, 3.0);
        assert!(t.update_local_matrix());
        assert!(!t.update_local_matrix());

        // Writing back the same value must not dirty the cache.
        t.position = Vec3::new(1.0, 2.0, 3.0);
        assert!(!t.update_local_matrix());
    }

    #[test]
    fn matrix_reflects_current_trs() {
        let mut t = Transform::from_position(Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(t.matrix().w_axis.truncate(), Vec3::new(0.0, 3.0, 0.0));

        t.scale = Vec3::splat(2.0);
        let m = t.matrix();
        assert_eq!(m.x_axis.x, 2.0);
        assert_eq!(m.w_axis.truncate(), Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn euler_helper_matches_quat_construction() {
        let mut t = Transform::new();
        t.set_rotation_euler(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        let expected = Quat::from_euler(EulerRot::XYZ, 0.0, std::f32::consts::FRAC_PI_2, 0.0);
        assert!(t.rotation.abs_diff_eq(expected, 1e-6));
    }
}
