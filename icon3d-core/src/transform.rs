/// Transformation matrices and pivot rotation state
use nalgebra::{Matrix4, Vector3};

use crate::geometry::Aabb;

/// Rotation of a pivot node around three axes (in radians)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Rotation about the vertical axis only
    pub fn from_yaw(yaw: f32) -> Self {
        Self::new(0.0, yaw, 0.0)
    }

    pub fn yaw(&self) -> f32 {
        self.y
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.y = yaw;
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        // Apply rotations in order: Z, Y, X
        rz * ry * rx
    }

    pub fn translation_matrix(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    pub fn uniform_scale_matrix(factor: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(factor)
    }

    /// Scale factor that brings the largest extent of `bounds` to `target_size`.
    ///
    /// Flat or empty bounds keep their size.
    pub fn fit_scale(bounds: &Aabb, target_size: f32) -> f32 {
        let largest = bounds.max_dimension();
        if largest > f32::EPSILON {
            target_size / largest
        } else {
            1.0
        }
    }

    /// Translation that moves the center of `bounds` onto the origin
    pub fn recenter_matrix(bounds: &Aabb) -> Matrix4<f32> {
        Self::translation_matrix(&-bounds.center().coords)
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_identity_rotation() {
        let matrix = Transform::rotation_matrix(&RotationState::default());
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_yaw_turns_about_vertical_axis() {
        let rotation = RotationState::from_yaw(std::f32::consts::FRAC_PI_2);
        let matrix = Transform::rotation_matrix(&rotation);
        let turned = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((turned - Point3::new(0.0, 0.0, -1.0)).norm() < 1e-6);
        assert!((rotation.yaw() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_fit_scale() {
        let bounds = Aabb {
            min: Point3::new(0.0, 0.0, 0.0),
            max: Point3::new(4.0, 1.0, 2.0),
        };
        assert!((Transform::fit_scale(&bounds, 2.0) - 0.5).abs() < 1e-6);

        let flat = Aabb {
            min: Point3::new(1.0, 1.0, 1.0),
            max: Point3::new(1.0, 1.0, 1.0),
        };
        assert_eq!(Transform::fit_scale(&flat, 2.0), 1.0);
    }
}
