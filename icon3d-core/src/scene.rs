/// Per-icon scene graph: a camera, lighting and an optional pivot node
use nalgebra::{Matrix4, Vector3};

use crate::config::GalleryConfig;
use crate::geometry::Mesh;
use crate::projection::Camera;
use crate::transform::{RotationState, Transform};

/// Wrapper node that rotates a centered model about its own center
#[derive(Debug, Clone)]
pub struct PivotNode {
    pub model: Mesh,
    pub rotation: RotationState,
}

impl PivotNode {
    /// Normalize `model` to `target_size` and wrap it.
    ///
    /// The model is scaled uniformly so its largest dimension equals
    /// `target_size`, then translated so the center of its post-scale bounds
    /// sits at the origin.
    pub fn wrap(mut model: Mesh, target_size: f32) -> Self {
        if let Some(bounds) = model.bounding_box() {
            let factor = Transform::fit_scale(&bounds, target_size);
            model.transform(&Transform::uniform_scale_matrix(factor));
        }
        if let Some(bounds) = model.bounding_box() {
            model.transform(&Transform::recenter_matrix(&bounds));
        }

        Self {
            model,
            rotation: RotationState::default(),
        }
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        Transform::rotation_matrix(&self.rotation)
    }
}

/// Ambient plus one directional light
#[derive(Debug, Clone, Copy)]
pub struct Lighting {
    pub ambient: f32,
    pub directional: f32,
    /// Unit vector pointing from the scene towards the light
    pub direction: Vector3<f32>,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: 0.45,
            directional: 0.75,
            direction: Vector3::new(1.0, 1.0, 2.0).normalize(),
        }
    }
}

/// Everything needed to draw one icon
#[derive(Debug, Clone)]
pub struct IconScene {
    pub camera: Camera,
    pub lighting: Lighting,
    pub pivot: Option<PivotNode>,
}

impl IconScene {
    pub fn new(config: &GalleryConfig) -> Self {
        Self {
            camera: Camera::for_icon(config),
            lighting: Lighting::default(),
            pivot: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.pivot.is_some()
    }
}
