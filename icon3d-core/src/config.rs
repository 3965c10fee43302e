/// Tunable parameters for the icon gallery
use serde::Deserialize;

use crate::error::ConfigError;

/// Camera projection requested by the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionKind {
    Perspective,
    Orthographic,
}

/// Gallery-wide settings shared by every icon
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Edge length of the square offscreen target in CSS pixels
    pub render_size: u32,
    /// Upper bound applied to the device pixel ratio
    pub max_pixel_ratio: f64,
    /// Largest dimension of every model after normalization
    pub target_size: f32,
    /// Radians of yaw per horizontal pixel dragged
    pub drag_sensitivity: f32,
    /// Horizontal distance (px) after which a press counts as a drag
    pub drag_threshold: f64,
    /// Auto-spin phase offset between consecutive icons (radians)
    pub phase_step: f32,
    pub camera_distance: f32,
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    pub projection: ProjectionKind,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            render_size: 128,
            max_pixel_ratio: 2.0,
            target_size: 2.0,
            drag_sensitivity: 0.02,
            drag_threshold: 2.0,
            phase_step: 0.5,
            camera_distance: 4.0,
            field_of_view: 45.0,
            projection: ProjectionKind::Perspective,
        }
    }
}

impl GalleryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render_size == 0 {
            return Err(ConfigError::NotPositive { field: "render_size" });
        }

        let positive = [
            ("max_pixel_ratio", self.max_pixel_ratio),
            ("target_size", self.target_size as f64),
            ("camera_distance", self.camera_distance as f64),
            ("field_of_view", self.field_of_view as f64),
        ];
        for (field, value) in positive {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field });
            }
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field });
            }
        }

        let finite = [
            ("drag_sensitivity", self.drag_sensitivity as f64),
            ("drag_threshold", self.drag_threshold),
            ("phase_step", self.phase_step as f64),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field });
            }
        }

        Ok(())
    }

    /// Side length in device pixels of the shared offscreen target
    pub fn device_render_size(&self, device_pixel_ratio: f64) -> u32 {
        let ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(self.max_pixel_ratio)
        } else {
            1.0
        };
        ((self.render_size as f64 * ratio).round() as u32).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GalleryConfig =
            serde_json::from_str(r#"{ "render_size": 96, "projection": "orthographic" }"#).unwrap();
        assert_eq!(config.render_size, 96);
        assert_eq!(config.projection, ProjectionKind::Orthographic);
        assert!((config.drag_sensitivity - 0.02).abs() < 1e-6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = GalleryConfig {
            target_size: 0.0,
            ..GalleryConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "target_size" })
        );

        let config = GalleryConfig {
            phase_step: f32::NAN,
            ..GalleryConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotFinite { field: "phase_step" })
        );
    }

    #[test]
    fn test_pixel_ratio_is_capped() {
        let config = GalleryConfig::default();
        assert_eq!(config.device_render_size(1.0), 128);
        assert_eq!(config.device_render_size(1.5), 192);
        assert_eq!(config.device_render_size(3.0), 256);
        assert_eq!(config.device_render_size(f64::NAN), 128);
    }
}
