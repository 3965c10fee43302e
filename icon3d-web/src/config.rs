/// Page-facing options accepted by `mount`
use icon3d_core::{ConfigError, GalleryConfig};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("invalid options JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid options: {0}")]
    Invalid(#[from] ConfigError),
}

/// DOM selectors and attribute names, plus the gallery settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Selector matching every icon container
    pub container_selector: String,
    /// Selector of the common ancestor watched by the visibility gate
    pub gate_selector: String,
    pub model_attribute: String,
    pub link_attribute: String,
    /// Browsing context used when an icon is clicked
    pub link_target: String,
    #[serde(flatten)]
    pub gallery: GalleryConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            container_selector: "[data-model]".to_string(),
            gate_selector: "footer".to_string(),
            model_attribute: "data-model".to_string(),
            link_attribute: "data-link".to_string(),
            link_target: "_blank".to_string(),
            gallery: GalleryConfig::default(),
        }
    }
}

impl WebConfig {
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        let config: WebConfig = serde_json::from_str(json)?;
        config.gallery.validate()?;
        Ok(config)
    }
}
