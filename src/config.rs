use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PlacementConfig {
    #[serde(default = "PlacementConfig::default_align_to_surface")]
    pub align_to_surface: bool,
    #[serde(default = "PlacementConfig::default_apply_spawn_offset")]
    pub apply_spawn_offset: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MaterialEditorConfig {
    #[serde(default)]
    pub show_hidden_parameters: bool,
    #[serde(default = "MaterialEditorConfig::default_history_limit")]
    pub history_limit: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub placement: PlacementConfig,
    #[serde(default)]
    pub material_editor: MaterialEditorConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfigOverrides {
    pub align_to_surface: Option<bool>,
    pub show_hidden_parameters: Option<bool>,
}

impl PlacementConfig {
    const fn default_align_to_surface() -> bool {
        true
    }

    const fn default_apply_spawn_offset() -> bool {
        true
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            align_to_surface: Self::default_align_to_surface(),
            apply_spawn_offset: Self::default_apply_spawn_offset(),
        }
    }
}

impl MaterialEditorConfig {
    const fn default_history_limit() -> usize {
        128
    }
}

impl Default for MaterialEditorConfig {
    fn default() -> Self {
        Self { show_hidden_parameters: false, history_limit: Self::default_history_limit() }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &AppConfigOverrides) {
        if let Some(align) = overrides.align_to_surface {
            self.placement.align_to_surface = align;
        }
        if let Some(show_hidden) = overrides.show_hidden_parameters {
            self.material_editor.show_hidden_parameters = show_hidden;
        }
    }
}

impl AppConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.align_to_surface.is_none() && self.show_hidden_parameters.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.align_to_surface.is_some() {
            fields.push("align_to_surface");
        }
        if self.show_hidden_parameters.is_some() {
            fields.push("show_hidden_parameters");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_use_defaults() {
        let cfg: AppConfig = serde_json::from_str(r#"{ "placement": { "align_to_surface": false } }"#)
            .expect("parse partial config");
        assert!(!cfg.placement.align_to_surface);
        assert!(cfg.placement.apply_spawn_offset);
        assert_eq!(cfg.material_editor, MaterialEditorConfig::default());
    }

    #[test]
    fn overrides_only_touch_set_fields() {
        let mut cfg = AppConfig::default();
        let overrides = AppConfigOverrides { align_to_surface: None, show_hidden_parameters: Some(true) };
        cfg.apply_overrides(&overrides);
        assert!(cfg.placement.align_to_surface);
        assert!(cfg.material_editor.show_hidden_parameters);
        assert_eq!(overrides.applied_fields(), vec!["show_hidden_parameters"]);
        assert!(AppConfigOverrides::default().is_empty());
    }
}
