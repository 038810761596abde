use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::factory::ActorFactory;
use crate::level::{ActorSummary, Level, WorldContext};
use crate::placement::PlacementRequest;

/// A batch of drops to replay into a fresh level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlacementBatch {
    #[serde(default)]
    pub context: WorldContext,
    #[serde(default)]
    pub requests: Vec<PlacementRequest>,
}

/// Snapshot of a level written after a batch has been placed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelSummary {
    #[serde(default)]
    pub context: WorldContext,
    #[serde(default)]
    pub actors: Vec<ActorSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementRequestData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory: Option<ActorFactory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    pub location: Vec3Data,
    #[serde(default = "PlacementRequestData::default_normal")]
    pub surface_normal: Vec3Data,
    #[serde(default = "PlacementRequestData::default_rotation")]
    pub base_rotation: QuatData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform3DData {
    pub translation: Vec3Data,
    pub rotation: QuatData,
    #[serde(default = "Transform3DData::default_scale")]
    pub scale: Vec3Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3Data {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuatData {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorData {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl PlacementBatch {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Reading placement batch {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("Parsing placement batch {}", path.display()))
    }
}

impl LevelSummary {
    pub fn capture(level: &Level) -> Self {
        Self { context: level.context(), actors: level.actors() }
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Reading level summary {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("Parsing level summary {}", path.display()))
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating level summary directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json.as_bytes()).with_context(|| format!("Writing level summary {}", path.display()))?;
        Ok(())
    }
}

impl PlacementRequestData {
    fn default_normal() -> Vec3Data {
        glam::Vec3::Z.into()
    }

    fn default_rotation() -> QuatData {
        glam::Quat::IDENTITY.into()
    }
}

impl Transform3DData {
    fn default_scale() -> Vec3Data {
        glam::Vec3::ONE.into()
    }

    pub fn from_components(translation: glam::Vec3, rotation: glam::Quat, scale: glam::Vec3) -> Self {
        Self { translation: translation.into(), rotation: rotation.into(), scale: scale.into() }
    }

    pub fn components(&self) -> (glam::Vec3, glam::Quat, glam::Vec3) {
        (self.translation.into(), self.rotation.into(), self.scale.into())
    }
}

impl From<glam::Vec3> for Vec3Data {
    fn from(value: glam::Vec3) -> Self {
        Self { x: value.x, y: value.y, z: value.z }
    }
}

impl From<Vec3Data> for glam::Vec3 {
    fn from(value: Vec3Data) -> Self {
        glam::Vec3::new(value.x, value.y, value.z)
    }
}

impl From<glam::Quat> for QuatData {
    fn from(value: glam::Quat) -> Self {
        let v = value.normalize();
        Self { x: v.x, y: v.y, z: v.z, w: v.w }
    }
}

impl From<QuatData> for glam::Quat {
    fn from(value: QuatData) -> Self {
        glam::Quat::from_xyzw(value.x, value.y, value.z, value.w)
    }
}

impl From<glam::Vec4> for ColorData {
    fn from(value: glam::Vec4) -> Self {
        Self { r: value.x, g: value.y, b: value.z, a: value.w }
    }
}

impl From<ColorData> for glam::Vec4 {
    fn from(value: ColorData) -> Self {
        glam::Vec4::new(value.r, value.g, value.b, value.a)
    }
}
