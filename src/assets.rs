use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Tag keys the asset registry exposes without loading the asset.
pub mod tags {
    pub const PARENT: &str = "Parent";
    pub const MATERIAL_DOMAIN: &str = "MaterialDomain";
    pub const SKELETON: &str = "Skeleton";
    pub const PREVIEW_SKELETAL_MESH: &str = "PreviewSkeletalMesh";
    pub const BASE_SKEL_MESH: &str = "BaseSkelMesh";
    pub const TARGET_SKELETON: &str = "TargetSkeleton";
    pub const PARENT_CLASS: &str = "ParentClass";
    pub const GENERATED_CLASS: &str = "GeneratedClass";
    pub const DERIVED_DATA_KEY: &str = "DerivedDataKey";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    StaticMesh,
    SkeletalMesh,
    DestructibleMesh,
    Skeleton,
    PhysicsAsset,
    AnimationAsset,
    AnimSequenceBase,
    AnimSequence,
    AnimMontage,
    VertexAnimation,
    Blueprint,
    AnimBlueprint,
    Class,
    MaterialInterface,
    Material,
    MaterialInstance,
    MaterialInstanceConstant,
    ParticleSystem,
    NiagaraEffect,
    SoundBase,
    SoundWave,
    SoundCue,
    VectorField,
    LevelSequence,
    Volume,
    Texture,
    Font,
}

impl AssetClass {
    pub fn parent(self) -> Option<AssetClass> {
        match self {
            AssetClass::DestructibleMesh => Some(AssetClass::SkeletalMesh),
            AssetClass::AnimSequenceBase => Some(AssetClass::AnimationAsset),
            AssetClass::AnimSequence | AssetClass::AnimMontage => Some(AssetClass::AnimSequenceBase),
            AssetClass::AnimBlueprint => Some(AssetClass::Blueprint),
            AssetClass::Material | AssetClass::MaterialInstance => Some(AssetClass::MaterialInterface),
            AssetClass::MaterialInstanceConstant => Some(AssetClass::MaterialInstance),
            AssetClass::SoundWave | AssetClass::SoundCue => Some(AssetClass::SoundBase),
            _ => None,
        }
    }

    pub fn is_child_of(self, ancestor: AssetClass) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class == ancestor {
                return true;
            }
            current = class.parent();
        }
        false
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetData {
    pub object_path: String,
    #[serde(default)]
    pub asset_name: String,
    pub class: AssetClass,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl AssetData {
    pub fn new(object_path: impl Into<String>, class: AssetClass) -> Self {
        let object_path = object_path.into();
        let asset_name = object_name(&object_path).to_string();
        Self { object_path, asset_name, class, tags: BTreeMap::new() }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Tag value, treating empty values as missing.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str).filter(|value| !value.is_empty())
    }

    pub fn is_a(&self, class: AssetClass) -> bool {
        self.class.is_child_of(class)
    }
}

/// `/Game/Props/Chair.Chair` -> `Chair`; paths without an object part fall back to the last segment.
pub fn object_name(object_path: &str) -> &str {
    let tail = object_path.rsplit('/').next().unwrap_or(object_path);
    match tail.rsplit_once('.') {
        Some((_, name)) if !name.is_empty() => name,
        _ => tail,
    }
}

/// `Class'/Game/Blueprints/Door.Door_C'` -> `/Game/Blueprints/Door.Door_C`.
pub fn object_path_from_export_text(text: &str) -> &str {
    match (text.find('\''), text.rfind('\'')) {
        (Some(start), Some(end)) if end > start => &text[start + 1..end],
        _ => text,
    }
}

/// Read-only view of the asset registry handed to factories and editors.
pub trait AssetRegistry {
    fn asset_by_object_path(&self, object_path: &str) -> Option<&AssetData>;

    /// Ancestors of a class that may not be loaded, nearest first.
    fn ancestor_class_names(&self, class_name: &str) -> Vec<String>;
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    assets: Vec<AssetData>,
    #[serde(default)]
    classes: BTreeMap<String, String>,
}

#[derive(Debug, Default, Clone)]
pub struct AssetCatalog {
    assets: HashMap<String, AssetData>,
    class_parents: HashMap<String, String>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read asset catalog {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("Failed to parse asset catalog {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(text)?;
        let mut catalog = Self::new();
        for mut asset in file.assets {
            if asset.asset_name.is_empty() {
                asset.asset_name = object_name(&asset.object_path).to_string();
            }
            catalog.insert(asset);
        }
        for (name, parent) in file.classes {
            catalog.register_class(name, parent);
        }
        debug!(assets = catalog.len(), "asset catalog loaded");
        Ok(catalog)
    }

    /// Inserts or replaces the asset stored under its object path.
    pub fn insert(&mut self, asset: AssetData) -> Option<AssetData> {
        self.assets.insert(asset.object_path.clone(), asset)
    }

    pub fn register_class(&mut self, name: impl Into<String>, parent: impl Into<String>) {
        self.class_parents.insert(name.into(), parent.into());
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetRegistry for AssetCatalog {
    fn asset_by_object_path(&self, object_path: &str) -> Option<&AssetData> {
        self.assets.get(object_path)
    }

    fn ancestor_class_names(&self, class_name: &str) -> Vec<String> {
        let mut ancestors = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(class_name.to_string());
        let mut current = class_name;
        while let Some(parent) = self.class_parents.get(current) {
            if !seen.insert(parent.clone()) {
                break;
            }
            ancestors.push(parent.clone());
            current = parent;
        }
        ancestors
    }
}
