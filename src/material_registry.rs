use anyhow::{Context, Result};
use glam::Vec4;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::factory::validation::MAX_PARENT_HOPS;

/// Value carried by a material parameter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ParameterValue {
    Scalar(f32),
    Vector(#[serde(with = "vec4_as_color")] Vec4),
    Texture(Option<String>),
    Font {
        #[serde(default)]
        font: Option<String>,
        #[serde(default)]
        page: i32,
    },
    StaticSwitch(bool),
    StaticComponentMask { r: bool, g: bool, b: bool, a: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    Scalar,
    Vector,
    Texture,
    Font,
    StaticSwitch,
    StaticComponentMask,
}

impl ParameterValue {
    pub fn kind(&self) -> ParameterKind {
        match self {
            ParameterValue::Scalar(_) => ParameterKind::Scalar,
            ParameterValue::Vector(_) => ParameterKind::Vector,
            ParameterValue::Texture(_) => ParameterKind::Texture,
            ParameterValue::Font { .. } => ParameterKind::Font,
            ParameterValue::StaticSwitch(_) => ParameterKind::StaticSwitch,
            ParameterValue::StaticComponentMask { .. } => ParameterKind::StaticComponentMask,
        }
    }
}

impl std::fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ParameterKind::Scalar => "scalar",
            ParameterKind::Vector => "vector",
            ParameterKind::Texture => "texture",
            ParameterKind::Font => "font",
            ParameterKind::StaticSwitch => "static switch",
            ParameterKind::StaticComponentMask => "static component mask",
        };
        f.write_str(name)
    }
}

mod vec4_as_color {
    use crate::scene::ColorData;
    use glam::Vec4;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Vec4, serializer: S) -> Result<S::Ok, S::Error> {
        ColorData::from(*value).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec4, D::Error> {
        ColorData::deserialize(deserializer).map(Vec4::from)
    }
}

/// A parameter expression exposed by a base material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialParameterDecl {
    pub name: String,
    #[serde(default = "Uuid::new_v4")]
    pub expression_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub description: String,
    pub default: ParameterValue,
    #[serde(default = "MaterialParameterDecl::default_visible")]
    pub visible: bool,
}

impl MaterialParameterDecl {
    pub fn new(name: impl Into<String>, default: ParameterValue) -> Self {
        Self {
            name: name.into(),
            expression_id: Uuid::new_v4(),
            group: None,
            description: String::new(),
            default,
            visible: true,
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    const fn default_visible() -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadingModel {
    Unlit,
    #[default]
    DefaultLit,
    Subsurface,
    PreintegratedSkin,
    ClearCoat,
    SubsurfaceProfile,
    TwoSidedFoliage,
    Hair,
    Cloth,
    Eye,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDefinition {
    pub path: String,
    #[serde(default)]
    pub parameters: Vec<MaterialParameterDecl>,
    #[serde(default)]
    pub uses_distortion: bool,
    #[serde(default)]
    pub shading_model: ShadingModel,
}

impl MaterialDefinition {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), parameters: Vec::new(), uses_distortion: false, shading_model: ShadingModel::default() }
    }

    pub fn with_parameter(mut self, parameter: MaterialParameterDecl) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&MaterialParameterDecl> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialInstanceDefinition {
    pub path: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub overrides: BTreeMap<String, ParameterValue>,
}

impl MaterialInstanceDefinition {
    pub fn new(path: impl Into<String>, parent: Option<&str>) -> Self {
        Self { path: path.into(), parent: parent.map(str::to_string), overrides: BTreeMap::new() }
    }

    pub fn with_override(mut self, name: impl Into<String>, value: ParameterValue) -> Self {
        self.overrides.insert(name.into(), value);
        self
    }
}

/// Either end of a parent link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialInterface<'a> {
    Material(&'a MaterialDefinition),
    Instance(&'a MaterialInstanceDefinition),
}

#[derive(Debug, Default, Deserialize)]
struct MaterialRegistryFile {
    #[serde(default)]
    materials: Vec<MaterialDefinition>,
    #[serde(default)]
    instances: Vec<MaterialInstanceDefinition>,
}

/// Base materials and the instances layered on top of them, keyed by object path.
#[derive(Debug, Clone, Default)]
pub struct MaterialRegistry {
    materials: BTreeMap<String, MaterialDefinition>,
    instances: BTreeMap<String, MaterialInstanceDefinition>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read material registry {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("Failed to parse material registry {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let file: MaterialRegistryFile = serde_json::from_str(text)?;
        let mut registry = Self::new();
        for material in file.materials {
            registry.insert_material(material);
        }
        for instance in file.instances {
            registry.insert_instance(instance);
        }
        Ok(registry)
    }

    pub fn insert_material(&mut self, material: MaterialDefinition) {
        self.instances.remove(&material.path);
        self.materials.insert(material.path.clone(), material);
    }

    pub fn insert_instance(&mut self, instance: MaterialInstanceDefinition) {
        self.materials.remove(&instance.path);
        self.instances.insert(instance.path.clone(), instance);
    }

    pub fn material(&self, path: &str) -> Option<&MaterialDefinition> {
        self.materials.get(path)
    }

    pub fn instance(&self, path: &str) -> Option<&MaterialInstanceDefinition> {
        self.instances.get(path)
    }

    pub fn instance_mut(&mut self, path: &str) -> Option<&mut MaterialInstanceDefinition> {
        self.instances.get_mut(path)
    }

    pub fn interface(&self, path: &str) -> Option<MaterialInterface<'_>> {
        self.materials
            .get(path)
            .map(MaterialInterface::Material)
            .or_else(|| self.instances.get(path).map(MaterialInterface::Instance))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.interface(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.materials.len() + self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty() && self.instances.is_empty()
    }

    /// `path` followed by each parent up to and including the base material. Stops early on a
    /// dangling parent or a cycle.
    pub fn parent_chain<'a>(&'a self, path: &str) -> Vec<MaterialInterface<'a>> {
        let mut chain = Vec::new();
        let mut current = Some(path);
        while let Some(path) = current {
            if chain.len() > MAX_PARENT_HOPS as usize {
                break;
            }
            match self.interface(path) {
                Some(MaterialInterface::Material(material)) => {
                    chain.push(MaterialInterface::Material(material));
                    break;
                }
                Some(MaterialInterface::Instance(instance)) => {
                    if chain.iter().any(|seen| matches!(seen, MaterialInterface::Instance(i) if i.path == instance.path)) {
                        break;
                    }
                    chain.push(MaterialInterface::Instance(instance));
                    current = instance.parent.as_deref();
                }
                None => break,
            }
        }
        chain
    }

    pub fn base_material(&self, path: &str) -> Option<&MaterialDefinition> {
        self.parent_chain(path).into_iter().find_map(|link| match link {
            MaterialInterface::Material(material) => Some(material),
            MaterialInterface::Instance(_) => None,
        })
    }

    /// Resolves a parameter through instance overrides, nearest first, then the base default.
    pub fn parameter_value(&self, path: &str, name: &str) -> Option<ParameterValue> {
        self.parent_chain(path).into_iter().find_map(|link| match link {
            MaterialInterface::Instance(instance) => instance.overrides.get(name).cloned(),
            MaterialInterface::Material(material) => material.parameter(name).map(|decl| decl.default.clone()),
        })
    }

    /// True when `ancestor` is `candidate` itself or appears in its parent chain.
    pub fn is_child_of(&self, candidate: &str, ancestor: &str) -> bool {
        self.parent_chain(candidate).iter().any(|link| match link {
            MaterialInterface::Material(material) => material.path == ancestor,
            MaterialInterface::Instance(instance) => instance.path == ancestor,
        })
    }
}
