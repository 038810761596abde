//! Headless material-instance parameter editor.
//!
//! The editor works on a snapshot of one instance: parameters declared by the base material are
//! grouped by their group name, valued from the instance chain, and flagged as overridden where the
//! instance carries its own value. Every change goes through a [`TransactionHistory`] so it can be
//! undone, and [`MaterialInstanceEditor::copy_to_source_instance`] writes the result back.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::material_registry::{MaterialRegistry, ParameterKind, ParameterValue, ShadingModel};
use crate::transaction::TransactionHistory;

/// Group name used for parameters declared without one.
pub const UNGROUPED: &str = "None";
pub const PARAMETER_GROUPS_CATEGORY: &str = "Parameter Groups";
pub const DEFAULT_CATEGORY: &str = "Default";
pub const MATERIAL_OVERRIDES_CATEGORY: &str = "Material Overrides";
pub const HIDDEN_PROPERTIES: [&str; 3] = ["bUseOldStyleMICEditorGroups", "ParameterGroups", "BasePropertyOverrides"];

pub const OVERRIDE_PARAMETER_TRANSACTION: &str = "Override Parameter";
pub const RESET_TO_DEFAULT_TRANSACTION: &str = "Reset To Default";
pub const SET_PARENT_TRANSACTION: &str = "Set Parent";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterEditError {
    #[error("Material instance '{0}' is not in the registry")]
    UnknownInstance(String),
    #[error("'{0}' is not a material or material instance")]
    UnknownMaterial(String),
    #[error("No parameter named '{0}'")]
    UnknownParameter(String),
    #[error("Parameter '{name}' holds a {expected} value, not a {found} value")]
    KindMismatch { name: String, expected: ParameterKind, found: ParameterKind },
    #[error("Cannot set {candidate} as a parent as it is already a child of this material instance.")]
    ParentRejected { candidate: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorParameter {
    pub name: String,
    pub expression_id: Uuid,
    pub description: String,
    pub value: ParameterValue,
    pub overridden: bool,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorParameterGroup {
    pub name: String,
    pub parameters: Vec<EditorParameter>,
}

#[derive(Debug, Clone, PartialEq)]
struct BaseMaterialInfo {
    path: String,
    uses_distortion: bool,
    shading_model: ShadingModel,
}

#[derive(Debug, Clone, PartialEq)]
struct EditorSnapshot {
    parent: Option<String>,
    base: Option<BaseMaterialInfo>,
    groups: Vec<EditorParameterGroup>,
}

impl EditorSnapshot {
    /// Rebuilds the parameter list under `parent`, keeping any override whose kind still fits.
    fn collect(
        registry: &MaterialRegistry,
        parent: Option<&str>,
        overrides: &BTreeMap<String, ParameterValue>,
    ) -> Self {
        let base = parent.and_then(|path| registry.base_material(path));
        let mut grouped: BTreeMap<String, Vec<EditorParameter>> = BTreeMap::new();
        for decl in base.map(|material| material.parameters.as_slice()).unwrap_or_default() {
            let own = overrides.get(&decl.name).filter(|value| value.kind() == decl.default.kind());
            let value = match own {
                Some(value) => value.clone(),
                None => parent
                    .and_then(|path| registry.parameter_value(path, &decl.name))
                    .filter(|value| value.kind() == decl.default.kind())
                    .unwrap_or_else(|| decl.default.clone()),
            };
            let group = decl.group.clone().filter(|group| !group.is_empty()).unwrap_or_else(|| UNGROUPED.to_string());
            grouped.entry(group).or_default().push(EditorParameter {
                name: decl.name.clone(),
                expression_id: decl.expression_id,
                description: decl.description.clone(),
                value,
                overridden: own.is_some(),
                visible: decl.visible,
            });
        }
        let groups = grouped
            .into_iter()
            .map(|(name, mut parameters)| {
                parameters.sort_by(|a, b| a.name.cmp(&b.name));
                EditorParameterGroup { name, parameters }
            })
            .collect();
        Self {
            parent: parent.map(str::to_string),
            base: base.map(|material| BaseMaterialInfo {
                path: material.path.clone(),
                uses_distortion: material.uses_distortion,
                shading_model: material.shading_model,
            }),
            groups,
        }
    }

    fn parameters(&self) -> impl Iterator<Item = &EditorParameter> {
        self.groups.iter().flat_map(|group| group.parameters.iter())
    }

    fn parameter_mut(&mut self, name: &str) -> Option<&mut EditorParameter> {
        self.groups.iter_mut().flat_map(|group| group.parameters.iter_mut()).find(|parameter| parameter.name == name)
    }

    fn overrides(&self) -> BTreeMap<String, ParameterValue> {
        self.parameters()
            .filter(|parameter| parameter.overridden)
            .map(|parameter| (parameter.name.clone(), parameter.value.clone()))
            .collect()
    }
}

pub struct MaterialInstanceEditor {
    instance_path: String,
    state: EditorSnapshot,
    history: TransactionHistory<EditorSnapshot>,
}

impl MaterialInstanceEditor {
    pub fn open(registry: &MaterialRegistry, instance_path: &str) -> Result<Self, ParameterEditError> {
        let instance = registry
            .instance(instance_path)
            .ok_or_else(|| ParameterEditError::UnknownInstance(instance_path.to_string()))?;
        let state = EditorSnapshot::collect(registry, instance.parent.as_deref(), &instance.overrides);
        debug!(instance = instance_path, groups = state.groups.len(), "opened material instance editor");
        Ok(Self { instance_path: instance_path.to_string(), state, history: TransactionHistory::default() })
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = TransactionHistory::new(limit);
        self
    }

    pub fn instance_path(&self) -> &str {
        &self.instance_path
    }

    pub fn parent(&self) -> Option<&str> {
        self.state.parent.as_deref()
    }

    pub fn base_material(&self) -> Option<&str> {
        self.state.base.as_ref().map(|base| base.path.as_str())
    }

    pub fn groups(&self) -> &[EditorParameterGroup] {
        &self.state.groups
    }

    pub fn parameter(&self, name: &str) -> Option<&EditorParameter> {
        self.state.parameters().find(|parameter| parameter.name == name)
    }

    pub fn value(&self, name: &str) -> Option<&ParameterValue> {
        self.parameter(name).map(|parameter| &parameter.value)
    }

    /// Labels of undoable edits, oldest first.
    pub fn transaction_labels(&self) -> Vec<&str> {
        self.history.labels()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Commits a new value. Editing a value turns its override on.
    pub fn set_value(&mut self, name: &str, value: ParameterValue) -> Result<(), ParameterEditError> {
        let current = self.require(name)?;
        if current.value.kind() != value.kind() {
            return Err(ParameterEditError::KindMismatch {
                name: name.to_string(),
                expected: current.value.kind(),
                found: value.kind(),
            });
        }
        self.edit(&format!("Edit {name}"), |state| {
            if let Some(parameter) = state.parameter_mut(name) {
                parameter.value = value;
                parameter.overridden = true;
            }
        });
        Ok(())
    }

    pub fn set_override(&mut self, name: &str, overridden: bool) -> Result<(), ParameterEditError> {
        self.require(name)?;
        self.edit(OVERRIDE_PARAMETER_TRANSACTION, |state| {
            if let Some(parameter) = state.parameter_mut(name) {
                parameter.overridden = overridden;
            }
        });
        Ok(())
    }

    /// Copies the parent's value for `name` and writes the instance back. Returns `false` without
    /// touching anything when the parent has no value for it.
    pub fn reset_to_default(&mut self, registry: &mut MaterialRegistry, name: &str) -> Result<bool, ParameterEditError> {
        let kind = self.require(name)?.value.kind();
        let inherited = self
            .state
            .parent
            .as_deref()
            .and_then(|parent| registry.parameter_value(parent, name))
            .filter(|value| value.kind() == kind);
        let Some(inherited) = inherited else {
            return Ok(false);
        };
        self.edit(RESET_TO_DEFAULT_TRANSACTION, |state| {
            if let Some(parameter) = state.parameter_mut(name) {
                parameter.value = inherited;
            }
        });
        self.copy_to_source_instance(registry)?;
        Ok(true)
    }

    /// Rejects `candidate` when it is this instance or already one of its children.
    pub fn can_set_parent(&self, registry: &MaterialRegistry, candidate: &str) -> Result<(), ParameterEditError> {
        if !registry.contains(candidate) {
            return Err(ParameterEditError::UnknownMaterial(candidate.to_string()));
        }
        if registry.instance(candidate).is_some() && registry.is_child_of(candidate, &self.instance_path) {
            return Err(ParameterEditError::ParentRejected { candidate: crate::assets::object_name(candidate).to_string() });
        }
        Ok(())
    }

    pub fn set_parent(&mut self, registry: &MaterialRegistry, candidate: Option<&str>) -> Result<(), ParameterEditError> {
        if let Some(candidate) = candidate {
            self.can_set_parent(registry, candidate)?;
        }
        let next = EditorSnapshot::collect(registry, candidate, &self.state.overrides());
        self.edit(SET_PARENT_TRANSACTION, |state| *state = next);
        Ok(())
    }

    /// Parameter values the instance overrides, keyed by name.
    pub fn overrides(&self) -> BTreeMap<String, ParameterValue> {
        self.state.overrides()
    }

    /// Writes the parent and overridden values back into the edited instance.
    pub fn copy_to_source_instance(&self, registry: &mut MaterialRegistry) -> Result<(), ParameterEditError> {
        let instance = registry
            .instance_mut(&self.instance_path)
            .ok_or_else(|| ParameterEditError::UnknownInstance(self.instance_path.clone()))?;
        instance.parent = self.state.parent.clone();
        instance.overrides = self.state.overrides();
        Ok(())
    }

    pub fn undo(&mut self) -> Option<String> {
        let record = self.history.undo()?;
        self.state = record.before;
        Some(record.label)
    }

    pub fn redo(&mut self) -> Option<String> {
        let record = self.history.redo()?;
        self.state = record.after;
        Some(record.label)
    }

    pub fn details_layout(&self, show_hidden: bool) -> DetailsLayout {
        let groups = self
            .state
            .groups
            .iter()
            .map(|group| DetailsGroup {
                name: group.name.clone(),
                rows: group.parameters.iter().map(|parameter| ParameterRow::new(parameter, show_hidden)).collect(),
            })
            .collect();
        let uses_distortion = self.state.base.as_ref().is_some_and(|base| base.uses_distortion);
        let subsurface_profile =
            self.state.base.as_ref().is_some_and(|base| base.shading_model == ShadingModel::SubsurfaceProfile);
        let defaults = vec![
            PropertyRow::visible("PhysMaterial"),
            PropertyRow::visible("Parent"),
            PropertyRow::visible("LightmassSettings"),
            PropertyRow { property: "RefractionDepthBias", visible: uses_distortion },
            PropertyRow { property: "bOverrideSubsurfaceProfile", visible: subsurface_profile },
            PropertyRow { property: "SubsurfaceProfile", visible: subsurface_profile },
        ];
        let overrides = vec![PropertyRow::visible("bOverrideBaseProperties"), PropertyRow::visible("BasePropertyOverrides")];
        DetailsLayout {
            categories: vec![
                DetailsCategory { name: PARAMETER_GROUPS_CATEGORY, groups, properties: Vec::new() },
                DetailsCategory { name: DEFAULT_CATEGORY, groups: Vec::new(), properties: defaults },
                DetailsCategory { name: MATERIAL_OVERRIDES_CATEGORY, groups: Vec::new(), properties: overrides },
            ],
            hidden_properties: HIDDEN_PROPERTIES.to_vec(),
        }
    }

    fn require(&self, name: &str) -> Result<&EditorParameter, ParameterEditError> {
        self.parameter(name).ok_or_else(|| ParameterEditError::UnknownParameter(name.to_string()))
    }

    fn edit(&mut self, label: &str, apply: impl FnOnce(&mut EditorSnapshot)) {
        let before = self.state.clone();
        apply(&mut self.state);
        if self.state != before {
            debug!(instance = %self.instance_path, label, "material instance edit");
            self.history.record(label, before, self.state.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterWidget {
    Value(ParameterValue),
    ComponentMask { r: bool, g: bool, b: bool, a: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRow {
    pub display_name: String,
    pub tooltip: String,
    pub edit_enabled: bool,
    pub visible: bool,
    pub widget: ParameterWidget,
}

impl ParameterRow {
    fn new(parameter: &EditorParameter, show_hidden: bool) -> Self {
        let widget = match parameter.value {
            ParameterValue::StaticComponentMask { r, g, b, a } => ParameterWidget::ComponentMask { r, g, b, a },
            ref value => ParameterWidget::Value(value.clone()),
        };
        Self {
            display_name: parameter.name.clone(),
            tooltip: parameter.description.clone(),
            edit_enabled: parameter.overridden,
            visible: show_hidden || parameter.visible,
            widget,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailsGroup {
    pub name: String,
    pub rows: Vec<ParameterRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyRow {
    pub property: &'static str,
    pub visible: bool,
}

impl PropertyRow {
    const fn visible(property: &'static str) -> Self {
        Self { property, visible: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailsCategory {
    pub name: &'static str,
    pub groups: Vec<DetailsGroup>,
    pub properties: Vec<PropertyRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailsLayout {
    pub categories: Vec<DetailsCategory>,
    pub hidden_properties: Vec<&'static str>,
}

impl DetailsLayout {
    pub fn category(&self, name: &str) -> Option<&DetailsCategory> {
        self.categories.iter().find(|category| category.name == name)
    }

    pub fn is_property_visible(&self, property: &str) -> bool {
        self.categories
            .iter()
            .flat_map(|category| category.properties.iter())
            .any(|row| row.property == property && row.visible)
    }

    /// Plain-text rendering with collapsed rows left out.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for category in &self.categories {
            let _ = writeln!(out, "[{}]", category.name);
            for group in &category.groups {
                let _ = writeln!(out, "  {}", group.name);
                for row in group.rows.iter().filter(|row| row.visible) {
                    let marker = if row.edit_enabled { "*" } else { " " };
                    let _ = writeln!(out, "   {marker} {} = {:?}", row.display_name, row.widget);
                }
            }
            for row in category.properties.iter().filter(|row| row.visible) {
                let _ = writeln!(out, "  {}", row.property);
            }
        }
        out
    }
}
