use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::assets::object_name;

// ---------- World context ----------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorldMode {
    #[default]
    Editor,
    PlayInEditor,
    Game,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NetMode {
    #[default]
    Standalone,
    ListenServer,
    DedicatedServer,
    Client,
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorldContext {
    pub mode: WorldMode,
    pub net_mode: NetMode,
    pub has_begun_play: bool,
}

impl WorldContext {
    /// Play-in-editor sessions count as game worlds.
    pub fn is_game_world(&self) -> bool {
        matches!(self.mode, WorldMode::Game | WorldMode::PlayInEditor)
    }

    pub fn is_play_in_editor(&self) -> bool {
        self.mode == WorldMode::PlayInEditor
    }

    pub fn is_client(&self) -> bool {
        self.net_mode == NetMode::Client
    }
}

// ---------- Actor classes ----------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorClass {
    Actor,
    Pawn,
    Character,
    StaticMeshActor,
    SkeletalMeshActor,
    DestructibleActor,
    DecalActor,
    TextRenderActor,
    Emitter,
    NiagaraActor,
    PlayerStart,
    TargetPoint,
    Note,
    CameraActor,
    AmbientSound,
    DirectionalLight,
    SpotLight,
    PointLight,
    SkyLight,
    SphereReflectionCapture,
    BoxReflectionCapture,
    PlaneReflectionCapture,
    AtmosphericFog,
    ExponentialHeightFog,
    InteractiveFoliageActor,
    TriggerBox,
    TriggerCapsule,
    TriggerSphere,
    VectorFieldVolume,
    Volume,
    LevelSequenceActor,
    Generated { path: String },
}

impl ActorClass {
    pub const NATIVE: [ActorClass; 31] = [
        ActorClass::Actor,
        ActorClass::Pawn,
        ActorClass::Character,
        ActorClass::StaticMeshActor,
        ActorClass::SkeletalMeshActor,
        ActorClass::DestructibleActor,
        ActorClass::DecalActor,
        ActorClass::TextRenderActor,
        ActorClass::Emitter,
        ActorClass::NiagaraActor,
        ActorClass::PlayerStart,
        ActorClass::TargetPoint,
        ActorClass::Note,
        ActorClass::CameraActor,
        ActorClass::AmbientSound,
        ActorClass::DirectionalLight,
        ActorClass::SpotLight,
        ActorClass::PointLight,
        ActorClass::SkyLight,
        ActorClass::SphereReflectionCapture,
        ActorClass::BoxReflectionCapture,
        ActorClass::PlaneReflectionCapture,
        ActorClass::AtmosphericFog,
        ActorClass::ExponentialHeightFog,
        ActorClass::InteractiveFoliageActor,
        ActorClass::TriggerBox,
        ActorClass::TriggerCapsule,
        ActorClass::TriggerSphere,
        ActorClass::VectorFieldVolume,
        ActorClass::Volume,
        ActorClass::LevelSequenceActor,
    ];

    pub fn class_name(&self) -> &str {
        match self {
            ActorClass::Actor => "Actor",
            ActorClass::Pawn => "Pawn",
            ActorClass::Character => "Character",
            ActorClass::StaticMeshActor => "StaticMeshActor",
            ActorClass::SkeletalMeshActor => "SkeletalMeshActor",
            ActorClass::DestructibleActor => "DestructibleActor",
            ActorClass::DecalActor => "DecalActor",
            ActorClass::TextRenderActor => "TextRenderActor",
            ActorClass::Emitter => "Emitter",
            ActorClass::NiagaraActor => "NiagaraActor",
            ActorClass::PlayerStart => "PlayerStart",
            ActorClass::TargetPoint => "TargetPoint",
            ActorClass::Note => "Note",
            ActorClass::CameraActor => "CameraActor",
            ActorClass::AmbientSound => "AmbientSound",
            ActorClass::DirectionalLight => "DirectionalLight",
            ActorClass::SpotLight => "SpotLight",
            ActorClass::PointLight => "PointLight",
            ActorClass::SkyLight => "SkyLight",
            ActorClass::SphereReflectionCapture => "SphereReflectionCapture",
            ActorClass::BoxReflectionCapture => "BoxReflectionCapture",
            ActorClass::PlaneReflectionCapture => "PlaneReflectionCapture",
            ActorClass::AtmosphericFog => "AtmosphericFog",
            ActorClass::ExponentialHeightFog => "ExponentialHeightFog",
            ActorClass::InteractiveFoliageActor => "InteractiveFoliageActor",
            ActorClass::TriggerBox => "TriggerBox",
            ActorClass::TriggerCapsule => "TriggerCapsule",
            ActorClass::TriggerSphere => "TriggerSphere",
            ActorClass::VectorFieldVolume => "VectorFieldVolume",
            ActorClass::Volume => "Volume",
            ActorClass::LevelSequenceActor => "LevelSequenceActor",
            ActorClass::Generated { path } => object_name(path),
        }
    }

    pub fn path(&self) -> String {
        match self {
            ActorClass::Generated { path } => path.clone(),
            ActorClass::NiagaraActor => "/Script/Niagara.NiagaraActor".to_string(),
            ActorClass::LevelSequenceActor => "/Script/LevelSequence.LevelSequenceActor".to_string(),
            native => format!("/Script/Engine.{}", native.class_name()),
        }
    }

    pub fn from_class_name(name: &str) -> Option<ActorClass> {
        Self::NATIVE.iter().find(|class| class.class_name() == name).cloned()
    }

    /// Native classes resolve by path; anything else is treated as a generated class.
    pub fn from_path(path: &str) -> ActorClass {
        Self::NATIVE
            .iter()
            .find(|class| class.path() == path)
            .cloned()
            .unwrap_or_else(|| ActorClass::Generated { path: path.to_string() })
    }

    pub fn is_native(&self) -> bool {
        !matches!(self, ActorClass::Generated { .. })
    }
}

// ---------- Components ----------
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Transform3D {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}
impl Default for Transform3D {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}
impl Transform3D {
    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self { translation, rotation, ..Default::default() }
    }
}

#[derive(Component, Clone, Debug, PartialEq)]
pub struct ActorInfo {
    pub class: ActorClass,
    /// Object name, unique within the level.
    pub name: String,
    /// Editor-facing label.
    pub label: String,
}

#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneRoot {
    pub movable: bool,
    pub visualize: bool,
}

#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct StaticMeshComponent {
    pub mesh: Option<String>,
    pub derived_data_key: Option<String>,
    pub override_materials: SmallVec<[Option<String>; 4]>,
}
impl StaticMeshComponent {
    pub fn set_material(&mut self, slot: usize, material: impl Into<String>) {
        if self.override_materials.len() <= slot {
            self.override_materials.resize(slot + 1, None);
        }
        self.override_materials[slot] = Some(material.into());
    }

    pub fn material(&self, slot: usize) -> Option<&str> {
        self.override_materials.get(slot).and_then(|m| m.as_deref())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationMode {
    #[default]
    AnimationBlueprint,
    AnimationSingleNode,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KinematicBonesUpdate {
    #[default]
    SkipSimulatingBones,
    SkipAllBones,
}

#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct SkeletalMeshComponent {
    pub mesh: Option<String>,
    pub physics_asset_override: Option<String>,
    pub anim_instance_class: Option<String>,
    pub animation_mode: AnimationMode,
    pub animation_to_play: Option<String>,
    pub vertex_animation_to_play: Option<String>,
    pub kinematic_bones_update: KinematicBonesUpdate,
    pub simulate_physics: bool,
    pub blend_physics: bool,
}

#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct DestructibleComponent {
    pub mesh: Option<String>,
}

#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct DecalComponent {
    pub material: Option<String>,
}

#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct ParticleSystemComponent {
    pub template: Option<String>,
}

#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct NiagaraComponent {
    pub effect: Option<String>,
}

#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct AudioComponent {
    pub sound: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BrushBuilder {
    Cube { x: f32, y: f32, z: f32 },
    Sphere { radius: f32, sphere_extrapolation: u32 },
    Cylinder { outer_radius: f32, z: f32, sides: u32 },
}

#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct BrushComponent {
    pub builder: Option<BrushBuilder>,
}

#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct VectorFieldComponent {
    pub field: Option<String>,
}

#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct SequencePlayer {
    pub sequence: Option<String>,
}

#[derive(Component, Clone, Debug, PartialEq)]
pub struct ActorReplication {
    pub replicates: bool,
    pub always_relevant: bool,
    pub replicate_movement: bool,
    pub net_update_frequency: f32,
    pub replicated_mesh: Option<String>,
    pub replicated_physics_asset: Option<String>,
}
impl Default for ActorReplication {
    fn default() -> Self {
        Self {
            replicates: false,
            always_relevant: false,
            replicate_movement: false,
            net_update_frequency: 100.0,
            replicated_mesh: None,
            replicated_physics_asset: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_classes_round_trip_through_paths() {
        for class in ActorClass::NATIVE.iter() {
            assert_eq!(&ActorClass::from_path(&class.path()), class);
        }
        assert_eq!(ActorClass::NiagaraActor.path(), "/Script/Niagara.NiagaraActor");
        let generated = ActorClass::from_path("/Game/BP/Door.Door_C");
        assert_eq!(generated.class_name(), "Door_C");
        assert!(!generated.is_native());
    }

    #[test]
    fn material_slots_grow_on_demand() {
        let mut mesh = StaticMeshComponent::default();
        mesh.set_material(2, "/Game/M.M");
        assert_eq!(mesh.override_materials.len(), 3);
        assert_eq!(mesh.material(0), None);
        assert_eq!(mesh.material(2), Some("/Game/M.M"));
    }

    #[test]
    fn play_in_editor_is_a_game_world() {
        let ctx = WorldContext { mode: WorldMode::PlayInEditor, ..Default::default() };
        assert!(ctx.is_game_world());
        assert!(!WorldContext::default().is_game_world());
    }
}
