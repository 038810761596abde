//! Actor factories: which assets each kind of actor can be created from, how the actor is
//! oriented against a surface, and how its components are wired after spawning.

pub mod setup;
pub mod validation;

pub use setup::{skeletal_mesh_from_asset, BASIC_SHAPE_MATERIAL};
pub use validation::{CannotCreateActor, BASIC_SHAPES};

use anyhow::Result;
use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::alignment::SurfaceAlignment;
use crate::assets::{object_path_from_export_text, tags, AssetClass, AssetData, AssetRegistry};
use crate::level::{
    ActorClass, AudioComponent, DestructibleComponent, Level, NiagaraComponent, ParticleSystemComponent,
    SceneRoot, SequencePlayer, StaticMeshComponent, Transform3D,
};

/// Offset applied in the actor's frame to lights and reflection captures so they sit in front of
/// the surface they were dropped on.
pub const LIGHT_SPAWN_OFFSET: Vec3 = Vec3::new(50.0, 0.0, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorFactory {
    EmptyActor,
    Character,
    Pawn,
    BasicShape,
    StaticMesh,
    DeferredDecal,
    TextRender,
    Emitter,
    Niagara,
    PlayerStart,
    TargetPoint,
    Note,
    PhysicsAsset,
    AnimationAsset,
    SkeletalMesh,
    CameraActor,
    AmbientSound,
    Class,
    Blueprint,
    DirectionalLight,
    SpotLight,
    PointLight,
    SkyLight,
    SphereReflectionCapture,
    BoxReflectionCapture,
    PlaneReflectionCapture,
    AtmosphericFog,
    ExponentialHeightFog,
    InteractiveFoliage,
    TriggerBox,
    TriggerCapsule,
    TriggerSphere,
    Destructible,
    VectorFieldVolume,
    BoxVolume,
    SphereVolume,
    CylinderVolume,
    MovieScene,
}

impl ActorFactory {
    /// Every factory, in lookup order.
    pub const ALL: [ActorFactory; 38] = [
        ActorFactory::EmptyActor,
        ActorFactory::Character,
        ActorFactory::Pawn,
        ActorFactory::BasicShape,
        ActorFactory::StaticMesh,
        ActorFactory::DeferredDecal,
        ActorFactory::TextRender,
        ActorFactory::Emitter,
        ActorFactory::Niagara,
        ActorFactory::PlayerStart,
        ActorFactory::TargetPoint,
        ActorFactory::Note,
        ActorFactory::PhysicsAsset,
        ActorFactory::AnimationAsset,
        ActorFactory::SkeletalMesh,
        ActorFactory::CameraActor,
        ActorFactory::AmbientSound,
        ActorFactory::Class,
        ActorFactory::Blueprint,
        ActorFactory::DirectionalLight,
        ActorFactory::SpotLight,
        ActorFactory::PointLight,
        ActorFactory::SkyLight,
        ActorFactory::SphereReflectionCapture,
        ActorFactory::BoxReflectionCapture,
        ActorFactory::PlaneReflectionCapture,
        ActorFactory::AtmosphericFog,
        ActorFactory::ExponentialHeightFog,
        ActorFactory::InteractiveFoliage,
        ActorFactory::TriggerBox,
        ActorFactory::TriggerCapsule,
        ActorFactory::TriggerSphere,
        ActorFactory::Destructible,
        ActorFactory::VectorFieldVolume,
        ActorFactory::BoxVolume,
        ActorFactory::SphereVolume,
        ActorFactory::CylinderVolume,
        ActorFactory::MovieScene,
    ];

    pub fn all() -> &'static [ActorFactory] {
        &Self::ALL
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ActorFactory::EmptyActor => "Empty Actor",
            ActorFactory::Character => "Empty Character",
            ActorFactory::Pawn => "Empty Pawn",
            ActorFactory::BasicShape => "Basic Shape",
            ActorFactory::StaticMesh => "Static Mesh",
            ActorFactory::DeferredDecal => "Deferred Decal",
            ActorFactory::TextRender => "Text Render",
            ActorFactory::Emitter => "Emitter",
            ActorFactory::Niagara => "NiagaraEffect",
            ActorFactory::PlayerStart => "Player Start",
            ActorFactory::TargetPoint => "Target Point",
            ActorFactory::Note => "Note",
            ActorFactory::PhysicsAsset => "Skeletal Physics",
            ActorFactory::AnimationAsset => "Single Animation Skeletal",
            ActorFactory::SkeletalMesh => "Skeletal Mesh",
            ActorFactory::CameraActor => "Camera",
            ActorFactory::AmbientSound => "Ambient Sound",
            ActorFactory::Class => "Class",
            ActorFactory::Blueprint => "Blueprint",
            ActorFactory::DirectionalLight => "Directional Light",
            ActorFactory::SpotLight => "Spot Light",
            ActorFactory::PointLight => "Point Light",
            ActorFactory::SkyLight => "Sky Light",
            ActorFactory::SphereReflectionCapture => "Sphere Reflection Capture",
            ActorFactory::BoxReflectionCapture => "Box Reflection Capture",
            ActorFactory::PlaneReflectionCapture => "Plane Reflection Capture",
            ActorFactory::AtmosphericFog => "Atmospheric Fog",
            ActorFactory::ExponentialHeightFog => "Exponential Height Fog",
            ActorFactory::InteractiveFoliage => "Interactive Foliage",
            ActorFactory::TriggerBox => "Box Trigger",
            ActorFactory::TriggerCapsule => "Capsule Trigger",
            ActorFactory::TriggerSphere => "Sphere Trigger",
            ActorFactory::Destructible => "Destructible",
            ActorFactory::VectorFieldVolume => "Vector Field Volume",
            ActorFactory::BoxVolume => "Box Volume",
            ActorFactory::SphereVolume => "Sphere Volume",
            ActorFactory::CylinderVolume => "Cylinder Volume",
            ActorFactory::MovieScene => "MovieScene",
        }
    }

    /// Class spawned by this factory. `Class` and `Blueprint` take theirs from the asset.
    pub fn actor_class(self) -> Option<ActorClass> {
        let class = match self {
            ActorFactory::EmptyActor => ActorClass::Actor,
            ActorFactory::Character => ActorClass::Character,
            ActorFactory::Pawn => ActorClass::Pawn,
            ActorFactory::BasicShape | ActorFactory::StaticMesh => ActorClass::StaticMeshActor,
            ActorFactory::DeferredDecal => ActorClass::DecalActor,
            ActorFactory::TextRender => ActorClass::TextRenderActor,
            ActorFactory::Emitter => ActorClass::Emitter,
            ActorFactory::Niagara => ActorClass::NiagaraActor,
            ActorFactory::PlayerStart => ActorClass::PlayerStart,
            ActorFactory::TargetPoint => ActorClass::TargetPoint,
            ActorFactory::Note => ActorClass::Note,
            ActorFactory::PhysicsAsset | ActorFactory::AnimationAsset | ActorFactory::SkeletalMesh => {
                ActorClass::SkeletalMeshActor
            }
            ActorFactory::CameraActor => ActorClass::CameraActor,
            ActorFactory::AmbientSound => ActorClass::AmbientSound,
            ActorFactory::Class | ActorFactory::Blueprint => return None,
            ActorFactory::DirectionalLight => ActorClass::DirectionalLight,
            ActorFactory::SpotLight => ActorClass::SpotLight,
            ActorFactory::PointLight => ActorClass::PointLight,
            ActorFactory::SkyLight => ActorClass::SkyLight,
            ActorFactory::SphereReflectionCapture => ActorClass::SphereReflectionCapture,
            ActorFactory::BoxReflectionCapture => ActorClass::BoxReflectionCapture,
            ActorFactory::PlaneReflectionCapture => ActorClass::PlaneReflectionCapture,
            ActorFactory::AtmosphericFog => ActorClass::AtmosphericFog,
            ActorFactory::ExponentialHeightFog => ActorClass::ExponentialHeightFog,
            ActorFactory::InteractiveFoliage => ActorClass::InteractiveFoliageActor,
            ActorFactory::TriggerBox => ActorClass::TriggerBox,
            ActorFactory::TriggerCapsule => ActorClass::TriggerCapsule,
            ActorFactory::TriggerSphere => ActorClass::TriggerSphere,
            ActorFactory::Destructible => ActorClass::DestructibleActor,
            ActorFactory::VectorFieldVolume => ActorClass::VectorFieldVolume,
            ActorFactory::BoxVolume | ActorFactory::SphereVolume | ActorFactory::CylinderVolume => {
                ActorClass::Volume
            }
            ActorFactory::MovieScene => ActorClass::LevelSequenceActor,
        };
        Some(class)
    }

    pub fn use_surface_orientation(self) -> bool {
        matches!(
            self,
            ActorFactory::StaticMesh
                | ActorFactory::BasicShape
                | ActorFactory::DeferredDecal
                | ActorFactory::TextRender
                | ActorFactory::SkeletalMesh
                | ActorFactory::AnimationAsset
                | ActorFactory::DirectionalLight
                | ActorFactory::SpotLight
                | ActorFactory::PointLight
                | ActorFactory::SphereReflectionCapture
                | ActorFactory::BoxReflectionCapture
                | ActorFactory::PlaneReflectionCapture
                | ActorFactory::Destructible
        )
    }

    pub fn spawn_position_offset(self) -> Vec3 {
        match self {
            ActorFactory::DirectionalLight
            | ActorFactory::SpotLight
            | ActorFactory::PointLight
            | ActorFactory::SphereReflectionCapture
            | ActorFactory::BoxReflectionCapture
            | ActorFactory::PlaneReflectionCapture => LIGHT_SPAWN_OFFSET,
            _ => Vec3::ZERO,
        }
    }

    /// Meshes stand on the surface with +Z whatever their orientation flag says; everything else
    /// faces it with -X, or ignores it.
    pub fn surface_alignment(self) -> SurfaceAlignment {
        match self {
            ActorFactory::StaticMesh
            | ActorFactory::BasicShape
            | ActorFactory::SkeletalMesh
            | ActorFactory::AnimationAsset
            | ActorFactory::Destructible => SurfaceAlignment::STAND_ON_SURFACE,
            _ if self.use_surface_orientation() => SurfaceAlignment::FACE_SURFACE,
            _ => SurfaceAlignment::Disabled,
        }
    }

    pub fn align_object_to_surface_normal(self, surface_normal: Vec3, actor_rotation: Quat) -> Quat {
        self.surface_alignment().align(surface_normal, actor_rotation)
    }

    pub fn can_create_actor_from(
        self,
        asset: Option<&AssetData>,
        registry: &dyn AssetRegistry,
    ) -> Result<(), CannotCreateActor> {
        validation::can_create_actor_from(self, asset, registry)
    }

    pub fn default_actor_class(self, asset: Option<&AssetData>, registry: &dyn AssetRegistry) -> Option<ActorClass> {
        match self {
            ActorFactory::Class => asset
                .filter(|asset| asset.is_a(AssetClass::Class))
                .filter(|asset| validation::is_actor_class(&asset.object_path, registry))
                .map(|asset| ActorClass::from_path(&asset.object_path)),
            ActorFactory::Blueprint => {
                let blueprint = asset.filter(|asset| asset.is_a(AssetClass::Blueprint))?;
                let generated = blueprint.tag(tags::GENERATED_CLASS)?;
                Some(ActorClass::from_path(object_path_from_export_text(generated)))
            }
            _ => self.actor_class(),
        }
    }

    /// Last chance to decline before anything is spawned.
    pub fn pre_spawn_actor(
        self,
        asset: Option<&AssetData>,
        registry: &dyn AssetRegistry,
        _transform: &mut Transform3D,
    ) -> bool {
        match self {
            ActorFactory::PhysicsAsset => asset
                .and_then(|physics| physics.tag(tags::PREVIEW_SKELETAL_MESH))
                .and_then(|path| registry.asset_by_object_path(path))
                .is_some(),
            ActorFactory::Class => self.default_actor_class(asset, registry).is_some(),
            ActorFactory::Blueprint => {
                self.default_actor_class(asset, registry).is_some()
                    && validation::can_create_actor_from(self, asset, registry).is_ok()
            }
            _ => true,
        }
    }

    pub fn spawn_actor(
        self,
        asset: Option<&AssetData>,
        registry: &dyn AssetRegistry,
        level: &mut Level,
        transform: &Transform3D,
        name: Option<&str>,
    ) -> Result<Option<Entity>> {
        let Some(class) = self.default_actor_class(asset, registry) else {
            return Ok(None);
        };
        let entity = level.spawn_actor(&class, transform.translation, transform.rotation, name)?;
        if let Some(mut spawned) = level.world.get_mut::<Transform3D>(entity) {
            spawned.scale = transform.scale;
        }

        match self {
            ActorFactory::EmptyActor => {
                level.world.entity_mut(entity).insert(SceneRoot { movable: true, visualize: true });
            }
            ActorFactory::MovieScene => {
                let sequence = asset.filter(|asset| asset.is_a(AssetClass::LevelSequence));
                if let (Some(sequence), Some(mut player)) = (sequence, level.world.get_mut::<SequencePlayer>(entity)) {
                    player.sequence = Some(sequence.object_path.clone());
                }
            }
            _ => {}
        }
        Ok(Some(entity))
    }

    pub fn post_spawn_actor(
        self,
        asset: Option<&AssetData>,
        registry: &dyn AssetRegistry,
        level: &mut Level,
        entity: Entity,
    ) -> Result<()> {
        setup::post_spawn_actor(self, asset, registry, level, entity)
    }

    /// Runs pre-spawn, spawn and post-spawn. `Ok(None)` when the factory declined to spawn. A
    /// failed post-spawn removes the actor again.
    pub fn create_actor(
        self,
        asset: Option<&AssetData>,
        registry: &dyn AssetRegistry,
        level: &mut Level,
        mut transform: Transform3D,
        name: Option<&str>,
    ) -> Result<Option<Entity>> {
        if !self.pre_spawn_actor(asset, registry, &mut transform) {
            debug!(factory = %self, "pre-spawn declined");
            return Ok(None);
        }
        let Some(entity) = self.spawn_actor(asset, registry, level, &transform, name)? else {
            return Ok(None);
        };
        if let Err(err) = self.post_spawn_actor(asset, registry, level, entity) {
            level.despawn_actor(entity);
            return Err(err);
        }
        Ok(Some(entity))
    }

    /// Object path of the asset an existing actor was created from, for the kinds that track one.
    pub fn asset_from_actor_instance(self, level: &Level, entity: Entity) -> Option<String> {
        let world = &level.world;
        match self {
            ActorFactory::StaticMesh => world.get::<StaticMeshComponent>(entity)?.mesh.clone(),
            ActorFactory::Emitter => world.get::<ParticleSystemComponent>(entity)?.template.clone(),
            ActorFactory::Niagara => world.get::<NiagaraComponent>(entity)?.effect.clone(),
            ActorFactory::AmbientSound => world.get::<AudioComponent>(entity)?.sound.clone(),
            ActorFactory::Destructible => world.get::<DestructibleComponent>(entity)?.mesh.clone(),
            ActorFactory::MovieScene => world.get::<SequencePlayer>(entity)?.sequence.clone(),
            _ => None,
        }
    }

    /// First factory, in [`ActorFactory::ALL`] order, that accepts the asset.
    pub fn find_for_asset(asset: &AssetData, registry: &dyn AssetRegistry) -> Option<ActorFactory> {
        Self::ALL
            .iter()
            .copied()
            .find(|factory| factory.can_create_actor_from(Some(asset), registry).is_ok())
    }
}

impl fmt::Display for ActorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
