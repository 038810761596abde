use thiserror::Error;

use super::ActorFactory;
use crate::assets::{object_name, object_path_from_export_text, tags, AssetClass, AssetData, AssetRegistry};
use crate::level::ActorClass;

/// Engine meshes the basic shape factory accepts.
pub const BASIC_SHAPES: [&str; 4] = [
    "/Engine/BasicShapes/Cube.Cube",
    "/Engine/BasicShapes/Sphere.Sphere",
    "/Engine/BasicShapes/Cylinder.Cylinder",
    "/Engine/BasicShapes/Cone.Cone",
];

/// Material domain tag value of deferred decal materials.
pub const DEFERRED_DECAL_DOMAIN: &str = "MD_DeferredDecal";

/// Upper bound on `Parent` hops when resolving the base material of an instance chain.
pub const MAX_PARENT_HOPS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CannotCreateActor {
    #[error("{factory} actors cannot be created from this asset.")]
    Unsupported { factory: &'static str },
    #[error("A valid static mesh must be specified.")]
    NoStaticMesh,
    #[error("Only the engine basic shapes can be placed with this factory.")]
    NotABasicShape,
    #[error("A valid material must be specified.")]
    NoMaterial,
    #[error("The specified material must not have a recursive parent.")]
    RecursiveParentMaterial,
    #[error("Only materials with a material domain of DeferredDecal can be specified.")]
    NotDecalMaterial,
    #[error("A valid particle system must be specified.")]
    NoParticleSystem,
    #[error("A valid Niagara effect must be specified.")]
    NoNiagaraEffect,
    #[error("A valid physics asset must be specified.")]
    NoPhysicsAsset,
    #[error("A valid anim data must be specified.")]
    NoAnimData,
    #[error("Animation assets must have a valid skeleton.")]
    NoSkeleton,
    #[error("Animation assets must have a valid skeleton with a valid preview skeletal mesh.")]
    NoSkeletonPreviewMesh,
    #[error("Vertex animations must have a valid base skeletal mesh.")]
    NoBaseSkeletalMesh,
    #[error("No valid skeletal mesh was found associated with the animation sequence.")]
    NoSkeletalMesh,
    #[error("The animation sequence must not have a destructible mesh associated with it.")]
    DestructibleMeshAssociated,
    #[error("A valid skeletal mesh, anim blueprint or skeleton must be specified.")]
    NoSkeletalMeshSource,
    #[error("Anim blueprints must have a valid target skeleton.")]
    NoTargetSkeleton,
    #[error("The target skeleton must have a valid preview skeletal mesh.")]
    NoPreviewSkeletalMesh,
    #[error("A valid sound asset must be specified.")]
    NoSoundAsset,
    #[error("The specified class must be actor based.")]
    NotActorClass,
    #[error("No blueprint was specified, or the specified blueprint needs to be compiled.")]
    NoBlueprint,
    #[error("The specified blueprint must be actor based.")]
    NotActorBlueprint,
    #[error("No destructible mesh was specified.")]
    NoDestructibleMesh,
    #[error("No vector field was specified.")]
    NoVectorField,
    #[error("Only volume assets can be placed with this factory.")]
    NotAVolume,
    #[error("A valid sequencer asset must be specified.")]
    NoLevelSequence,
}

pub(crate) fn can_create_actor_from(
    factory: ActorFactory,
    asset: Option<&AssetData>,
    registry: &dyn AssetRegistry,
) -> Result<(), CannotCreateActor> {
    use ActorFactory as F;

    let unsupported = || CannotCreateActor::Unsupported { factory: factory.display_name() };
    match factory {
        F::EmptyActor | F::Character | F::Pawn => {
            let class_path = factory.actor_class().map(|class| class.path());
            match asset {
                Some(asset) if Some(&asset.object_path) == class_path.as_ref() => Ok(()),
                _ => Err(unsupported()),
            }
        }
        F::StaticMesh => require_class(asset, AssetClass::StaticMesh, CannotCreateActor::NoStaticMesh).map(drop),
        F::BasicShape => match asset {
            Some(asset) if BASIC_SHAPES.contains(&asset.object_path.as_str()) => Ok(()),
            _ => Err(CannotCreateActor::NotABasicShape),
        },
        F::DeferredDecal => {
            if accepts_by_default(factory, asset) {
                return Ok(());
            }
            let asset = asset.ok_or(CannotCreateActor::NoMaterial)?;
            let base = base_material(asset, registry)?;
            if base.tag(tags::MATERIAL_DOMAIN) == Some(DEFERRED_DECAL_DOMAIN) {
                Ok(())
            } else {
                Err(CannotCreateActor::NotDecalMaterial)
            }
        }
        F::Emitter => require_class(asset, AssetClass::ParticleSystem, CannotCreateActor::NoParticleSystem).map(drop),
        F::Niagara => require_class(asset, AssetClass::NiagaraEffect, CannotCreateActor::NoNiagaraEffect).map(drop),
        F::PhysicsAsset => require_class(asset, AssetClass::PhysicsAsset, CannotCreateActor::NoPhysicsAsset).map(drop),
        F::AnimationAsset => validate_animation_asset(asset, registry),
        F::SkeletalMesh => validate_skeletal_mesh_source(asset, registry),
        F::AmbientSound => optional_class(factory, asset, AssetClass::SoundBase, CannotCreateActor::NoSoundAsset),
        F::Class => match asset {
            Some(asset) if asset.is_a(AssetClass::Class) && is_actor_class(&asset.object_path, registry) => Ok(()),
            _ => Err(CannotCreateActor::NotActorClass),
        },
        F::Blueprint => {
            let asset = require_class(asset, AssetClass::Blueprint, CannotCreateActor::NoBlueprint)?;
            let parent = asset.tag(tags::PARENT_CLASS).ok_or(CannotCreateActor::NoBlueprint)?;
            if is_actor_class(object_path_from_export_text(parent), registry) {
                Ok(())
            } else {
                Err(CannotCreateActor::NotActorBlueprint)
            }
        }
        F::Destructible => {
            require_class(asset, AssetClass::DestructibleMesh, CannotCreateActor::NoDestructibleMesh).map(drop)
        }
        F::VectorFieldVolume => {
            require_class(asset, AssetClass::VectorField, CannotCreateActor::NoVectorField).map(drop)
        }
        F::BoxVolume | F::SphereVolume | F::CylinderVolume => {
            optional_class(factory, asset, AssetClass::Volume, CannotCreateActor::NotAVolume)
        }
        F::MovieScene => optional_class(factory, asset, AssetClass::LevelSequence, CannotCreateActor::NoLevelSequence),
        _ => {
            if accepts_by_default(factory, asset) {
                Ok(())
            } else {
                Err(unsupported())
            }
        }
    }
}

/// No asset at all, or the asset is the factory's own actor class.
fn accepts_by_default(factory: ActorFactory, asset: Option<&AssetData>) -> bool {
    match asset {
        None => true,
        Some(asset) => factory.actor_class().is_some_and(|class| class.path() == asset.object_path),
    }
}

fn require_class(
    asset: Option<&AssetData>,
    class: AssetClass,
    error: CannotCreateActor,
) -> Result<&AssetData, CannotCreateActor> {
    asset.filter(|asset| asset.is_a(class)).ok_or(error)
}

fn optional_class(
    factory: ActorFactory,
    asset: Option<&AssetData>,
    class: AssetClass,
    error: CannotCreateActor,
) -> Result<(), CannotCreateActor> {
    if accepts_by_default(factory, asset) {
        return Ok(());
    }
    match asset {
        Some(asset) if !asset.is_a(class) => Err(error),
        _ => Ok(()),
    }
}

/// Follows `Parent` tags from a material interface to the base material.
pub fn base_material<'a>(
    asset: &'a AssetData,
    registry: &'a dyn AssetRegistry,
) -> Result<&'a AssetData, CannotCreateActor> {
    if !asset.is_a(AssetClass::MaterialInterface) {
        return Err(CannotCreateActor::NoMaterial);
    }
    let mut current = asset;
    let mut hops = 0u32;
    while hops < MAX_PARENT_HOPS && !current.is_a(AssetClass::Material) {
        let parent = current.tag(tags::PARENT).ok_or(CannotCreateActor::NoMaterial)?;
        current = registry.asset_by_object_path(parent).ok_or(CannotCreateActor::NoMaterial)?;
        hops += 1;
    }
    if hops >= MAX_PARENT_HOPS {
        return Err(CannotCreateActor::RecursiveParentMaterial);
    }
    Ok(current)
}

/// Native actor classes, or script classes whose registered ancestry reaches one.
pub fn is_actor_class(class_path: &str, registry: &dyn AssetRegistry) -> bool {
    let name = object_name(class_path);
    ActorClass::from_class_name(name).is_some()
        || registry
            .ancestor_class_names(name)
            .iter()
            .any(|ancestor| ActorClass::from_class_name(ancestor).is_some())
}

/// Preview mesh of a skeleton asset, if the registry knows it.
pub(crate) fn skeleton_preview_mesh<'a>(
    skeleton: &AssetData,
    registry: &'a dyn AssetRegistry,
) -> Option<&'a AssetData> {
    let path = skeleton.tag(tags::PREVIEW_SKELETAL_MESH)?;
    registry.asset_by_object_path(path).filter(|mesh| mesh.is_a(AssetClass::SkeletalMesh))
}

fn validate_animation_asset(asset: Option<&AssetData>, registry: &dyn AssetRegistry) -> Result<(), CannotCreateActor> {
    let asset = asset
        .filter(|asset| asset.is_a(AssetClass::AnimSequenceBase) || asset.is_a(AssetClass::VertexAnimation))
        .ok_or(CannotCreateActor::NoAnimData)?;

    let mesh = if asset.is_a(AssetClass::AnimSequenceBase) {
        let skeleton_path = asset.tag(tags::SKELETON).ok_or(CannotCreateActor::NoSkeleton)?;
        let skeleton = registry
            .asset_by_object_path(skeleton_path)
            .filter(|skeleton| skeleton.is_a(AssetClass::Skeleton))
            .ok_or(CannotCreateActor::NoSkeleton)?;
        skeleton_preview_mesh(skeleton, registry).ok_or(CannotCreateActor::NoSkeletonPreviewMesh)?
    } else {
        let mesh_path = asset.tag(tags::BASE_SKEL_MESH).ok_or(CannotCreateActor::NoBaseSkeletalMesh)?;
        registry
            .asset_by_object_path(mesh_path)
            .filter(|mesh| mesh.is_a(AssetClass::SkeletalMesh))
            .ok_or(CannotCreateActor::NoSkeletalMesh)?
    };

    if mesh.is_a(AssetClass::DestructibleMesh) {
        return Err(CannotCreateActor::DestructibleMeshAssociated);
    }
    Ok(())
}

fn validate_skeletal_mesh_source(
    asset: Option<&AssetData>,
    registry: &dyn AssetRegistry,
) -> Result<(), CannotCreateActor> {
    let asset = asset
        .filter(|asset| {
            asset.is_a(AssetClass::SkeletalMesh)
                || asset.is_a(AssetClass::AnimBlueprint)
                || asset.is_a(AssetClass::Skeleton)
        })
        .ok_or(CannotCreateActor::NoSkeletalMeshSource)?;

    if asset.is_a(AssetClass::SkeletalMesh) {
        if asset.is_a(AssetClass::DestructibleMesh) {
            return Err(CannotCreateActor::DestructibleMeshAssociated);
        }
        return Ok(());
    }

    let skeleton = if asset.is_a(AssetClass::AnimBlueprint) {
        let path = asset.tag(tags::TARGET_SKELETON).ok_or(CannotCreateActor::NoTargetSkeleton)?;
        registry
            .asset_by_object_path(path)
            .filter(|skeleton| skeleton.is_a(AssetClass::Skeleton))
            .ok_or(CannotCreateActor::NoTargetSkeleton)?
    } else {
        asset
    };
    skeleton_preview_mesh(skeleton, registry).map(drop).ok_or(CannotCreateActor::NoPreviewSkeletalMesh)
}
