use anyhow::{anyhow, Result};
use bevy_ecs::prelude::*;
use tracing::{debug, info};

use super::validation::{base_material, skeleton_preview_mesh, DEFERRED_DECAL_DOMAIN};
use super::ActorFactory;
use crate::assets::{tags, AssetClass, AssetData, AssetRegistry};
use crate::level::{
    ActorReplication, AnimationMode, AudioComponent, BrushBuilder, BrushComponent, DecalComponent,
    DestructibleComponent, KinematicBonesUpdate, Level, NiagaraComponent, ParticleSystemComponent,
    SkeletalMeshComponent, StaticMeshComponent, VectorFieldComponent,
};

pub const BASIC_SHAPE_MATERIAL: &str = "/Engine/BasicShapes/BasicShapeMaterial.BasicShapeMaterial";

/// Net update rate for effects spawned on a server while play is running.
const SPAWNED_EFFECT_NET_UPDATE_FREQUENCY: f32 = 0.1;

pub(crate) fn post_spawn_actor(
    factory: ActorFactory,
    asset: Option<&AssetData>,
    registry: &dyn AssetRegistry,
    level: &mut Level,
    entity: Entity,
) -> Result<()> {
    use ActorFactory as F;

    match factory {
        F::StaticMesh | F::BasicShape => {
            let mesh = required(factory, asset, AssetClass::StaticMesh)?;
            label_from_asset(level, entity, Some(mesh));
            info!(mesh = %mesh.asset_name, "actor factory created static mesh actor");
            let component = component_mut::<StaticMeshComponent>(level, entity)?;
            component.mesh = Some(mesh.object_path.clone());
            component.derived_data_key = mesh.tag(tags::DERIVED_DATA_KEY).map(str::to_string);
            if factory == F::BasicShape {
                component.set_material(0, BASIC_SHAPE_MATERIAL);
            }
        }
        F::DeferredDecal => {
            label_from_asset(level, entity, asset);
            let decal_material = asset.filter(|asset| {
                base_material(asset, registry)
                    .is_ok_and(|base| base.tag(tags::MATERIAL_DOMAIN) == Some(DEFERRED_DECAL_DOMAIN))
            });
            if let Some(material) = decal_material {
                component_mut::<DecalComponent>(level, entity)?.material = Some(material.object_path.clone());
            }
        }
        F::Emitter => {
            let template = required(factory, asset, AssetClass::ParticleSystem)?;
            label_from_asset(level, entity, Some(template));
            component_mut::<ParticleSystemComponent>(level, entity)?.template = Some(template.object_path.clone());
            replicate_spawned_effect(level, entity)?;
        }
        F::Niagara => {
            let effect = required(factory, asset, AssetClass::NiagaraEffect)?;
            label_from_asset(level, entity, Some(effect));
            component_mut::<NiagaraComponent>(level, entity)?.effect = Some(effect.object_path.clone());
            replicate_spawned_effect(level, entity)?;
        }
        F::PhysicsAsset => {
            let physics = required(factory, asset, AssetClass::PhysicsAsset)?;
            label_from_asset(level, entity, Some(physics));
            let mesh = physics
                .tag(tags::PREVIEW_SKELETAL_MESH)
                .and_then(|path| registry.asset_by_object_path(path))
                .map(|mesh| mesh.object_path.clone());
            let play_in_editor = level.context().is_play_in_editor();
            {
                let component = component_mut::<SkeletalMeshComponent>(level, entity)?;
                component.mesh = mesh.clone();
                component.physics_asset_override = Some(physics.object_path.clone());
                component.kinematic_bones_update = KinematicBonesUpdate::SkipAllBones;
                component.simulate_physics = true;
                component.blend_physics = true;
            }
            let replication = component_mut::<ActorReplication>(level, entity)?;
            if play_in_editor {
                replication.replicated_mesh = mesh;
                replication.replicated_physics_asset = Some(physics.object_path.clone());
            }
            replication.always_relevant = true;
            replication.replicate_movement = true;
            replication.replicates = true;
        }
        F::SkeletalMesh | F::AnimationAsset => {
            let source = asset.ok_or_else(|| missing_asset(factory))?;
            let mesh = skeletal_mesh_from_asset(factory, source, registry)
                .ok_or_else(|| anyhow!("No skeletal mesh could be resolved from '{}'", source.object_path))?;
            // the label follows the resolved mesh, not the animation or blueprint
            label_from_asset(level, entity, Some(mesh));
            let game_world = level.context().is_game_world();
            {
                let component = component_mut::<SkeletalMeshComponent>(level, entity)?;
                component.mesh = Some(mesh.object_path.clone());
                if source.is_a(AssetClass::AnimBlueprint) {
                    let generated = source.tag(tags::GENERATED_CLASS).unwrap_or(&source.object_path);
                    component.anim_instance_class = Some(generated.to_string());
                }
                if factory == F::AnimationAsset {
                    component.animation_mode = AnimationMode::AnimationSingleNode;
                    if source.is_a(AssetClass::AnimationAsset) {
                        component.animation_to_play = Some(source.object_path.clone());
                    } else if source.is_a(AssetClass::VertexAnimation) {
                        component.vertex_animation_to_play = Some(source.object_path.clone());
                    }
                }
            }
            if game_world {
                component_mut::<ActorReplication>(level, entity)?.replicated_mesh = Some(mesh.object_path.clone());
            }
        }
        F::AmbientSound => {
            label_from_asset(level, entity, asset);
            if let Some(sound) = asset.filter(|asset| asset.is_a(AssetClass::SoundBase)) {
                component_mut::<AudioComponent>(level, entity)?.sound = Some(sound.object_path.clone());
            }
        }
        F::Destructible => {
            let mesh = required(factory, asset, AssetClass::DestructibleMesh)?;
            label_from_asset(level, entity, Some(mesh));
            component_mut::<DestructibleComponent>(level, entity)?.mesh = Some(mesh.object_path.clone());
        }
        F::VectorFieldVolume => {
            let field = required(factory, asset, AssetClass::VectorField)?;
            label_from_asset(level, entity, Some(field));
            component_mut::<VectorFieldComponent>(level, entity)?.field = Some(field.object_path.clone());
        }
        F::BoxVolume | F::SphereVolume | F::CylinderVolume => {
            label_from_asset(level, entity, asset);
            let builder = match factory {
                F::BoxVolume => BrushBuilder::Cube { x: 200.0, y: 200.0, z: 200.0 },
                F::SphereVolume => BrushBuilder::Sphere { radius: 192.0, sphere_extrapolation: 2 },
                _ => BrushBuilder::Cylinder { outer_radius: 128.0, z: 200.0, sides: 8 },
            };
            component_mut::<BrushComponent>(level, entity)?.builder = Some(builder);
        }
        _ => label_from_asset(level, entity, asset),
    }
    Ok(())
}

/// Skeletal mesh an asset resolves to: the mesh itself, an anim blueprint's or skeleton's preview
/// mesh, an animation's skeleton preview mesh, or a vertex animation's base mesh. Destructible
/// meshes never resolve for animation assets.
pub fn skeletal_mesh_from_asset<'a>(
    factory: ActorFactory,
    asset: &'a AssetData,
    registry: &'a dyn AssetRegistry,
) -> Option<&'a AssetData> {
    match factory {
        ActorFactory::SkeletalMesh => {
            if asset.is_a(AssetClass::SkeletalMesh) {
                Some(asset)
            } else if asset.is_a(AssetClass::AnimBlueprint) {
                let skeleton = registry.asset_by_object_path(asset.tag(tags::TARGET_SKELETON)?)?;
                skeleton_preview_mesh(skeleton, registry)
            } else if asset.is_a(AssetClass::Skeleton) {
                skeleton_preview_mesh(asset, registry)
            } else {
                None
            }
        }
        ActorFactory::AnimationAsset => {
            let mesh = if asset.is_a(AssetClass::AnimSequenceBase) {
                let skeleton = registry.asset_by_object_path(asset.tag(tags::SKELETON)?)?;
                skeleton_preview_mesh(skeleton, registry)
            } else if asset.is_a(AssetClass::VertexAnimation) {
                registry.asset_by_object_path(asset.tag(tags::BASE_SKEL_MESH)?)
            } else {
                None
            };
            mesh.filter(|mesh| !mesh.is_a(AssetClass::DestructibleMesh))
        }
        _ => None,
    }
}

fn label_from_asset(level: &mut Level, entity: Entity, asset: Option<&AssetData>) {
    if let Some(asset) = asset {
        if let Some(label) = level.set_actor_label_unique(entity, &asset.asset_name) {
            debug!(%label, "labelled actor from asset");
        }
    }
}

fn replicate_spawned_effect(level: &mut Level, entity: Entity) -> Result<()> {
    let context = level.context();
    if context.has_begun_play && !context.is_client() {
        let replication = component_mut::<ActorReplication>(level, entity)?;
        replication.replicates = true;
        replication.always_relevant = true;
        replication.net_update_frequency = SPAWNED_EFFECT_NET_UPDATE_FREQUENCY;
    }
    Ok(())
}

fn required(factory: ActorFactory, asset: Option<&AssetData>, class: AssetClass) -> Result<&AssetData> {
    let asset = asset.ok_or_else(|| missing_asset(factory))?;
    if !asset.is_a(class) {
        return Err(anyhow!(
            "{} factory expected a {:?} asset but '{}' is a {:?}",
            factory.display_name(),
            class,
            asset.object_path,
            asset.class
        ));
    }
    Ok(asset)
}

fn missing_asset(factory: ActorFactory) -> anyhow::Error {
    anyhow!("{} factory needs an asset to finish spawning", factory.display_name())
}

fn component_mut<T: Component>(level: &mut Level, entity: Entity) -> Result<&mut T> {
    level
        .world
        .get_mut::<T>(entity)
        .map(|component| component.into_inner())
        .ok_or_else(|| anyhow!("Spawned actor is missing {}", std::any::type_name::<T>()))
}
