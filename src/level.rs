pub mod components;

pub use components::*;

use anyhow::{bail, Result};
use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::scene::Transform3DData;

/// Object names and editor labels in use, each mapped to its actor.
#[derive(Resource, Default, Debug)]
pub struct LabelIndex {
    names: HashMap<String, Entity>,
    labels: HashMap<String, Entity>,
    name_counters: HashMap<String, u32>,
}

impl LabelIndex {
    fn label_free_for(&self, label: &str, entity: Entity) -> bool {
        self.labels.get(label).map_or(true, |owner| *owner == entity)
    }

    fn next_object_name(&mut self, class_name: &str) -> String {
        let counter = self.name_counters.entry(class_name.to_string()).or_insert(0);
        loop {
            let candidate = format!("{class_name}_{counter}");
            *counter += 1;
            if !self.names.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSummary {
    pub name: String,
    pub label: String,
    pub class: String,
    pub transform: Transform3DData,
}

pub struct Level {
    pub world: World,
}

impl Default for Level {
    fn default() -> Self {
        Self::new()
    }
}

impl Level {
    pub fn new() -> Self {
        Self::with_context(WorldContext::default())
    }

    pub fn with_context(context: WorldContext) -> Self {
        let mut world = World::new();
        world.insert_resource(context);
        world.insert_resource(LabelIndex::default());
        Self { world }
    }

    pub fn context(&self) -> WorldContext {
        self.world.get_resource::<WorldContext>().copied().unwrap_or_default()
    }

    pub fn set_world_context(&mut self, context: WorldContext) {
        self.world.insert_resource(context);
    }

    /// Spawns an actor of `class` with the components its class constructs by default.
    pub fn spawn_actor(
        &mut self,
        class: &ActorClass,
        translation: Vec3,
        rotation: Quat,
        name: Option<&str>,
    ) -> Result<Entity> {
        let name = {
            let mut index = self.world.resource_mut::<LabelIndex>();
            match name.map(str::trim).filter(|requested| !requested.is_empty()) {
                Some(requested) if index.names.contains_key(requested) => {
                    bail!("An actor named '{requested}' already exists in the level")
                }
                Some(requested) => requested.to_string(),
                None => index.next_object_name(class.class_name()),
            }
        };

        let transform = Transform3D::from_translation_rotation(translation, rotation.normalize());
        let info = ActorInfo { class: class.clone(), name: name.clone(), label: name.clone() };
        let mut entity = self.world.spawn((transform, info, ActorReplication::default()));
        match class {
            ActorClass::StaticMeshActor => {
                entity.insert(StaticMeshComponent::default());
            }
            ActorClass::SkeletalMeshActor => {
                entity.insert(SkeletalMeshComponent::default());
            }
            ActorClass::DestructibleActor => {
                entity.insert(DestructibleComponent::default());
            }
            ActorClass::DecalActor => {
                entity.insert(DecalComponent::default());
            }
            ActorClass::Emitter => {
                entity.insert(ParticleSystemComponent::default());
            }
            ActorClass::NiagaraActor => {
                entity.insert(NiagaraComponent::default());
            }
            ActorClass::AmbientSound => {
                entity.insert(AudioComponent::default());
            }
            ActorClass::Volume => {
                entity.insert(BrushComponent::default());
            }
            ActorClass::VectorFieldVolume => {
                entity.insert(VectorFieldComponent::default());
            }
            ActorClass::LevelSequenceActor => {
                entity.insert(SequencePlayer::default());
            }
            _ => {}
        }
        let id = entity.id();

        let mut index = self.world.resource_mut::<LabelIndex>();
        index.names.insert(name.clone(), id);
        index.labels.insert(name.clone(), id);
        debug!(actor = %name, class = %class.class_name(), "spawned actor");
        Ok(id)
    }

    pub fn despawn_actor(&mut self, entity: Entity) -> bool {
        let Some(info) = self.world.get::<ActorInfo>(entity).cloned() else {
            return false;
        };
        {
            let mut index = self.world.resource_mut::<LabelIndex>();
            index.names.remove(&info.name);
            if index.labels.get(&info.label) == Some(&entity) {
                index.labels.remove(&info.label);
            }
        }
        self.world.despawn(entity)
    }

    /// Labels the actor with `base`, or `base` with a numeric suffix when another actor already
    /// uses it (`Cube`, `Cube2`, `Cube3`...). Trailing digits on `base` are replaced, not extended.
    pub fn set_actor_label_unique(&mut self, entity: Entity, base: &str) -> Option<String> {
        let base = base.trim();
        if base.is_empty() {
            return None;
        }
        let previous = self.world.get::<ActorInfo>(entity)?.label.clone();

        let label = {
            let index = self.world.resource::<LabelIndex>();
            if index.label_free_for(base, entity) {
                base.to_string()
            } else {
                let stem = base.trim_end_matches(|c: char| c.is_ascii_digit());
                let stem = if stem.is_empty() { base } else { stem };
                let mut suffix = 2u32;
                loop {
                    let candidate = format!("{stem}{suffix}");
                    if index.label_free_for(&candidate, entity) {
                        break candidate;
                    }
                    suffix += 1;
                }
            }
        };

        {
            let mut index = self.world.resource_mut::<LabelIndex>();
            if index.labels.get(&previous) == Some(&entity) {
                index.labels.remove(&previous);
            }
            index.labels.insert(label.clone(), entity);
        }
        if let Some(mut info) = self.world.get_mut::<ActorInfo>(entity) {
            info.label = label.clone();
        }
        Some(label)
    }

    pub fn actor_info(&self, entity: Entity) -> Option<&ActorInfo> {
        self.world.get::<ActorInfo>(entity)
    }

    pub fn transform(&self, entity: Entity) -> Option<&Transform3D> {
        self.world.get::<Transform3D>(entity)
    }

    pub fn find_by_label(&self, label: &str) -> Option<Entity> {
        self.world.resource::<LabelIndex>().labels.get(label).copied()
    }

    pub fn find_by_name(&self, name: &str) -> Option<Entity> {
        self.world.resource::<LabelIndex>().names.get(name).copied()
    }

    pub fn actor_count(&self) -> usize {
        self.world.resource::<LabelIndex>().names.len()
    }

    /// Summary of every actor, ordered by object name.
    pub fn actors(&self) -> Vec<ActorSummary> {
        let index = self.world.resource::<LabelIndex>();
        let mut summaries: Vec<ActorSummary> = index
            .names
            .values()
            .filter_map(|entity| {
                let info = self.world.get::<ActorInfo>(*entity)?;
                let transform = self.world.get::<Transform3D>(*entity).copied().unwrap_or_default();
                Some(ActorSummary {
                    name: info.name.clone(),
                    label: info.label.clone(),
                    class: info.class.path(),
                    transform: Transform3DData::from_components(
                        transform.translation,
                        transform.rotation,
                        transform.scale,
                    ),
                })
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_names_count_per_class() {
        let mut level = Level::new();
        let a = level.spawn_actor(&ActorClass::PointLight, Vec3::ZERO, Quat::IDENTITY, None).expect("spawn a");
        let b = level.spawn_actor(&ActorClass::PointLight, Vec3::ZERO, Quat::IDENTITY, None).expect("spawn b");
        let c = level.spawn_actor(&ActorClass::Note, Vec3::ZERO, Quat::IDENTITY, None).expect("spawn c");
        assert_eq!(level.actor_info(a).map(|i| i.name.as_str()), Some("PointLight_0"));
        assert_eq!(level.actor_info(b).map(|i| i.name.as_str()), Some("PointLight_1"));
        assert_eq!(level.actor_info(c).map(|i| i.name.as_str()), Some("Note_0"));
        assert_eq!(level.actor_count(), 3);
    }

    #[test]
    fn explicit_duplicate_names_are_rejected() {
        let mut level = Level::new();
        level.spawn_actor(&ActorClass::Actor, Vec3::ZERO, Quat::IDENTITY, Some("Hero")).expect("first");
        let err = level
            .spawn_actor(&ActorClass::Actor, Vec3::ZERO, Quat::IDENTITY, Some("Hero"))
            .expect_err("duplicate");
        assert!(err.to_string().contains("Hero"));
        assert!(level.spawn_actor(&ActorClass::Actor, Vec3::ZERO, Quat::IDENTITY, Some(" Hero ")).is_err());
    }

    #[test]
    fn requested_names_are_trimmed() {
        let mut level = Level::new();
        let entity =
            level.spawn_actor(&ActorClass::Actor, Vec3::ZERO, Quat::IDENTITY, Some("  Hero\t")).expect("spawn");
        assert_eq!(level.actor_info(entity).map(|i| i.name.as_str()), Some("Hero"));
        assert_eq!(level.find_by_name("Hero"), Some(entity));
        let blank = level.spawn_actor(&ActorClass::Actor, Vec3::ZERO, Quat::IDENTITY, Some("   ")).expect("blank");
        assert_eq!(level.actor_info(blank).map(|i| i.name.as_str()), Some("Actor_0"));
    }

    #[test]
    fn labels_get_numeric_suffixes() {
        let mut level = Level::new();
        let mut labels = Vec::new();
        for _ in 0..3 {
            let entity =
                level.spawn_actor(&ActorClass::StaticMeshActor, Vec3::ZERO, Quat::IDENTITY, None).expect("spawn");
            labels.push(level.set_actor_label_unique(entity, "Cube").expect("label"));
        }
        assert_eq!(labels, vec!["Cube", "Cube2", "Cube3"]);
        assert!(level.find_by_label("Cube2").is_some());
    }

    #[test]
    fn relabelling_with_own_label_keeps_it() {
        let mut level = Level::new();
        let entity = level.spawn_actor(&ActorClass::Actor, Vec3::ZERO, Quat::IDENTITY, None).expect("spawn");
        assert_eq!(level.set_actor_label_unique(entity, "Rock").as_deref(), Some("Rock"));
        assert_eq!(level.set_actor_label_unique(entity, "Rock").as_deref(), Some("Rock"));
        assert_eq!(level.find_by_label("Actor_0"), None);
    }

    #[test]
    fn despawn_releases_name_and_label() {
        let mut level = Level::new();
        let entity = level.spawn_actor(&ActorClass::Actor, Vec3::ZERO, Quat::IDENTITY, Some("Temp")).expect("spawn");
        assert!(level.despawn_actor(entity));
        assert_eq!(level.actor_count(), 0);
        assert!(level.find_by_label("Temp").is_none());
        assert!(!level.despawn_actor(entity));
        level.spawn_actor(&ActorClass::Actor, Vec3::ZERO, Quat::IDENTITY, Some("Temp")).expect("respawn");
    }

    #[test]
    fn native_classes_get_their_default_components() {
        let mut level = Level::new();
        let mesh =
            level.spawn_actor(&ActorClass::StaticMeshActor, Vec3::ZERO, Quat::IDENTITY, None).expect("mesh");
        let volume = level.spawn_actor(&ActorClass::Volume, Vec3::ZERO, Quat::IDENTITY, None).expect("volume");
        assert!(level.world.get::<StaticMeshComponent>(mesh).is_some());
        assert!(level.world.get::<BrushComponent>(volume).is_some());
        assert!(level.world.get::<StaticMeshComponent>(volume).is_none());
    }
}
