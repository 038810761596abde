use anyhow::{anyhow, Context, Result};
use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assets::AssetRegistry;
use crate::config::PlacementConfig;
use crate::factory::ActorFactory;
use crate::level::{Level, Transform3D};
use crate::scene::PlacementRequestData;

/// One asset (or bare factory) dropped at a surface hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PlacementRequestData", into = "PlacementRequestData")]
pub struct PlacementRequest {
    pub factory: Option<ActorFactory>,
    pub asset: Option<String>,
    pub location: Vec3,
    pub surface_normal: Vec3,
    pub base_rotation: Quat,
    pub name: Option<String>,
}

impl PlacementRequest {
    pub fn new(location: Vec3) -> Self {
        Self {
            factory: None,
            asset: None,
            location,
            surface_normal: Vec3::Z,
            base_rotation: Quat::IDENTITY,
            name: None,
        }
    }

    pub fn with_asset(mut self, object_path: impl Into<String>) -> Self {
        self.asset = Some(object_path.into());
        self
    }

    pub fn with_factory(mut self, factory: ActorFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn with_surface_normal(mut self, normal: Vec3) -> Self {
        self.surface_normal = normal;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.base_rotation = rotation;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl From<PlacementRequestData> for PlacementRequest {
    fn from(data: PlacementRequestData) -> Self {
        Self {
            factory: data.factory,
            asset: data.asset,
            location: data.location.into(),
            surface_normal: data.surface_normal.into(),
            base_rotation: data.base_rotation.into(),
            name: data.name,
        }
    }
}

impl From<PlacementRequest> for PlacementRequestData {
    fn from(request: PlacementRequest) -> Self {
        Self {
            factory: request.factory,
            asset: request.asset,
            location: request.location.into(),
            surface_normal: request.surface_normal.into(),
            base_rotation: request.base_rotation.into(),
            name: request.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementOutcome {
    Placed { entity: Entity, label: String },
    Skipped { reason: String },
}

#[derive(Debug, Clone, Copy)]
pub struct ActorPlacer {
    align_to_surface: bool,
    apply_spawn_offset: bool,
}

impl ActorPlacer {
    pub fn new(config: &PlacementConfig) -> Self {
        Self { align_to_surface: config.align_to_surface, apply_spawn_offset: config.apply_spawn_offset }
    }

    /// Rotation and location the factory's actor would be spawned with for this request.
    ///
    /// Surface-facing actors look into the surface along +X, so the spawn offset is backed out of
    /// that facing to leave them in front of the surface.
    pub fn spawn_transform(&self, factory: ActorFactory, request: &PlacementRequest) -> Transform3D {
        let rotation = if self.align_to_surface && factory.use_surface_orientation() {
            factory.align_object_to_surface_normal(request.surface_normal, request.base_rotation)
        } else {
            request.base_rotation
        };
        let offset = if self.apply_spawn_offset { rotation * factory.spawn_position_offset() } else { Vec3::ZERO };
        Transform3D::from_translation_rotation(request.location - offset, rotation)
    }

    pub fn place(
        &self,
        level: &mut Level,
        registry: &dyn AssetRegistry,
        request: &PlacementRequest,
    ) -> Result<PlacementOutcome> {
        let asset = match request.asset.as_deref() {
            Some(path) => Some(
                registry.asset_by_object_path(path).ok_or_else(|| anyhow!("Asset '{path}' is not in the registry"))?,
            ),
            None => None,
        };
        let factory = match (request.factory, asset) {
            (Some(factory), _) => factory,
            (None, Some(asset)) => ActorFactory::find_for_asset(asset, registry)
                .ok_or_else(|| anyhow!("No actor factory accepts '{}'", asset.object_path))?,
            (None, None) => return Err(anyhow!("A placement request needs an asset or a factory")),
        };
        factory
            .can_create_actor_from(asset, registry)
            .with_context(|| format!("{factory} factory rejected the placement"))?;

        let transform = self.spawn_transform(factory, request);
        let spawned = factory.create_actor(asset, registry, level, transform, request.name.as_deref())?;
        let Some(entity) = spawned else {
            return Ok(PlacementOutcome::Skipped { reason: format!("{factory} factory declined to spawn") });
        };
        let label = level.actor_info(entity).map(|info| info.label.clone()).unwrap_or_default();
        info!(%label, %factory, location = ?transform.translation, "placed actor");
        Ok(PlacementOutcome::Placed { entity, label })
    }

    pub fn place_batch(
        &self,
        level: &mut Level,
        registry: &dyn AssetRegistry,
        requests: &[PlacementRequest],
    ) -> Vec<Result<PlacementOutcome>> {
        requests
            .iter()
            .enumerate()
            .map(|(index, request)| {
                let outcome = self.place(level, registry, request);
                match &outcome {
                    Ok(PlacementOutcome::Skipped { reason }) => warn!(index, %reason, "placement skipped"),
                    Err(err) => warn!(index, "placement failed: {err:#}"),
                    Ok(PlacementOutcome::Placed { .. }) => {}
                }
                outcome
            })
            .collect()
    }
}
