use bevy_ecs::entity::Entity;
use glam::{Quat, Vec3};
use kestrel_placement::assets::{tags, AssetCatalog, AssetClass, AssetData, AssetRegistry};
use kestrel_placement::factory::{ActorFactory, CannotCreateActor, BASIC_SHAPE_MATERIAL};
use kestrel_placement::level::{
    ActorReplication, BrushBuilder, BrushComponent, DecalComponent, Level, NetMode, ParticleSystemComponent,
    SkeletalMeshComponent, StaticMeshComponent, Transform3D, WorldContext, WorldMode,
};

fn spawn(factory: ActorFactory, asset: Option<&AssetData>, catalog: &AssetCatalog, level: &mut Level) -> Entity {
    let transform = Transform3D::from_translation_rotation(Vec3::ZERO, Quat::IDENTITY);
    factory
        .create_actor(asset, catalog, level, transform, None)
        .expect("create actor")
        .expect("factory spawned an actor")
}

#[test]
fn decal_accepts_instances_of_deferred_decal_materials() {
    let mut catalog = AssetCatalog::new();
    catalog.insert(
        AssetData::new("/Game/Decals/M_Decal.M_Decal", AssetClass::Material)
            .with_tag(tags::MATERIAL_DOMAIN, "MD_DeferredDecal"),
    );
    catalog.insert(
        AssetData::new("/Game/Decals/MI_Puddle.MI_Puddle", AssetClass::MaterialInstanceConstant)
            .with_tag(tags::PARENT, "/Game/Decals/M_Decal.M_Decal"),
    );
    catalog.insert(
        AssetData::new("/Game/M_Wall.M_Wall", AssetClass::Material).with_tag(tags::MATERIAL_DOMAIN, "MD_Surface"),
    );

    let puddle = catalog.asset_by_object_path("/Game/Decals/MI_Puddle.MI_Puddle").cloned().expect("puddle");
    let wall = catalog.asset_by_object_path("/Game/M_Wall.M_Wall").cloned().expect("wall");
    assert!(ActorFactory::DeferredDecal.can_create_actor_from(Some(&puddle), &catalog).is_ok());
    assert_eq!(
        ActorFactory::DeferredDecal.can_create_actor_from(Some(&wall), &catalog),
        Err(CannotCreateActor::NotDecalMaterial)
    );

    let mut level = Level::new();
    let entity = spawn(ActorFactory::DeferredDecal, Some(&puddle), &catalog, &mut level);
    let decal = level.world.get::<DecalComponent>(entity).expect("decal component");
    assert_eq!(decal.material.as_deref(), Some("/Game/Decals/MI_Puddle.MI_Puddle"));
    assert_eq!(level.actor_info(entity).expect("info").label, "MI_Puddle");
}

#[test]
fn basic_shapes_get_the_shape_material_and_unique_labels() {
    let mut catalog = AssetCatalog::new();
    let cube = AssetData::new("/Engine/BasicShapes/Cube.Cube", AssetClass::StaticMesh);
    catalog.insert(cube.clone());

    let mut level = Level::new();
    let first = spawn(ActorFactory::BasicShape, Some(&cube), &catalog, &mut level);
    let second = spawn(ActorFactory::BasicShape, Some(&cube), &catalog, &mut level);
    assert_eq!(level.actor_info(first).expect("first").label, "Cube");
    assert_eq!(level.actor_info(second).expect("second").label, "Cube2");

    let mesh = level.world.get::<StaticMeshComponent>(second).expect("mesh component");
    assert_eq!(mesh.mesh.as_deref(), Some("/Engine/BasicShapes/Cube.Cube"));
    assert_eq!(mesh.material(0), Some(BASIC_SHAPE_MATERIAL));
    let source = ActorFactory::StaticMesh.asset_from_actor_instance(&level, second);
    assert_eq!(source.as_deref(), Some("/Engine/BasicShapes/Cube.Cube"));
}

#[test]
fn emitters_replicate_only_on_servers_during_play() {
    let mut catalog = AssetCatalog::new();
    let sparks = AssetData::new("/Game/FX/P_Sparks.P_Sparks", AssetClass::ParticleSystem);
    catalog.insert(sparks.clone());

    let server = WorldContext { mode: WorldMode::Game, net_mode: NetMode::ListenServer, has_begun_play: true };
    let mut level = Level::with_context(server);
    let entity = spawn(ActorFactory::Emitter, Some(&sparks), &catalog, &mut level);
    let replication = level.world.get::<ActorReplication>(entity).expect("replication");
    assert!(replication.replicates);
    assert!((replication.net_update_frequency - 0.1).abs() < f32::EPSILON);
    let template = &level.world.get::<ParticleSystemComponent>(entity).expect("particles").template;
    assert_eq!(template.as_deref(), Some("/Game/FX/P_Sparks.P_Sparks"));

    let client = WorldContext { mode: WorldMode::Game, net_mode: NetMode::Client, has_begun_play: true };
    let mut level = Level::with_context(client);
    let entity = spawn(ActorFactory::Emitter, Some(&sparks), &catalog, &mut level);
    assert_eq!(level.world.get::<ActorReplication>(entity), Some(&ActorReplication::default()));
}

#[test]
fn volumes_carry_their_brush_builders() {
    let catalog = AssetCatalog::new();
    let mut level = Level::new();
    let cases = [
        (ActorFactory::BoxVolume, BrushBuilder::Cube { x: 200.0, y: 200.0, z: 200.0 }),
        (ActorFactory::SphereVolume, BrushBuilder::Sphere { radius: 192.0, sphere_extrapolation: 2 }),
        (ActorFactory::CylinderVolume, BrushBuilder::Cylinder { outer_radius: 128.0, z: 200.0, sides: 8 }),
    ];
    for (factory, expected) in cases {
        let entity = spawn(factory, None, &catalog, &mut level);
        let brush = level.world.get::<BrushComponent>(entity).expect("brush");
        assert_eq!(brush.builder, Some(expected), "{factory}");
    }
    assert_eq!(level.actor_count(), 3);
}

#[test]
fn anim_blueprints_spawn_their_skeleton_preview_mesh() {
    let mut catalog = AssetCatalog::new();
    catalog.insert(AssetData::new("/Game/Hero/SK_Hero.SK_Hero", AssetClass::SkeletalMesh));
    catalog.insert(
        AssetData::new("/Game/Hero/SKEL_Hero.SKEL_Hero", AssetClass::Skeleton)
            .with_tag(tags::PREVIEW_SKELETAL_MESH, "/Game/Hero/SK_Hero.SK_Hero"),
    );
    let blueprint = AssetData::new("/Game/Hero/ABP_Hero.ABP_Hero", AssetClass::AnimBlueprint)
        .with_tag(tags::TARGET_SKELETON, "/Game/Hero/SKEL_Hero.SKEL_Hero")
        .with_tag(tags::GENERATED_CLASS, "/Game/Hero/ABP_Hero.ABP_Hero_C");
    catalog.insert(blueprint.clone());

    assert_eq!(ActorFactory::find_for_asset(&blueprint, &catalog), Some(ActorFactory::SkeletalMesh));

    let game = WorldContext { mode: WorldMode::Game, ..WorldContext::default() };
    let mut level = Level::with_context(game);
    let entity = spawn(ActorFactory::SkeletalMesh, Some(&blueprint), &catalog, &mut level);
    let component = level.world.get::<SkeletalMeshComponent>(entity).expect("skeletal mesh");
    assert_eq!(component.mesh.as_deref(), Some("/Game/Hero/SK_Hero.SK_Hero"));
    assert_eq!(component.anim_instance_class.as_deref(), Some("/Game/Hero/ABP_Hero.ABP_Hero_C"));
    let replication = level.world.get::<ActorReplication>(entity).expect("replication");
    assert_eq!(replication.replicated_mesh.as_deref(), Some("/Game/Hero/SK_Hero.SK_Hero"));
    assert_eq!(level.actor_info(entity).expect("info").label, "SK_Hero");
}

#[test]
fn failed_post_spawn_leaves_the_level_untouched() {
    let catalog = AssetCatalog::new();
    let mut level = Level::new();
    let transform = Transform3D::from_translation_rotation(Vec3::ZERO, Quat::IDENTITY);

    let err = ActorFactory::StaticMesh
        .create_actor(None, &catalog, &mut level, transform, Some("Crate"))
        .expect_err("a mesh actor needs its asset");
    assert!(err.to_string().contains("needs an asset"), "{err:#}");
    assert_eq!(level.actor_count(), 0);
    assert!(level.find_by_name("Crate").is_none());

    let entity = ActorFactory::PlayerStart
        .create_actor(None, &catalog, &mut level, transform, Some("Crate"))
        .expect("create player start")
        .expect("player start spawned");
    assert_eq!(level.find_by_name("Crate"), Some(entity));
    assert_eq!(level.actor_count(), 1);
}
