use glam::{Quat, Vec3};
use kestrel_placement::assets::{tags, AssetCatalog, AssetClass, AssetData};
use kestrel_placement::config::PlacementConfig;
use kestrel_placement::level::{Level, NetMode, SkeletalMeshComponent, WorldMode};
use kestrel_placement::placement::{ActorPlacer, PlacementOutcome, PlacementRequest};
use kestrel_placement::scene::{LevelSummary, PlacementBatch};

const CATALOG: &str = r#"{
    "assets": [
        { "object_path": "/Game/Props/SM_Crate.SM_Crate", "class": "StaticMesh" },
        { "object_path": "/Engine/BasicShapes/Sphere.Sphere", "class": "StaticMesh" },
        { "object_path": "/Game/Audio/S_Wind.S_Wind", "class": "SoundWave" },
        { "object_path": "/Game/T_Noise.T_Noise", "class": "Texture" }
    ]
}"#;

const BATCH: &str = r#"{
    "context": { "mode": "PlayInEditor", "net_mode": "ListenServer", "has_begun_play": true },
    "requests": [
        { "asset": "/Game/Props/SM_Crate.SM_Crate", "location": { "x": 100, "y": 0, "z": 0 },
          "surface_normal": { "x": 1, "y": 0, "z": 0 } },
        { "asset": "/Game/Props/SM_Crate.SM_Crate", "location": { "x": 0, "y": 0, "z": 0 } },
        { "asset": "/Engine/BasicShapes/Sphere.Sphere", "location": { "x": 0, "y": 200, "z": 0 } },
        { "factory": "point_light", "location": { "x": 0, "y": 0, "z": 300 },
          "surface_normal": { "x": 0, "y": 0, "z": -1 }, "name": "KeyLight" },
        { "asset": "/Game/T_Noise.T_Noise", "location": { "x": 0, "y": 0, "z": 0 } },
        { "asset": "/Game/Audio/S_Wind.S_Wind", "location": { "x": 5, "y": 5, "z": 5 } }
    ]
}"#;

#[test]
fn batch_places_actors_and_round_trips_the_summary() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let batch_path = temp_dir.path().join("drops.json");
    std::fs::write(&batch_path, BATCH).expect("write batch");

    let catalog = AssetCatalog::from_json_str(CATALOG).expect("parse catalog");
    let batch = PlacementBatch::load_from_path(&batch_path).expect("load batch");
    assert_eq!(batch.context.mode, WorldMode::PlayInEditor);
    assert_eq!(batch.context.net_mode, NetMode::ListenServer);

    let mut level = Level::with_context(batch.context);
    let placer = ActorPlacer::new(&PlacementConfig::default());
    let outcomes = placer.place_batch(&mut level, &catalog, &batch.requests);
    assert_eq!(outcomes.len(), 6);

    let labels: Vec<Option<String>> = outcomes
        .iter()
        .map(|outcome| match outcome {
            Ok(PlacementOutcome::Placed { label, .. }) => Some(label.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        labels,
        vec![
            Some("SM_Crate".to_string()),
            Some("SM_Crate2".to_string()),
            Some("Sphere".to_string()),
            Some("KeyLight".to_string()),
            None,
            Some("S_Wind".to_string()),
        ]
    );
    let texture_error = outcomes[4].as_ref().expect_err("textures have no factory");
    assert!(texture_error.to_string().contains("No actor factory accepts"), "{texture_error:#}");

    let wall_crate = level.find_by_label("SM_Crate").expect("wall crate");
    let rotation = level.transform(wall_crate).expect("transform").rotation;
    assert!((rotation * Vec3::Z).distance(Vec3::X) < 1e-4, "crate should stand on the wall");

    let light = level.find_by_name("KeyLight").expect("light by name");
    let light_transform = level.transform(light).expect("light transform");
    assert!(light_transform.translation.distance(Vec3::new(0.0, 0.0, 250.0)) < 1e-3);

    let summary_path = temp_dir.path().join("out").join("level.json");
    LevelSummary::capture(&level).save_to_path(&summary_path).expect("save summary");
    let loaded = LevelSummary::load_from_path(&summary_path).expect("load summary");
    assert_eq!(loaded.context, batch.context);
    assert_eq!(loaded.actors.len(), 5);
    let sound = loaded.actors.iter().find(|actor| actor.label == "S_Wind").expect("sound summary");
    assert_eq!(sound.class, "/Script/Engine.AmbientSound");
    let (translation, rotation, scale) = sound.transform.components();
    assert_eq!(translation, Vec3::splat(5.0));
    assert!(rotation.dot(Quat::IDENTITY).abs() > 1.0 - 1e-5);
    assert_eq!(scale, Vec3::ONE);
}

#[test]
fn disabling_alignment_keeps_request_rotation() {
    let catalog = AssetCatalog::from_json_str(CATALOG).expect("parse catalog");
    let config = PlacementConfig { align_to_surface: false, apply_spawn_offset: true };
    let placer = ActorPlacer::new(&config);
    let batch: PlacementBatch = serde_json::from_str(BATCH).expect("parse batch");
    let mut level = Level::new();

    let outcome = placer.place(&mut level, &catalog, &batch.requests[0]).expect("place crate");
    let PlacementOutcome::Placed { entity, .. } = outcome else {
        panic!("crate should be placed, got {outcome:?}");
    };
    assert_eq!(level.transform(entity).expect("transform").rotation, Quat::IDENTITY);
}

#[test]
fn animations_stand_on_the_wall_like_their_mesh() {
    let mut catalog = AssetCatalog::new();
    catalog.insert(AssetData::new("/Game/Hero/SK_Hero.SK_Hero", AssetClass::SkeletalMesh));
    catalog.insert(
        AssetData::new("/Game/Hero/SKEL_Hero.SKEL_Hero", AssetClass::Skeleton)
            .with_tag(tags::PREVIEW_SKELETAL_MESH, "/Game/Hero/SK_Hero.SK_Hero"),
    );
    catalog.insert(
        AssetData::new("/Game/Hero/A_Climb.A_Climb", AssetClass::AnimSequence)
            .with_tag(tags::SKELETON, "/Game/Hero/SKEL_Hero.SKEL_Hero"),
    );

    let placer = ActorPlacer::new(&PlacementConfig::default());
    let mut level = Level::new();
    for asset in ["/Game/Hero/A_Climb.A_Climb", "/Game/Hero/SK_Hero.SK_Hero"] {
        let request =
            PlacementRequest::new(Vec3::new(400.0, 0.0, 120.0)).with_asset(asset).with_surface_normal(Vec3::X);
        let outcome = placer.place(&mut level, &catalog, &request).expect("place on wall");
        let PlacementOutcome::Placed { entity, .. } = outcome else {
            panic!("{asset} should be placed, got {outcome:?}");
        };
        let rotation = level.transform(entity).expect("transform").rotation;
        assert!((rotation * Vec3::Z).distance(Vec3::X) < 1e-4, "{asset} should stand on the wall");
    }

    let climber = level.find_by_label("SK_Hero").expect("animated actor");
    let component = level.world.get::<SkeletalMeshComponent>(climber).expect("skeletal mesh");
    assert_eq!(component.animation_to_play.as_deref(), Some("/Game/Hero/A_Climb.A_Climb"));
}
