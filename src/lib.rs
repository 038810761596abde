pub mod alignment;
pub mod assets;
pub mod cli;
pub mod config;
pub mod factory;
pub mod level;
pub mod material_instance;
pub mod material_registry;
pub mod placement;
pub mod scene;
pub mod transaction;

pub use alignment::{find_actor_alignment_rotation, SurfaceAlignment};
pub use assets::{AssetCatalog, AssetClass, AssetData, AssetRegistry};
pub use factory::{ActorFactory, CannotCreateActor};
pub use level::Level;
pub use material_instance::{MaterialInstanceEditor, ParameterEditError};
pub use material_registry::{MaterialRegistry, ParameterValue};
pub use placement::{ActorPlacer, PlacementOutcome, PlacementRequest};
