pub mod agent;
pub mod common;
pub mod faction;
pub mod item;
pub mod location;
pub mod scene;
pub mod structure;

pub use agent::AgentCore;
pub use common::{
    Agent, Faction, IsPlayer, ItemMarker, Location, Scene, SceneParent, SimEntity, Structure,
};
pub use faction::FactionCore;
pub use item::{ItemState, RATION_KIND, SILVER_KIND};
pub use location::{LocationLifecycle, LocationState, SceneParentState};
pub use scene::SceneState;
pub use structure::{StructureKind, StructureState};
