use std::error::Error;
use std::fmt;

use bevy_ecs::entity::Entity;
use bevy_ecs::resource::Resource;
use bevy_ecs::world::World;

use crate::IdGenerator;

use super::components::{
    Agent, AgentCore, ItemMarker, ItemState, Scene, SceneState, SimEntity, Structure,
    StructureState,
};
use super::relationships::{LocatedIn, LocatedInSources};
use super::resources::SimEntityMap;

/// Scene generation could not complete. The cache rolls back any partial
/// session entries and the location stays unvisited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationError {
    pub location: u64,
    pub message: String,
}

impl GenerationError {
    pub fn new(location: u64, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scene generation failed for location {}: {}",
            self.location, self.message
        )
    }
}

impl Error for GenerationError {}

/// World access handed to the generator: the ECS world plus the id
/// machinery needed to register whatever it spawns.
pub struct SceneContext<'a> {
    pub world: &'a mut World,
    pub ids: &'a mut IdGenerator,
    pub map: &'a mut SimEntityMap,
}

impl SceneContext<'_> {
    /// Spawn a bare scene entity and register its stable id.
    pub fn spawn_scene(&mut self, location: u64, size: i32) -> u64 {
        let id = self.ids.next_id();
        let entity = self
            .world
            .spawn((
                SimEntity {
                    id,
                    name: format!("scene-{location}"),
                },
                Scene,
                SceneState::new(location, size),
            ))
            .id();
        self.map.insert(id, entity);
        id
    }

    /// Spawn an item stack into a scene. Panics if the scene id is not
    /// registered; generators only place into scenes they created.
    pub fn spawn_item(&mut self, scene: u64, item: ItemState) -> u64 {
        let scene_entity = self.map.bevy(scene);
        let id = self.ids.next_id();
        let entity = self
            .world
            .spawn((
                SimEntity {
                    id,
                    name: format!("{}-{id}", item.kind),
                },
                ItemMarker,
                item,
                LocatedIn(scene_entity),
            ))
            .id();
        self.map.insert(id, entity);
        id
    }

    /// Spawn a structure into a scene.
    pub fn spawn_structure(&mut self, scene: u64, structure: StructureState) -> u64 {
        let scene_entity = self.map.bevy(scene);
        let id = self.ids.next_id();
        let entity = self
            .world
            .spawn((
                SimEntity {
                    id,
                    name: format!("structure-{id}"),
                },
                Structure,
                structure,
                LocatedIn(scene_entity),
            ))
            .id();
        self.map.insert(id, entity);
        id
    }

    /// Record a numbered room's floor extent on a scene. Entry clears fog
    /// over every recorded room cell.
    pub fn mark_room(
        &mut self,
        scene: u64,
        room: u32,
        cells: impl IntoIterator<Item = (i32, i32)>,
    ) {
        let scene_entity = self.map.bevy(scene);
        if let Some(mut state) = self.world.get_mut::<SceneState>(scene_entity) {
            state.mark_room(room, cells);
        }
    }

    /// Spawn an agent into a scene.
    pub fn spawn_agent(&mut self, scene: u64, name: &str, core: AgentCore) -> u64 {
        let scene_entity = self.map.bevy(scene);
        let id = self.ids.next_id();
        let entity = self
            .world
            .spawn((
                SimEntity {
                    id,
                    name: name.to_string(),
                },
                Agent,
                core,
                LocatedIn(scene_entity),
            ))
            .id();
        self.map.insert(id, entity);
        id
    }

    /// Despawn a scene and everything located in it, unregistering every
    /// stable id. Tolerates a scene that is already gone.
    pub fn despawn_scene(&mut self, scene: u64) {
        let Some(scene_entity) = self.map.get_bevy(scene) else {
            return;
        };
        let members: Vec<Entity> = self
            .world
            .get::<LocatedInSources>(scene_entity)
            .map(|sources| sources.to_vec())
            .unwrap_or_default();
        for member in members {
            if let Some(id) = self.map.get_sim(member) {
                self.map.remove(id);
            }
            self.world.despawn(member);
        }
        self.map.remove(scene);
        self.world.despawn(scene_entity);
    }
}

/// The external scene-generation collaborator.
///
/// `generate` builds a live scene for a location and returns its stable id;
/// the actual procedure (terrain, spawn placement) belongs to the host —
/// this crate only drives the seam. `deinit` discards a scene at teardown.
/// `can_reach` answers drop-spot reachability for the resupply cadence.
pub trait SceneGenerator: Send + Sync {
    fn generate(&self, ctx: &mut SceneContext<'_>, location: u64)
    -> Result<u64, GenerationError>;

    fn deinit(&self, ctx: &mut SceneContext<'_>, scene: u64);

    fn can_reach(&self, world: &World, map: &SimEntityMap, agent: u64, cell: (i32, i32)) -> bool;
}

/// Resource wrapping the installed generator.
#[derive(Resource)]
pub struct SceneServices {
    pub generator: Box<dyn SceneGenerator>,
}

impl Default for SceneServices {
    fn default() -> Self {
        Self {
            generator: Box::new(EmptyLotGenerator::default()),
        }
    }
}

/// Default generator: a bare fogged lot with nothing in it. Hosts install
/// their real generator; tests install a scripted one.
#[derive(Debug, Clone)]
pub struct EmptyLotGenerator {
    pub size: i32,
}

impl Default for EmptyLotGenerator {
    fn default() -> Self {
        Self { size: 33 }
    }
}

impl SceneGenerator for EmptyLotGenerator {
    fn generate(
        &self,
        ctx: &mut SceneContext<'_>,
        location: u64,
    ) -> Result<u64, GenerationError> {
        Ok(ctx.spawn_scene(location, self.size))
    }

    fn deinit(&self, ctx: &mut SceneContext<'_>, scene: u64) {
        ctx.despawn_scene(scene);
    }

    fn can_reach(&self, world: &World, map: &SimEntityMap, agent: u64, cell: (i32, i32)) -> bool {
        // No pathfinding here; standable-in-same-scene is the best the
        // default can answer.
        let Some(agent_entity) = map.get_bevy(agent) else {
            return false;
        };
        let Some(located) = world.get::<LocatedIn>(agent_entity) else {
            return false;
        };
        let downed = world
            .get::<AgentCore>(agent_entity)
            .map(|core| core.downed)
            .unwrap_or(true);
        if downed {
            return false;
        }
        world
            .get::<SceneState>(located.0)
            .map(|scene| scene.is_standable(cell))
            .unwrap_or(false)
    }
}

/// Generator driven by a host- or test-supplied closure. `deinit` and
/// `can_reach` behave like [`EmptyLotGenerator`].
pub struct ScriptedGenerator {
    #[allow(clippy::type_complexity)]
    pub script:
        Box<dyn Fn(&mut SceneContext<'_>, u64) -> Result<u64, GenerationError> + Send + Sync>,
}

impl ScriptedGenerator {
    pub fn new(
        script: impl Fn(&mut SceneContext<'_>, u64) -> Result<u64, GenerationError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
        }
    }

    /// A generator that always fails, for exercising rollback paths.
    pub fn failing(message: &'static str) -> Self {
        Self::new(move |_, location| Err(GenerationError::new(location, message)))
    }
}

impl SceneGenerator for ScriptedGenerator {
    fn generate(
        &self,
        ctx: &mut SceneContext<'_>,
        location: u64,
    ) -> Result<u64, GenerationError> {
        (self.script)(ctx, location)
    }

    fn deinit(&self, ctx: &mut SceneContext<'_>, scene: u64) {
        ctx.despawn_scene(scene);
    }

    fn can_reach(&self, world: &World, map: &SimEntityMap, agent: u64, cell: (i32, i32)) -> bool {
        EmptyLotGenerator::default().can_reach(world, map, agent, cell)
    }
}
