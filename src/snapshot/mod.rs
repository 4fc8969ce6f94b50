use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use bevy_ecs::world::World;
use serde::{Deserialize, Serialize};

use crate::ecs::clock::SimClock;
use crate::ecs::components::{ItemState, SceneParentState, SceneState, StructureState};
use crate::ecs::resources::{EcsIdGenerator, EventLog, SimEntityMap, VisitState};
use crate::ecs::scene::{SceneContext, SceneServices};
use crate::ecs::time::SimTime;

/// The persisted layout: the clock position plus the whole visit registry,
/// all in stable ids. ECS entities are not persisted — the host rebuilds
/// the world and the load path revalidates every reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitSnapshot {
    pub saved_at: SimTime,
    pub tick_count: u64,
    pub state: VisitState,
}

/// Write the current visit state to a JSON snapshot file.
pub fn save_visit_state(world: &World, path: &Path) -> io::Result<()> {
    let clock = world.resource::<SimClock>();
    let snapshot = VisitSnapshot {
        saved_at: clock.time,
        tick_count: clock.tick_count,
        state: world.resource::<VisitState>().clone(),
    };
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &snapshot)?;
    writer.flush()
}

/// Load a snapshot into the world: restore the clock and visit registry,
/// then prune every entry that no longer resolves against the live world.
pub fn load_visit_state(world: &mut World, path: &Path) -> io::Result<()> {
    let reader = BufReader::new(File::open(path)?);
    let snapshot: VisitSnapshot = serde_json::from_reader(reader)?;
    world.insert_resource(SimClock {
        time: snapshot.saved_at,
        tick_count: snapshot.tick_count,
    });
    world.insert_resource(snapshot.state);
    validate_visit_state(world);
    Ok(())
}

/// Drop every registry entry whose referent no longer resolves.
///
/// A session survives only if both its scene parent and its scene resolve;
/// a half-dead session is discarded entirely, deiniting whichever side is
/// still live. Tracked resources, structures, and leases are pruned
/// individually.
pub fn validate_visit_state(world: &mut World) {
    let mut state = world.remove_resource::<VisitState>().unwrap();
    let mut map = world.remove_resource::<SimEntityMap>().unwrap();
    let mut ids = world.remove_resource::<EcsIdGenerator>().unwrap();
    let services = world.remove_resource::<SceneServices>().unwrap();

    let locations: BTreeSet<u64> = state
        .scene_parents
        .keys()
        .chain(state.scenes.keys())
        .copied()
        .collect();
    for location in locations {
        let parent_ok = state
            .scene_parents
            .get(&location)
            .and_then(|id| map.get_bevy(*id))
            .is_some_and(|e| world.get::<SceneParentState>(e).is_some());
        let scene_ok = state
            .scenes
            .get(&location)
            .and_then(|id| map.get_bevy(*id))
            .is_some_and(|e| world.get::<SceneState>(e).is_some());
        if parent_ok && scene_ok {
            continue;
        }
        tracing::warn!(location, parent_ok, scene_ok, "pruning dangling session");
        if let Some(scene_id) = state.scenes.remove(&location) {
            if map.get_bevy(scene_id).is_some() {
                let mut ctx = SceneContext {
                    world,
                    ids: &mut ids.0,
                    map: &mut map,
                };
                services.generator.deinit(&mut ctx, scene_id);
            }
        }
        if let Some(parent_id) = state.scene_parents.remove(&location) {
            if let Some(parent_entity) = map.get_bevy(parent_id) {
                world.despawn(parent_entity);
            }
            map.remove(parent_id);
        }
    }

    let resolves_resource = |id: u64| {
        map.get_bevy(id).is_some_and(|e| {
            world.get::<ItemState>(e).is_some() || world.get::<StructureState>(e).is_some()
        })
    };
    let dangling: Vec<u64> = state
        .tracked_resources
        .iter()
        .copied()
        .filter(|id| !resolves_resource(*id))
        .collect();
    for id in dangling {
        tracing::warn!(resource = id, "pruning dangling tracked resource");
        state.tracked_resources.remove(&id);
    }

    let resolves_structure =
        |id: u64| map.get_bevy(id).is_some_and(|e| world.get::<StructureState>(e).is_some());
    state.tracked_structures.retain(|id| {
        let alive = resolves_structure(*id);
        if !alive {
            tracing::warn!(structure = id, "pruning dangling tracked structure");
        }
        alive
    });
    state.leases.retain(|id, _| {
        let alive = resolves_structure(*id);
        if !alive {
            tracing::warn!(structure = id, "pruning dangling lease");
        }
        alive
    });

    world.insert_resource(state);
    world.insert_resource(map);
    world.insert_resource(ids);
    world.insert_resource(services);
}

/// Write an iterator of serializable items to a JSONL file (one JSON object per line).
fn write_jsonl<T: Serialize>(path: &Path, items: impl Iterator<Item = T>) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for item in items {
        serde_json::to_writer(&mut writer, &item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Export the audit trail to JSONL files in the given output directory.
///
/// Creates the output directory if it does not exist. Writes 2 files:
/// - `events.jsonl` — one audit event per line
/// - `event_participants.jsonl` — one participant link per line
pub fn export_events_jsonl(log: &EventLog, output_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(output_dir)?;
    write_jsonl(&output_dir.join("events.jsonl"), log.events.iter())?;
    write_jsonl(
        &output_dir.join("event_participants.jsonl"),
        log.participants.iter(),
    )?;
    Ok(())
}
