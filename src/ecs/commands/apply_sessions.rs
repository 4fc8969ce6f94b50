use std::collections::BTreeSet;

use bevy_ecs::entity::Entity;
use bevy_ecs::world::World;

use crate::ecs::components::common::SimEntity;
use crate::ecs::components::{
    ItemState, LocationLifecycle, LocationState, SceneParent, SceneParentState, SceneState,
    StructureKind, StructureState,
};
use crate::ecs::events::{RejectReason, TeardownReason, VisitReactiveEvent};
use crate::ecs::scene::SceneContext;
use crate::ecs::time::TICKS_PER_DAY;

use super::applicator::{
    ApplyCtx, move_party_in, player_agents_in_scene, player_faction_id, scene_members,
};
use super::VisitCommand;

fn grace_ticks(ctx: &ApplyCtx) -> u64 {
    ctx.config.threat_grace_days as u64 * TICKS_PER_DAY
}

/// Create-or-reuse the session for a location and move the party in.
///
/// The fast path reuses a cached live scene; the slow path generates one
/// through the installed generator, then captures the location's inventory
/// and structures into the tracking registry. Generation failure rolls the
/// partial session back completely.
pub(crate) fn apply_enter_location(
    ctx: &mut ApplyCtx,
    world: &mut World,
    cmd: &VisitCommand,
    location: u64,
    party: &[u64],
) {
    let Some(loc_entity) = ctx.entity_map.get_bevy(location) else {
        ctx.reject(location, RejectReason::UnknownLocation);
        return;
    };
    let Some(loc_faction) = world.get::<LocationState>(loc_entity).map(|loc| loc.faction) else {
        ctx.reject(location, RejectReason::UnknownLocation);
        return;
    };
    let Some(player) = player_faction_id(world) else {
        tracing::warn!(location, "no requester faction in world, dropping entry command");
        return;
    };
    if loc_faction == player || ctx.relations.are_hostile(loc_faction, player) {
        ctx.reject(location, RejectReason::HostileLocation);
        return;
    }

    // Fast path: live cached scene
    if let Some(scene_id) = ctx.visit_state.scene_for(location) {
        if let Some(scene_entity) = ctx.entity_map.get_bevy(scene_id) {
            refresh_threat_grace(ctx, world, location);
            move_party_in(world, &ctx.entity_map, scene_entity, party);
            let event_id = ctx.record_event(cmd);
            ctx.emit(VisitReactiveEvent::SessionOpened {
                event_id,
                location,
                scene: scene_id,
                reused: true,
            });
            return;
        }
        tracing::warn!(location, scene = scene_id, "cached scene no longer resolves, regenerating");
        ctx.visit_state.scenes.remove(&location);
    }

    // Slow path: ensure a scene parent, then generate
    let existing_parent = ctx
        .visit_state
        .scene_parents
        .get(&location)
        .copied()
        .filter(|id| ctx.entity_map.get_bevy(*id).is_some());
    let (parent_id, created_parent) = match existing_parent {
        Some(id) => {
            refresh_threat_grace(ctx, world, location);
            (id, false)
        }
        None => {
            let id = ctx.id_gen.0.next_id();
            let entity = world
                .spawn((
                    SimEntity {
                        id,
                        name: format!("visit-{location}"),
                    },
                    SceneParent,
                    SceneParentState {
                        location,
                        threat_check_at: ctx.now + grace_ticks(ctx),
                    },
                ))
                .id();
            ctx.entity_map.insert(id, entity);
            ctx.visit_state.scene_parents.insert(location, id);
            (id, true)
        }
    };

    let generated = {
        let mut gen_ctx = SceneContext {
            world,
            ids: &mut ctx.id_gen.0,
            map: &mut ctx.entity_map,
        };
        ctx.services.generator.generate(&mut gen_ctx, location)
    };

    let scene_id = match generated {
        Ok(scene_id) => scene_id,
        Err(err) => {
            tracing::warn!(location, error = %err, "scene generation failed, rolling back");
            if created_parent {
                ctx.visit_state.scene_parents.remove(&location);
                if let Some(parent_entity) = ctx.entity_map.get_bevy(parent_id) {
                    world.despawn(parent_entity);
                }
                ctx.entity_map.remove(parent_id);
            }
            ctx.reject(location, RejectReason::GenerationFailed);
            return;
        }
    };

    ctx.visit_state.scenes.insert(location, scene_id);
    let Some(scene_entity) = ctx.entity_map.get_bevy(scene_id) else {
        tracing::warn!(location, scene = scene_id, "generator returned an unregistered scene");
        ctx.visit_state.scenes.remove(&location);
        ctx.reject(location, RejectReason::GenerationFailed);
        return;
    };

    seed_session(ctx, world, scene_entity, loc_faction, player);

    if let Some(mut loc) = world.get_mut::<LocationState>(loc_entity) {
        loc.lifecycle = LocationLifecycle::Active;
    }
    move_party_in(world, &ctx.entity_map, scene_entity, party);

    let event_id = ctx.record_event(cmd);
    ctx.emit(VisitReactiveEvent::SessionOpened {
        event_id,
        location,
        scene: scene_id,
        reused: false,
    });
}

fn refresh_threat_grace(ctx: &mut ApplyCtx, world: &mut World, location: u64) {
    let Some(&parent_id) = ctx.visit_state.scene_parents.get(&location) else {
        return;
    };
    let Some(parent_entity) = ctx.entity_map.get_bevy(parent_id) else {
        return;
    };
    let deadline = ctx.now + grace_ticks(ctx);
    if let Some(mut parent) = world.get_mut::<SceneParentState>(parent_entity) {
        parent.threat_check_at = deadline;
    }
}

/// One-time capture of a freshly generated scene: track the location's
/// inventory (forbidding it to the party's automation), grant recreational
/// structures to the visiting faction, clear fog over room interiors and
/// around structures, and mark the friendly zone around host structures.
fn seed_session(
    ctx: &mut ApplyCtx,
    world: &mut World,
    scene_entity: Entity,
    host_faction: u64,
    player: u64,
) {
    let members = scene_members(world, scene_entity);
    let party_carriers: BTreeSet<u64> = player_agents_in_scene(world, scene_entity, player)
        .into_iter()
        .map(|(id, _)| id)
        .collect();

    let mut captured_items: Vec<(Entity, u64)> = Vec::new();
    let mut granted: Vec<(Entity, u64)> = Vec::new();
    let mut unfog_cells: Vec<(i32, i32)> = Vec::new();
    let mut home_cells: Vec<(i32, i32)> = Vec::new();

    for member in members {
        let Some(sim_id) = world.get::<SimEntity>(member).map(|sim| sim.id) else {
            continue;
        };
        if let Some(item) = world.get::<ItemState>(member) {
            let party_owned = item.carried_by.is_some_and(|c| party_carriers.contains(&c));
            if !party_owned {
                captured_items.push((member, sim_id));
            }
            continue;
        }
        if let Some(structure) = world.get::<StructureState>(member) {
            if structure.minifiable && !structure.installed {
                // An uninstalled minifiable counts as inventory
                ctx.visit_state.track_resource(sim_id);
                continue;
            }
            unfog_cells.push(structure.position);
            if structure.faction == host_faction {
                home_cells.push(structure.position);
                if structure.kind == StructureKind::Recreation {
                    granted.push((member, sim_id));
                }
            }
        }
    }

    for (entity, sim_id) in captured_items {
        ctx.visit_state.track_resource(sim_id);
        if let Some(mut item) = world.get_mut::<ItemState>(entity) {
            item.forbidden = true;
        }
    }
    for (entity, sim_id) in granted {
        if let Some(mut structure) = world.get_mut::<StructureState>(entity) {
            structure.faction = player;
        }
        ctx.visit_state.track_structure(sim_id);
    }

    let home_radius = ctx.config.home_radius;
    if let Some(mut scene) = world.get_mut::<SceneState>(scene_entity) {
        let room_cells: Vec<(i32, i32)> = scene.rooms.values().flatten().copied().collect();
        for cell in room_cells {
            scene.unfog(cell);
        }
        for cell in unfog_cells {
            scene.unfog_with_cardinal(cell);
        }
        for cell in home_cells {
            scene.mark_home_around(cell, home_radius);
        }
    }
}

/// Idempotent session teardown. Purges registry entries and leases scoped
/// to the scene, discards the scene through the generator, and retires the
/// location. A second teardown for the same location is a silent no-op.
pub(crate) fn apply_teardown(
    ctx: &mut ApplyCtx,
    world: &mut World,
    cmd: &VisitCommand,
    location: u64,
    reason: TeardownReason,
) {
    let Some(scene_id) = ctx.visit_state.scene_for(location) else {
        return;
    };
    let scene_entity = ctx.entity_map.get_bevy(scene_id);

    // Host-driven scene discard defers to visitors still inside
    if reason == TeardownReason::SceneDiscarded {
        if let (Some(scene_entity), Some(player)) = (scene_entity, player_faction_id(world)) {
            if !player_agents_in_scene(world, scene_entity, player).is_empty() {
                return;
            }
        }
    }

    let member_ids: BTreeSet<u64> = scene_entity
        .map(|entity| {
            scene_members(world, entity)
                .into_iter()
                .filter_map(|member| world.get::<SimEntity>(member).map(|sim| sim.id))
                .collect()
        })
        .unwrap_or_default();

    ctx.visit_state
        .tracked_resources
        .retain(|id| !member_ids.contains(id));
    ctx.visit_state
        .tracked_structures
        .retain(|id| !member_ids.contains(id));
    ctx.visit_state.leases.retain(|id, _| !member_ids.contains(id));

    ctx.visit_state.scenes.remove(&location);
    if let Some(parent_id) = ctx.visit_state.scene_parents.remove(&location) {
        if let Some(parent_entity) = ctx.entity_map.get_bevy(parent_id) {
            world.despawn(parent_entity);
        }
        ctx.entity_map.remove(parent_id);
    }

    if let Some(loc_entity) = ctx.entity_map.get_bevy(location) {
        if let Some(mut loc) = world.get_mut::<LocationState>(loc_entity) {
            loc.lifecycle = LocationLifecycle::TornDown;
        }
    }

    {
        let mut gen_ctx = SceneContext {
            world,
            ids: &mut ctx.id_gen.0,
            map: &mut ctx.entity_map,
        };
        ctx.services.generator.deinit(&mut gen_ctx, scene_id);
    }

    let event_id = ctx.record_event(cmd);
    ctx.emit(VisitReactiveEvent::SessionClosed {
        event_id,
        location,
        reason,
    });
}
