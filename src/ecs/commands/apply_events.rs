use bevy_ecs::world::World;

use crate::ecs::components::common::SimEntity;
use crate::ecs::components::{AgentCore, ItemMarker, ItemState, RATION_KIND, SceneState};
use crate::ecs::events::VisitReactiveEvent;
use crate::ecs::relationships::LocatedIn;

use super::applicator::{ApplyCtx, player_faction_id, scene_members};
use super::VisitCommand;

/// Materialize a resupply drop in a location's scene.
///
/// The drop lands on the first candidate cell reachable by a host-side
/// agent, falling back to the first candidate and finally the scene
/// center. The rations join the tracked location inventory.
pub(crate) fn apply_drop_supplies(
    ctx: &mut ApplyCtx,
    world: &mut World,
    cmd: &VisitCommand,
    location: u64,
    units: u32,
    candidates: &[(i32, i32)],
) {
    let Some(scene_entity) = ctx
        .visit_state
        .scene_for(location)
        .and_then(|scene| ctx.entity_map.get_bevy(scene))
    else {
        tracing::warn!(location, "supply drop for a location without a live scene");
        return;
    };
    if units == 0 {
        return;
    }
    let Some(player) = player_faction_id(world) else {
        return;
    };

    // Host-side agents who could haul the drop
    let mut recipients: Vec<u64> = scene_members(world, scene_entity)
        .into_iter()
        .filter_map(|member| {
            let core = world.get::<AgentCore>(member)?;
            if core.faction == player
                || core.downed
                || ctx.relations.are_hostile(core.faction, player)
            {
                return None;
            }
            world.get::<SimEntity>(member).map(|sim| sim.id)
        })
        .collect();
    recipients.sort_unstable();

    let reachable = candidates.iter().copied().find(|cell| {
        recipients.iter().any(|agent| {
            ctx.services
                .generator
                .can_reach(world, &ctx.entity_map, *agent, *cell)
        })
    });
    let cell = reachable
        .or_else(|| candidates.first().copied())
        .or_else(|| world.get::<SceneState>(scene_entity).map(|s| s.center()))
        .unwrap_or((0, 0));

    let unit_value = ctx
        .config
        .trade_goods
        .iter()
        .find(|good| good.kind == RATION_KIND)
        .map(|good| good.unit_value)
        .unwrap_or(0.0);
    let mut item = ItemState::new(RATION_KIND, units, unit_value)
        .with_nutrition(ctx.config.ration_nutrition);
    item.forbidden = true;
    item.position = cell;

    let id = ctx.id_gen.0.next_id();
    let entity = world
        .spawn((
            SimEntity {
                id,
                name: format!("{RATION_KIND}-{id}"),
            },
            ItemMarker,
            item,
            LocatedIn(scene_entity),
        ))
        .id();
    ctx.entity_map.insert(id, entity);
    ctx.visit_state.track_resource(id);

    let event_id = ctx.record_event(cmd);
    ctx.emit(VisitReactiveEvent::SuppliesDropped {
        event_id,
        location,
        units,
        cell,
    });
}

/// Announce an incursion against a visited location. The engine records
/// and reports; spawning the actual raid is the host's job.
pub(crate) fn apply_trigger_incursion(
    ctx: &mut ApplyCtx,
    cmd: &VisitCommand,
    location: u64,
    faction: u64,
    forced: bool,
) {
    if !ctx.visit_state.has_session(location) {
        return;
    }
    let event_id = ctx.record_event(cmd);
    ctx.emit(VisitReactiveEvent::IncursionTriggered {
        event_id,
        location,
        faction,
        forced,
    });
}
