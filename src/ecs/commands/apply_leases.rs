use std::collections::{BTreeMap, BTreeSet};

use bevy_ecs::entity::Entity;
use bevy_ecs::world::World;

use crate::ecs::components::StructureState;
use crate::ecs::events::{RejectReason, VisitReactiveEvent};
use crate::ecs::relationships::LocatedIn;
use crate::ecs::resources::visit_state::Lease;
use crate::ecs::time::TICKS_PER_DAY;

use super::applicator::{
    ApplyCtx, controlling_faction, deduct_silver, mint_silver, player_faction_id, scene_members,
};
use super::VisitCommand;

/// Lease every bed in the best eligible room of a location's scene.
///
/// Atomic: eligibility is checked before payment, payment before any
/// reassignment. A rejection leaves silver and beds untouched.
pub(crate) fn apply_rent_beds(
    ctx: &mut ApplyCtx,
    world: &mut World,
    cmd: &VisitCommand,
    location: u64,
    days: u32,
) {
    if !ctx.config.enable_leasing {
        ctx.reject(location, RejectReason::LeasingDisabled);
        return;
    }
    let Some(scene_entity) = ctx
        .visit_state
        .scene_for(location)
        .and_then(|scene| ctx.entity_map.get_bevy(scene))
    else {
        ctx.reject(location, RejectReason::UnknownLocation);
        return;
    };
    let Some(player) = player_faction_id(world) else {
        return;
    };
    let days = days.clamp(1, ctx.config.max_lease_days);

    // Group lease-eligible beds by room
    let mut rooms: BTreeMap<u32, Vec<(u64, Entity)>> = BTreeMap::new();
    let mut ineligible_rooms: BTreeSet<u32> = BTreeSet::new();
    for member in scene_members(world, scene_entity) {
        let Some(structure) = world.get::<StructureState>(member) else {
            continue;
        };
        if !structure.is_bed() || !structure.installed || structure.prisoner_only {
            continue;
        }
        let Some(sim_id) = ctx.entity_map.get_sim(member) else {
            continue;
        };
        if structure.faction == player || ctx.visit_state.is_leased(sim_id) {
            // One taken bed disqualifies the whole room
            ineligible_rooms.insert(structure.room);
            continue;
        }
        rooms.entry(structure.room).or_default().push((sim_id, member));
    }
    for room in &ineligible_rooms {
        rooms.remove(room);
    }

    // Most beds wins; BTreeMap order breaks ties toward the lowest room id
    let Some((room, mut beds)) = rooms
        .into_iter()
        .max_by(|(room_a, beds_a), (room_b, beds_b)| {
            beds_a.len().cmp(&beds_b.len()).then(room_b.cmp(room_a))
        })
    else {
        ctx.reject(location, RejectReason::NoEligibleRooms);
        return;
    };
    beds.sort_by_key(|(id, _)| *id);

    let cost = ctx.config.bed_cost_per_day * days as i64;
    if !deduct_silver(world, &mut ctx.entity_map, scene_entity, player, cost) {
        ctx.reject(location, RejectReason::InsufficientFunds { required: cost });
        return;
    }

    let expires_at = ctx.now + days as u64 * TICKS_PER_DAY;
    let mut bed_ids = Vec::with_capacity(beds.len());
    for (bed_id, bed_entity) in beds {
        if let Some(mut structure) = world.get_mut::<StructureState>(bed_entity) {
            structure.faction = player;
        }
        ctx.visit_state.track_structure(bed_id);
        ctx.visit_state.grant_lease(
            bed_id,
            Lease {
                expires_at,
                total_cost: cost,
                room,
            },
        );
        bed_ids.push(bed_id);
    }

    let event_id = ctx.record_event(cmd);
    ctx.emit(VisitReactiveEvent::LeaseGranted {
        event_id,
        location,
        room,
        beds: bed_ids,
        total_cost: cost,
        expires_at,
    });
}

/// Cancel the lease on a room, refunding a prorated share of the original
/// cost once for the whole room batch.
pub(crate) fn apply_cancel_lease(
    ctx: &mut ApplyCtx,
    world: &mut World,
    cmd: &VisitCommand,
    location: u64,
    room: u32,
) {
    let Some(scene_entity) = ctx
        .visit_state
        .scene_for(location)
        .and_then(|scene| ctx.entity_map.get_bevy(scene))
    else {
        ctx.reject(location, RejectReason::UnknownLocation);
        return;
    };
    let Some(player) = player_faction_id(world) else {
        return;
    };

    let leased: Vec<(u64, Lease)> = ctx
        .visit_state
        .leases
        .iter()
        .filter(|(bed_id, lease)| {
            lease.room == room
                && ctx
                    .entity_map
                    .get_bevy(**bed_id)
                    .and_then(|entity| world.get::<LocatedIn>(entity))
                    .is_some_and(|located| located.0 == scene_entity)
        })
        .map(|(bed_id, lease)| (*bed_id, *lease))
        .collect();
    if leased.is_empty() {
        ctx.reject(location, RejectReason::NoEligibleRooms);
        return;
    }

    // All beds in a room share one transaction; refund against it once
    let lease = leased[0].1;
    let days_remaining = lease.expires_at.saturating_sub(ctx.now) / TICKS_PER_DAY;
    let pct = (days_remaining * ctx.config.refund_rate_per_day as u64).min(100);
    let refund = (lease.total_cost as f64 * pct as f64 / 100.0).round() as i64;

    let host = controlling_faction(world, &ctx.entity_map, location);
    let mut reverted_any = false;
    for (bed_id, _) in &leased {
        let Some(bed_entity) = ctx.entity_map.get_bevy(*bed_id) else {
            ctx.visit_state.leases.remove(bed_id);
            continue;
        };
        if let Some(mut structure) = world.get_mut::<StructureState>(bed_entity) {
            if structure.faction == player {
                if let Some(host) = host {
                    structure.faction = host;
                }
                reverted_any = true;
            }
            structure.occupant = None;
        }
        ctx.visit_state.leases.remove(bed_id);
    }

    if reverted_any {
        mint_silver(
            world,
            &mut ctx.id_gen.0,
            &mut ctx.entity_map,
            scene_entity,
            player,
            refund,
        );
    }

    let event_id = ctx.record_event(cmd);
    ctx.emit(VisitReactiveEvent::LeaseCancelled {
        event_id,
        location,
        room,
        refund: if reverted_any { refund } else { 0 },
    });
}

/// Revert every expired lease in the active sessions: clear the occupant,
/// hand the bed back to the location's faction, and drop the tracking and
/// lease entries. Dead entries (despawned beds, torn-down scenes) are
/// pruned without a revert.
pub(crate) fn apply_sweep_expired(ctx: &mut ApplyCtx, world: &mut World, cmd: &VisitCommand) {
    let Some(player) = player_faction_id(world) else {
        return;
    };

    // scene entity → controlling faction, for reverts
    let mut scene_hosts: BTreeMap<Entity, Option<u64>> = BTreeMap::new();
    for (location, scene) in ctx.visit_state.sessions() {
        if let Some(scene_entity) = ctx.entity_map.get_bevy(scene) {
            scene_hosts.insert(
                scene_entity,
                controlling_faction(world, &ctx.entity_map, location),
            );
        }
    }

    let expired: Vec<u64> = ctx
        .visit_state
        .leases
        .iter()
        .filter(|(_, lease)| lease.expires_at <= ctx.now)
        .map(|(bed_id, _)| *bed_id)
        .collect();

    let mut reverted = Vec::new();
    for bed_id in expired {
        let Some(bed_entity) = ctx.entity_map.get_bevy(bed_id) else {
            tracing::warn!(bed = bed_id, "expired lease on a despawned structure, pruning");
            ctx.visit_state.leases.remove(&bed_id);
            continue;
        };
        let host = world
            .get::<LocatedIn>(bed_entity)
            .and_then(|located| scene_hosts.get(&located.0).copied());
        let Some(host) = host else {
            // Bed no longer in any active session's scene
            ctx.visit_state.leases.remove(&bed_id);
            continue;
        };
        if let Some(mut structure) = world.get_mut::<StructureState>(bed_entity) {
            if structure.faction == player {
                structure.occupant = None;
                if let Some(host) = host {
                    structure.faction = host;
                }
                ctx.visit_state.untrack_structure(bed_id);
                reverted.push(bed_id);
            }
        }
        ctx.visit_state.leases.remove(&bed_id);
    }

    if !reverted.is_empty() {
        let event_id = ctx.record_event(cmd);
        ctx.emit(VisitReactiveEvent::LeasesExpired { event_id, reverted });
    }
}
