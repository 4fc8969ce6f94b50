use bevy_ecs::entity::Entity;
use bevy_ecs::message::Messages;
use bevy_ecs::query::With;
use bevy_ecs::world::World;

use crate::ecs::clock::SimClock;
use crate::ecs::components::common::SimEntity;
use crate::ecs::components::{
    AgentCore, Faction, IsPlayer, ItemMarker, ItemState, LocationState, SceneState, SILVER_KIND,
};
use crate::ecs::events::VisitReactiveEvent;
use crate::ecs::relationships::{LocatedIn, LocatedInSources};
use crate::ecs::resources::event_log::{EcsEvent, EventParticipant};
use crate::ecs::resources::{
    EcsIdGenerator, EventLog, FactionRelations, GoodwillLedger, SimEntityMap, VisitConfig,
    VisitState,
};
use crate::ecs::scene::SceneServices;
use crate::ecs::time::SimTime;
use crate::IdGenerator;

use super::apply_events;
use super::apply_goodwill;
use super::apply_leases;
use super::apply_sessions;
use super::apply_trade;
use super::{VisitCommand, VisitCommandKind};

/// Context passed to all `apply_*` sub-functions, providing mutable access
/// to the resources they need without requiring direct World access.
pub(crate) struct ApplyCtx {
    pub event_log: EventLog,
    pub id_gen: EcsIdGenerator,
    pub entity_map: SimEntityMap,
    pub visit_state: VisitState,
    pub goodwill: GoodwillLedger,
    pub relations: FactionRelations,
    pub services: SceneServices,
    pub config: VisitConfig,
    pub time: SimTime,
    /// Current tick, for lease expiry and grace arithmetic.
    pub now: u64,
    pub reactive_events: Vec<VisitReactiveEvent>,
}

impl ApplyCtx {
    /// Record an Event entry in the log for a non-bookkeeping command.
    /// Returns the event_id (0 for bookkeeping commands that skip recording).
    ///
    /// Apply functions call this at their commit point, so rejected
    /// commands leave no audit entry.
    pub(crate) fn record_event(&mut self, cmd: &VisitCommand) -> u64 {
        if cmd.is_bookkeeping() {
            return 0;
        }

        let event_id = self.id_gen.0.next_id();

        self.event_log.events.push(EcsEvent {
            id: event_id,
            kind: cmd.event_kind.clone(),
            timestamp: self.time,
            description: cmd.description.clone(),
            caused_by: cmd.caused_by,
            data: cmd.event_data.clone(),
        });

        for (entity_id, role) in &cmd.participants {
            self.event_log.participants.push(EventParticipant {
                event_id,
                entity_id: *entity_id,
                role: role.clone(),
            });
        }

        event_id
    }

    /// Queue a reactive event for emission after all commands are processed.
    pub(crate) fn emit(&mut self, event: VisitReactiveEvent) {
        self.reactive_events.push(event);
    }

    /// Reject a command: emit the reactive rejection, change nothing,
    /// record nothing.
    pub(crate) fn reject(&mut self, location: u64, reason: crate::ecs::events::RejectReason) {
        self.emit(VisitReactiveEvent::CommandRejected { location, reason });
    }
}

/// Exclusive system that drains all pending `VisitCommand` messages, applies
/// state changes, records audit trail, and emits `VisitReactiveEvent`
/// messages.
///
/// Runs in `SimPhase::PostUpdate`.
pub fn apply_visit_commands(world: &mut World) {
    // Drain all pending commands
    let commands: Vec<VisitCommand> = {
        let Some(mut messages) = world.get_resource_mut::<Messages<VisitCommand>>() else {
            return;
        };
        messages.drain().collect()
    };

    if commands.is_empty() {
        return;
    }

    // Extract resources into ApplyCtx
    let (time, now) = {
        let clock = world.resource::<SimClock>();
        (clock.time, clock.now())
    };
    let config = world.resource::<VisitConfig>().clone();
    let event_log = world.remove_resource::<EventLog>().unwrap();
    let id_gen = world.remove_resource::<EcsIdGenerator>().unwrap();
    let entity_map = world.remove_resource::<SimEntityMap>().unwrap();
    let visit_state = world.remove_resource::<VisitState>().unwrap();
    let goodwill = world.remove_resource::<GoodwillLedger>().unwrap();
    let relations = world.remove_resource::<FactionRelations>().unwrap();
    let services = world.remove_resource::<SceneServices>().unwrap();

    let mut ctx = ApplyCtx {
        event_log,
        id_gen,
        entity_map,
        visit_state,
        goodwill,
        relations,
        services,
        config,
        time,
        now,
        reactive_events: Vec::new(),
    };

    // Process each command
    for cmd in &commands {
        match &cmd.kind {
            // Session cache
            VisitCommandKind::EnterLocation { location, party } => {
                apply_sessions::apply_enter_location(&mut ctx, world, cmd, *location, party);
            }
            VisitCommandKind::TeardownLocation { location, reason } => {
                apply_sessions::apply_teardown(&mut ctx, world, cmd, *location, *reason);
            }

            // Registry / reputation
            VisitCommandKind::AdjustGoodwill {
                faction,
                delta,
                reason,
            } => {
                apply_goodwill::apply_adjust_goodwill(&mut ctx, cmd, *faction, *delta, *reason);
            }
            VisitCommandKind::UntrackResource { resource } => {
                apply_goodwill::apply_untrack_resource(&mut ctx, *resource);
            }
            VisitCommandKind::UntrackStructure { structure } => {
                apply_goodwill::apply_untrack_structure(&mut ctx, *structure);
            }

            // Leasing and trade
            VisitCommandKind::RentBeds { location, days } => {
                apply_leases::apply_rent_beds(&mut ctx, world, cmd, *location, *days);
            }
            VisitCommandKind::CancelLease { location, room } => {
                apply_leases::apply_cancel_lease(&mut ctx, world, cmd, *location, *room);
            }
            VisitCommandKind::SweepExpiredLeases => {
                apply_leases::apply_sweep_expired(&mut ctx, world, cmd);
            }
            VisitCommandKind::Trade {
                location,
                purchases,
            } => {
                apply_trade::apply_trade(&mut ctx, world, cmd, *location, purchases);
            }

            // Periodic events
            VisitCommandKind::DropSupplies {
                location,
                units,
                candidates,
            } => {
                apply_events::apply_drop_supplies(
                    &mut ctx, world, cmd, *location, *units, candidates,
                );
            }
            VisitCommandKind::TriggerIncursion {
                location,
                faction,
                forced,
            } => {
                apply_events::apply_trigger_incursion(&mut ctx, cmd, *location, *faction, *forced);
            }
        }
    }

    // Write reactive events
    let reactive_events = std::mem::take(&mut ctx.reactive_events);
    if let Some(mut messages) = world.get_resource_mut::<Messages<VisitReactiveEvent>>() {
        messages.write_batch(reactive_events);
    }

    // Put resources back
    world.insert_resource(ctx.event_log);
    world.insert_resource(ctx.id_gen);
    world.insert_resource(ctx.entity_map);
    world.insert_resource(ctx.visit_state);
    world.insert_resource(ctx.goodwill);
    world.insert_resource(ctx.relations);
    world.insert_resource(ctx.services);
}

// ---------------------------------------------------------------------------
// Shared lookups for the apply_* modules
// ---------------------------------------------------------------------------

/// Stable id of the requesting (player-analogue) faction.
pub(crate) fn player_faction_id(world: &mut World) -> Option<u64> {
    let mut query = world.query_filtered::<&SimEntity, (With<Faction>, With<IsPlayer>)>();
    query.iter(world).next().map(|sim| sim.id)
}

/// Everything located in a scene.
pub(crate) fn scene_members(world: &World, scene_entity: Entity) -> Vec<Entity> {
    world
        .get::<LocatedInSources>(scene_entity)
        .map(|sources| sources.to_vec())
        .unwrap_or_default()
}

/// Requester agents in a scene, sorted by stable id for deterministic
/// iteration order.
pub(crate) fn player_agents_in_scene(
    world: &World,
    scene_entity: Entity,
    player: u64,
) -> Vec<(u64, Entity)> {
    let mut agents: Vec<(u64, Entity)> = scene_members(world, scene_entity)
        .into_iter()
        .filter_map(|member| {
            let core = world.get::<AgentCore>(member)?;
            if core.faction != player {
                return None;
            }
            let sim = world.get::<SimEntity>(member)?;
            Some((sim.id, member))
        })
        .collect();
    agents.sort_by_key(|(id, _)| *id);
    agents
}

/// Silver stacks carried by requester agents in a scene, sorted by stable
/// id. Returns (stable id, entity, stack size).
pub(crate) fn silver_stacks(
    world: &World,
    scene_entity: Entity,
    player: u64,
) -> Vec<(u64, Entity, u32)> {
    let carriers: std::collections::BTreeSet<u64> =
        player_agents_in_scene(world, scene_entity, player)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
    let mut stacks: Vec<(u64, Entity, u32)> = scene_members(world, scene_entity)
        .into_iter()
        .filter_map(|member| {
            let item = world.get::<ItemState>(member)?;
            if item.kind != SILVER_KIND {
                return None;
            }
            let carrier = item.carried_by?;
            if !carriers.contains(&carrier) {
                return None;
            }
            let sim = world.get::<SimEntity>(member)?;
            Some((sim.id, member, item.stack))
        })
        .collect();
    stacks.sort_by_key(|(id, _, _)| *id);
    stacks
}

/// Deduct `amount` silver from the party's carried stacks, greedily in
/// stable-id order. Returns false (deducting nothing) if the party cannot
/// cover the amount. Emptied stacks are despawned and unregistered.
pub(crate) fn deduct_silver(
    world: &mut World,
    map: &mut SimEntityMap,
    scene_entity: Entity,
    player: u64,
    amount: i64,
) -> bool {
    let stacks = silver_stacks(world, scene_entity, player);
    let total: i64 = stacks.iter().map(|(_, _, stack)| *stack as i64).sum();
    if total < amount {
        return false;
    }

    let mut remaining = amount;
    for (id, entity, stack) in stacks {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(stack as i64) as u32;
        remaining -= take as i64;
        if take == stack {
            map.remove(id);
            world.despawn(entity);
        } else if let Some(mut item) = world.get_mut::<ItemState>(entity) {
            item.stack -= take;
        }
    }
    true
}

/// Mint a silver stack in a scene: carried by the first requester agent
/// present, or on the ground at the scene center if none remain.
pub(crate) fn mint_silver(
    world: &mut World,
    ids: &mut IdGenerator,
    map: &mut SimEntityMap,
    scene_entity: Entity,
    player: u64,
    amount: i64,
) {
    if amount <= 0 {
        return;
    }
    let mut item = ItemState::silver(amount as u32);
    match player_agents_in_scene(world, scene_entity, player).first() {
        Some((agent_id, agent_entity)) => {
            item.carried_by = Some(*agent_id);
            if let Some(core) = world.get::<AgentCore>(*agent_entity) {
                item.position = core.position;
            }
        }
        None => {
            if let Some(scene) = world.get::<SceneState>(scene_entity) {
                item.position = scene.center();
            }
        }
    }
    let id = ids.next_id();
    let entity = world
        .spawn((
            SimEntity {
                id,
                name: format!("{SILVER_KIND}-{id}"),
            },
            ItemMarker,
            item,
            LocatedIn(scene_entity),
        ))
        .id();
    map.insert(id, entity);
}

/// Move a party of agents (and their carried stacks) into a scene, placing
/// the agents at the western edge.
pub(crate) fn move_party_in(
    world: &mut World,
    map: &SimEntityMap,
    scene_entity: Entity,
    party: &[u64],
) {
    let entry = world
        .get::<SceneState>(scene_entity)
        .map(|scene| (0, scene.size / 2))
        .unwrap_or((0, 0));

    let party_set: std::collections::BTreeSet<u64> = party.iter().copied().collect();
    for agent_id in party {
        let Some(agent_entity) = map.get_bevy(*agent_id) else {
            tracing::warn!(agent = agent_id, "party member does not resolve, skipping");
            continue;
        };
        if let Some(mut core) = world.get_mut::<AgentCore>(agent_entity) {
            core.position = entry;
        }
        world.entity_mut(agent_entity).insert(LocatedIn(scene_entity));
    }

    // Carried stacks travel with their carriers
    let mut items = world.query_filtered::<(Entity, &ItemState), With<ItemMarker>>();
    let carried: Vec<Entity> = items
        .iter(world)
        .filter(|(_, item)| item.carried_by.is_some_and(|c| party_set.contains(&c)))
        .map(|(entity, _)| entity)
        .collect();
    for entity in carried {
        if let Some(mut item) = world.get_mut::<ItemState>(entity) {
            item.position = entry;
        }
        world.entity_mut(entity).insert(LocatedIn(scene_entity));
    }
}

/// Faction controlling a location, if the location resolves.
pub(crate) fn controlling_faction(world: &World, map: &SimEntityMap, location: u64) -> Option<u64> {
    let entity = map.get_bevy(location)?;
    world.get::<LocationState>(entity).map(|loc| loc.faction)
}
