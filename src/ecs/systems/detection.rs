use bevy_app::{App, Plugin};
use bevy_ecs::entity::Entity;
use bevy_ecs::message::{MessageReader, MessageWriter};
use bevy_ecs::prelude::{Query, Res, With};
use bevy_ecs::schedule::IntoScheduleConfigs;

use crate::ecs::commands::{VisitCommand, VisitCommandKind};
use crate::ecs::components::common::SimEntity;
use crate::ecs::components::{
    Agent, AgentCore, Faction, IsPlayer, ItemState, LocationState, StructureState,
};
use crate::ecs::events::{DestructionMode, GameplayEvent};
use crate::ecs::relationships::{LocatedIn, LocatedInSources};
use crate::ecs::resources::event_log::{EventKind, ParticipantRole};
use crate::ecs::resources::goodwill::GoodwillReason;
use crate::ecs::resources::{penalty, SimEntityMap, VisitConfig, VisitState};
use crate::ecs::schedule::{DomainSet, SimTick};

/// Violation detection: classifies inbound gameplay events against the
/// tracking registry and turns them into goodwill penalties and untrack
/// commands. Runs every tick so nothing slips between cadences.
pub struct DetectionPlugin;

impl Plugin for DetectionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(SimTick, detect_violations.in_set(DomainSet::Detection));
    }
}

fn goodwill_command(
    faction: u64,
    delta: i32,
    reason: GoodwillReason,
    description: String,
) -> VisitCommand {
    VisitCommand::new(
        VisitCommandKind::AdjustGoodwill {
            faction,
            delta,
            reason,
        },
        EventKind::GoodwillPenalty,
        description,
    )
    .with_participant(faction, ParticipantRole::Faction)
}

#[allow(clippy::too_many_arguments)]
pub fn detect_violations(
    mut inbound: MessageReader<GameplayEvent>,
    state: Res<VisitState>,
    config: Res<VisitConfig>,
    map: Res<SimEntityMap>,
    items: Query<&ItemState>,
    structures: Query<&StructureState>,
    located: Query<&LocatedIn>,
    members: Query<&LocatedInSources>,
    agents: Query<(&SimEntity, &AgentCore), With<Agent>>,
    locations: Query<&LocationState>,
    player: Query<&SimEntity, (With<Faction>, With<IsPlayer>)>,
    mut commands: MessageWriter<VisitCommand>,
) {
    let Ok(player) = player.single() else {
        return;
    };
    let player = player.id;

    // Host faction of the scene an entity currently sits in
    let host_of = |entity: Entity| -> Option<u64> {
        let scene_entity = located.get(entity).ok()?.0;
        let scene_id = map.get_sim(scene_entity)?;
        let location = state.location_of_scene(scene_id)?;
        let loc_entity = map.get_bevy(location)?;
        locations.get(loc_entity).ok().map(|loc| loc.faction)
    };

    for event in inbound.read() {
        match event {
            GameplayEvent::WorkCompleted {
                agent,
                target,
                activity,
            } => {
                if activity.is_building_context() {
                    continue;
                }
                if !state.is_tracked_resource(*target) {
                    continue;
                }
                let Some(target_entity) = map.get_bevy(*target) else {
                    continue;
                };
                let Ok(item) = items.get(target_entity) else {
                    continue;
                };
                // Only the visiting party's hands count as theft
                let taken_by_party = map
                    .get_bevy(*agent)
                    .and_then(|e| agents.get(e).ok())
                    .is_some_and(|(_, core)| core.faction == player);
                if !taken_by_party {
                    continue;
                }
                if config.enable_penalties && config.enable_theft_penalty && item.unit_value > 0.0
                {
                    if let Some(host) = host_of(target_entity) {
                        let amount = penalty(
                            config.base_penalty,
                            config.penalty_scaling,
                            item.unit_value,
                            item.stack,
                        );
                        commands.write(goodwill_command(
                            host,
                            -amount,
                            GoodwillReason::Theft,
                            format!("Took {} x{} from the hosts", item.kind, item.stack),
                        ));
                    }
                }
                commands.write(VisitCommand::bookkeeping(
                    VisitCommandKind::UntrackResource { resource: *target },
                ));
            }

            GameplayEvent::CaravanDeparted {
                location, manifest, ..
            } => {
                let Some(scene_entity) = state
                    .scene_for(*location)
                    .and_then(|scene| map.get_bevy(scene))
                else {
                    continue;
                };
                let Ok(scene_members) = members.get(scene_entity) else {
                    continue;
                };
                let host = map
                    .get_bevy(*location)
                    .and_then(|e| locations.get(e).ok())
                    .map(|loc| loc.faction);

                let party: Vec<u64> = scene_members
                    .iter()
                    .filter_map(|member| {
                        let (sim, core) = agents.get(*member).ok()?;
                        (core.faction == player).then_some(sim.id)
                    })
                    .collect();

                for (kind, count) in manifest {
                    // What the party legitimately carried in
                    let carried: u32 = scene_members
                        .iter()
                        .filter_map(|member| items.get(*member).ok())
                        .filter(|item| {
                            &item.kind == kind
                                && item.carried_by.is_some_and(|c| party.contains(&c))
                        })
                        .map(|item| item.stack)
                        .sum();
                    let excess = count.saturating_sub(carried);
                    if excess == 0 {
                        continue;
                    }

                    // Tracked host stacks of this kind, stable-id order
                    let mut host_stacks: Vec<(u64, u32, f64)> = scene_members
                        .iter()
                        .filter_map(|member| {
                            let item = items.get(*member).ok()?;
                            if &item.kind != kind || item.carried_by.is_some() {
                                return None;
                            }
                            let sim_id = map.get_sim(*member)?;
                            state
                                .is_tracked_resource(sim_id)
                                .then_some((sim_id, item.stack, item.unit_value))
                        })
                        .collect();
                    if host_stacks.is_empty() {
                        continue;
                    }
                    host_stacks.sort_by_key(|(id, _, _)| *id);

                    if config.enable_penalties && config.enable_caravan_penalty {
                        if let Some(host) = host {
                            let unit_value = host_stacks[0].2;
                            let amount = penalty(
                                config.base_penalty,
                                config.penalty_scaling,
                                unit_value,
                                excess,
                            );
                            commands.write(goodwill_command(
                                host,
                                -amount,
                                GoodwillReason::Theft,
                                format!("Departed with {kind} x{excess} of the hosts' stock"),
                            ));
                        }
                    }
                    let mut covered = 0u32;
                    for (sim_id, stack, _) in host_stacks {
                        if covered >= excess {
                            break;
                        }
                        covered += stack;
                        commands.write(VisitCommand::bookkeeping(
                            VisitCommandKind::UntrackResource { resource: sim_id },
                        ));
                    }
                }
            }

            GameplayEvent::StructureDestroyed { structure, mode } => {
                if !state.is_tracked_structure(*structure) {
                    continue;
                }
                if *mode == DestructionMode::Deconstructed
                    && config.enable_penalties
                    && config.enable_destruction_penalty
                {
                    if let Some(host) = map.get_bevy(*structure).and_then(host_of) {
                        commands.write(goodwill_command(
                            host,
                            -config.flat_penalty,
                            GoodwillReason::Vandalism,
                            format!("Deconstructed host structure {structure}"),
                        ));
                    }
                }
                commands.write(VisitCommand::bookkeeping(
                    VisitCommandKind::UntrackStructure {
                        structure: *structure,
                    },
                ));
            }

            GameplayEvent::StructureMinified { structure } => {
                if !state.is_tracked_structure(*structure) {
                    continue;
                }
                if config.enable_penalties && config.enable_minify_penalty {
                    let entity = map.get_bevy(*structure);
                    let unit_value = entity
                        .and_then(|e| structures.get(e).ok())
                        .map(|s| s.unit_value)
                        .unwrap_or(0.0);
                    if let Some(host) = entity.and_then(host_of) {
                        let amount = penalty(
                            config.base_penalty,
                            config.penalty_scaling,
                            unit_value,
                            1,
                        );
                        commands.write(goodwill_command(
                            host,
                            -amount,
                            GoodwillReason::Theft,
                            format!("Packed up host structure {structure}"),
                        ));
                    }
                }
                commands.write(VisitCommand::bookkeeping(
                    VisitCommandKind::UntrackStructure {
                        structure: *structure,
                    },
                ));
            }

            GameplayEvent::ConstructionCompleted {
                location,
                builder_faction,
            } => {
                if !state.has_session(*location) || *builder_faction != player {
                    continue;
                }
                if !(config.enable_penalties && config.enable_encroach_penalty) {
                    continue;
                }
                let Some(host) = map
                    .get_bevy(*location)
                    .and_then(|e| locations.get(e).ok())
                    .map(|loc| loc.faction)
                else {
                    continue;
                };
                if host == player {
                    continue;
                }
                commands.write(goodwill_command(
                    host,
                    -config.flat_penalty,
                    GoodwillReason::Encroachment,
                    format!("Built on the hosts' ground at location {location}"),
                ));
            }

            GameplayEvent::MiningCompleted {
                location,
                miner_faction,
            } => {
                if !state.has_session(*location) || *miner_faction != player {
                    continue;
                }
                if !(config.enable_penalties && config.enable_mining_penalty) {
                    continue;
                }
                let Some(host) = map
                    .get_bevy(*location)
                    .and_then(|e| locations.get(e).ok())
                    .map(|loc| loc.faction)
                else {
                    continue;
                };
                if host == player {
                    continue;
                }
                commands.write(goodwill_command(
                    host,
                    -config.flat_penalty,
                    GoodwillReason::Vandalism,
                    format!("Mined the hosts' ground at location {location}"),
                ));
            }
        }
    }
}
