use bevy_app::{App, Plugin};
use bevy_ecs::message::MessageWriter;
use bevy_ecs::prelude::{Query, Res, ResMut, With};
use bevy_ecs::schedule::IntoScheduleConfigs;
use rand::Rng;

use crate::ecs::clock::SimClock;
use crate::ecs::commands::{VisitCommand, VisitCommandKind};
use crate::ecs::components::common::SimEntity;
use crate::ecs::components::{
    Agent, AgentCore, Faction, FactionCore, IsPlayer, ItemState, LocationState, SceneParentState,
    SceneState,
};
use crate::ecs::relationships::LocatedIn;
use crate::ecs::resources::event_log::{EventKind, ParticipantRole};
use crate::ecs::resources::{EventsRng, FactionRelations, SimEntityMap, VisitConfig, VisitState};
use crate::ecs::schedule::{DomainSet, SimTick};
use crate::ecs::time::TICKS_PER_DAY;

/// The periodic event scheduler: food resupply drops and hostile
/// incursions against visited locations. Pure scheduling — every outcome
/// is a command, and all randomness is resolved here so the applicator
/// stays deterministic.
pub struct EventsPlugin;

impl Plugin for EventsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            SimTick,
            run_periodic_events
                .run_if(events_enabled)
                .in_set(DomainSet::Events),
        );
    }
}

fn events_enabled(config: Res<VisitConfig>) -> bool {
    config.enable_events
}

#[allow(clippy::too_many_arguments)]
pub fn run_periodic_events(
    mut state: ResMut<VisitState>,
    config: Res<VisitConfig>,
    clock: Res<SimClock>,
    map: Res<SimEntityMap>,
    relations: Res<FactionRelations>,
    mut rng: ResMut<EventsRng>,
    scenes: Query<&SceneState>,
    parents: Query<&SceneParentState>,
    agents: Query<(&AgentCore, &LocatedIn), With<Agent>>,
    items: Query<(&SimEntity, &ItemState, &LocatedIn)>,
    factions: Query<(&SimEntity, &FactionCore, Option<&IsPlayer>), With<Faction>>,
    locations: Query<&LocationState>,
    mut commands: MessageWriter<VisitCommand>,
) {
    state.resupply_counter += 1;
    state.incursion_counter += 1;

    let Some(player) = factions
        .iter()
        .find(|(_, _, is_player)| is_player.is_some())
        .map(|(sim, _, _)| sim.id)
    else {
        return;
    };
    let sessions: Vec<(u64, u64)> = state.sessions().collect();

    // -- Resupply cadence --
    let resupply_interval = config.resupply_interval_days as u64 * TICKS_PER_DAY;
    if state.resupply_counter >= resupply_interval {
        state.resupply_counter = 0;
        for &(location, scene) in &sessions {
            let Some(scene_entity) = map.get_bevy(scene) else {
                continue;
            };
            let Ok(scene_state) = scenes.get(scene_entity) else {
                continue;
            };

            // Nutrition the hosts need until the next drop
            let need: f64 = agents
                .iter()
                .filter(|(core, located)| {
                    located.0 == scene_entity
                        && core.faction != player
                        && !relations.are_hostile(core.faction, player)
                })
                .map(|(core, _)| core.nutrition_per_day)
                .sum::<f64>()
                * config.resupply_interval_days as f64;

            // Nutrition still sitting in the tracked inventory
            let available: f64 = items
                .iter()
                .filter(|(sim, item, located)| {
                    located.0 == scene_entity
                        && item.is_food()
                        && state.is_tracked_resource(sim.id)
                })
                .map(|(_, item, _)| item.nutrition * item.stack as f64)
                .sum();

            let deficit = need - available;
            if deficit <= 0.0 {
                continue;
            }
            let units = (deficit / config.ration_nutrition).ceil() as u32;

            let center = scene_state.center();
            let mut candidates = Vec::new();
            for _ in 0..10 {
                let cell = (
                    center.0 + rng.0.random_range(-5..=5),
                    center.1 + rng.0.random_range(-5..=5),
                );
                if scene_state.is_standable(cell) {
                    candidates.push(cell);
                }
            }

            commands.write(
                VisitCommand::new(
                    VisitCommandKind::DropSupplies {
                        location,
                        units,
                        candidates,
                    },
                    EventKind::SuppliesDropped,
                    format!("Supply pods dropped {units} rations at location {location}"),
                )
                .with_participant(location, ParticipantRole::Location),
            );
        }
    }

    // -- Incursion cadence --
    let incursion_interval = state.incursion_interval_days as u64 * TICKS_PER_DAY;
    if state.incursion_counter >= incursion_interval {
        // A failed gate roll leaves the counter alone; the cycle retries
        // next tick until it passes.
        if rng.0.random_range(0.0..1.0) < config.incursion_chance {
            state.incursion_counter = 0;

            let now = clock.now();
            let mut pool: Vec<(u64, Vec<u64>)> = Vec::new();
            for &(location, _) in &sessions {
                let Some(&parent_id) = state.scene_parents.get(&location) else {
                    continue;
                };
                let past_grace = map
                    .get_bevy(parent_id)
                    .and_then(|e| parents.get(e).ok())
                    .is_some_and(|parent| now >= parent.threat_check_at);
                if !past_grace {
                    continue;
                }
                let host = map
                    .get_bevy(location)
                    .and_then(|e| locations.get(e).ok())
                    .map(|loc| loc.faction);
                let mut raiders: Vec<u64> = factions
                    .iter()
                    .filter(|(sim, core, is_player)| {
                        is_player.is_none()
                            && !core.defeated
                            && !core.hidden
                            && core.raid_capable
                            && (relations.are_hostile(sim.id, player)
                                || host.is_some_and(|h| relations.are_hostile(sim.id, h)))
                    })
                    .map(|(sim, _, _)| sim.id)
                    .collect();
                raiders.sort_unstable();
                if !raiders.is_empty() {
                    pool.push((location, raiders));
                }
            }

            let mut fired = false;
            for (location, raiders) in &pool {
                if rng.0.random_range(0.0..1.0) < 0.5 {
                    let faction = raiders[rng.0.random_range(0..raiders.len())];
                    commands.write(incursion(*location, faction, false));
                    fired = true;
                }
            }
            // A passed gate guarantees at least one incursion when any
            // session is eligible
            if !fired && !pool.is_empty() {
                let (location, raiders) = &pool[rng.0.random_range(0..pool.len())];
                let faction = raiders[rng.0.random_range(0..raiders.len())];
                commands.write(incursion(*location, faction, true));
                fired = true;
            }

            if fired {
                state.incursion_interval_days = rng
                    .0
                    .random_range(config.incursion_days_min..=config.incursion_days_max);
            }
        }
    }
}

fn incursion(location: u64, faction: u64, forced: bool) -> VisitCommand {
    VisitCommand::new(
        VisitCommandKind::TriggerIncursion {
            location,
            faction,
            forced,
        },
        EventKind::Incursion,
        format!("Faction {faction} moved against the visited location {location}"),
    )
    .with_participant(location, ParticipantRole::Location)
    .with_participant(faction, ParticipantRole::Faction)
}
