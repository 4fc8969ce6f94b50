use bevy_app::{App, Plugin};
use bevy_ecs::message::MessageWriter;
use bevy_ecs::prelude::{Query, Res, With};

use crate::ecs::commands::{VisitCommand, VisitCommandKind};
use crate::ecs::components::common::SimEntity;
use crate::ecs::components::{Agent, AgentCore, Faction, IsPlayer, LocationState};
use crate::ecs::conditions::hourly;
use crate::ecs::events::TeardownReason;
use crate::ecs::relationships::LocatedIn;
use crate::ecs::resources::event_log::{EventKind, ParticipantRole};
use crate::ecs::resources::{FactionRelations, SimEntityMap, VisitState};
use crate::ecs::schedule::{DomainSet, SimTick};
use bevy_ecs::schedule::IntoScheduleConfigs;

/// Session lifecycle triggers: the checks that decide when a live session
/// must be torn down. The teardown itself goes through the command
/// applicator, so every path shares the same cascade.
pub struct SessionsPlugin;

impl Plugin for SessionsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            SimTick,
            (
                check_hostile_takeback,
                check_visitors_incapacitated,
                check_visitor_departure,
            )
                .run_if(hourly)
                .in_set(DomainSet::Sessions),
        );
    }
}

fn teardown(location: u64, reason: TeardownReason, description: String) -> VisitCommand {
    VisitCommand::new(
        VisitCommandKind::TeardownLocation { location, reason },
        EventKind::SessionClosed,
        description,
    )
    .with_participant(location, ParticipantRole::Location)
}

/// The controlling faction turned hostile: the hosts take their
/// settlement back.
fn check_hostile_takeback(
    state: Res<VisitState>,
    relations: Res<FactionRelations>,
    map: Res<SimEntityMap>,
    locations: Query<&LocationState>,
    player: Query<&SimEntity, (With<Faction>, With<IsPlayer>)>,
    mut commands: MessageWriter<VisitCommand>,
) {
    let Ok(player) = player.single() else {
        return;
    };
    for (location, _) in state.sessions() {
        let Some(loc) = map.get_bevy(location).and_then(|e| locations.get(e).ok()) else {
            continue;
        };
        if relations.are_hostile(loc.faction, player.id) {
            commands.write(teardown(
                location,
                TeardownReason::Ceded,
                format!("Hosts reclaimed location {location} after turning hostile"),
            ));
        }
    }
}

/// Every member of the visiting party is downed: the visit ends.
fn check_visitors_incapacitated(
    state: Res<VisitState>,
    map: Res<SimEntityMap>,
    agents: Query<(&AgentCore, &LocatedIn), With<Agent>>,
    player: Query<&SimEntity, (With<Faction>, With<IsPlayer>)>,
    mut commands: MessageWriter<VisitCommand>,
) {
    let Ok(player) = player.single() else {
        return;
    };
    for (location, scene) in state.sessions() {
        let Some(scene_entity) = map.get_bevy(scene) else {
            continue;
        };
        let mut present = 0;
        let mut downed = 0;
        for (core, located) in &agents {
            if located.0 == scene_entity && core.faction == player.id {
                present += 1;
                if core.downed {
                    downed += 1;
                }
            }
        }
        if present > 0 && present == downed {
            commands.write(teardown(
                location,
                TeardownReason::VisitorsIncapacitated,
                format!("Visiting party at location {location} was incapacitated"),
            ));
        }
    }
}

/// The last visiting agent left the scene: the visit is over.
fn check_visitor_departure(
    state: Res<VisitState>,
    map: Res<SimEntityMap>,
    agents: Query<(&AgentCore, &LocatedIn), With<Agent>>,
    player: Query<&SimEntity, (With<Faction>, With<IsPlayer>)>,
    mut commands: MessageWriter<VisitCommand>,
) {
    let Ok(player) = player.single() else {
        return;
    };
    for (location, scene) in state.sessions() {
        let Some(scene_entity) = map.get_bevy(scene) else {
            continue;
        };
        let any_present = agents
            .iter()
            .any(|(core, located)| located.0 == scene_entity && core.faction == player.id);
        if !any_present {
            commands.write(teardown(
                location,
                TeardownReason::Evacuated,
                format!("Visiting party departed location {location}"),
            ));
        }
    }
}
