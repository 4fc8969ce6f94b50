use bevy_app::{App, Plugin};
use bevy_ecs::message::MessageReader;
use bevy_ecs::prelude::{Query, Res, ResMut, With};
use bevy_ecs::schedule::IntoScheduleConfigs;

use crate::ecs::components::common::SimEntity;
use crate::ecs::components::{Faction, IsPlayer};
use crate::ecs::events::VisitReactiveEvent;
use crate::ecs::resources::{FactionRelations, GoodwillLedger, VisitConfig};
use crate::ecs::schedule::{SimPhase, SimTick};

/// Diplomacy reaction: a faction whose goodwill total sinks to the
/// hostility threshold turns hostile toward the visitors. Runs in the
/// Reactions phase, after the applicator has updated the ledger.
pub struct GoodwillPlugin;

impl Plugin for GoodwillPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            SimTick,
            react_to_goodwill_changes.in_set(SimPhase::Reactions),
        );
    }
}

fn react_to_goodwill_changes(
    mut events: MessageReader<VisitReactiveEvent>,
    ledger: Res<GoodwillLedger>,
    config: Res<VisitConfig>,
    mut relations: ResMut<FactionRelations>,
    player: Query<&SimEntity, (With<Faction>, With<IsPlayer>)>,
) {
    let Ok(player) = player.single() else {
        return;
    };
    for event in events.read() {
        if let VisitReactiveEvent::GoodwillChanged { faction, .. } = event {
            if ledger.total(*faction) <= config.hostility_threshold
                && !relations.are_hostile(*faction, player.id)
            {
                tracing::info!(
                    faction,
                    total = ledger.total(*faction),
                    "goodwill fell to the hostility threshold, faction turns hostile"
                );
                relations.set_hostile(*faction, player.id);
            }
        }
    }
}
