use bevy_app::{App, Plugin};
use bevy_ecs::message::MessageWriter;
use bevy_ecs::prelude::Res;
use bevy_ecs::schedule::IntoScheduleConfigs;

use crate::ecs::commands::{VisitCommand, VisitCommandKind};
use crate::ecs::conditions::daily;
use crate::ecs::resources::event_log::EventKind;
use crate::ecs::resources::VisitState;
use crate::ecs::schedule::{DomainSet, SimTick};

/// Daily lease expiry sweep. The sweep itself is a command so expiry
/// shares the applicator's audit trail with manual cancellation.
pub struct LeasesPlugin;

impl Plugin for LeasesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            SimTick,
            schedule_lease_sweep
                .run_if(daily)
                .in_set(DomainSet::Leases),
        );
    }
}

fn schedule_lease_sweep(state: Res<VisitState>, mut commands: MessageWriter<VisitCommand>) {
    if state.leases.is_empty() {
        return;
    }
    commands.write(VisitCommand::new(
        VisitCommandKind::SweepExpiredLeases,
        EventKind::LeasesExpired,
        "Daily lease expiry sweep",
    ));
}
