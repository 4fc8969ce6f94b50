use bevy_app::App;
use bevy_ecs::message::Messages;
use bevy_ecs::world::World;

use crate::ecs::clock::SimClock;
use crate::ecs::commands::VisitCommand;
use crate::ecs::events::VisitReactiveEvent;
use crate::ecs::schedule::SimTick;
use crate::ecs::time::{TICKS_PER_DAY, TICKS_PER_HOUR};

/// Run a single simulation tick.
pub fn tick(app: &mut App) {
    app.world_mut().run_schedule(SimTick);
}

/// Run `n` hours worth of ticks.
pub fn tick_hours(app: &mut App, n: u64) {
    for _ in 0..n * TICKS_PER_HOUR {
        app.world_mut().run_schedule(SimTick);
    }
}

/// Run `n` days worth of ticks.
pub fn tick_days(app: &mut App, n: u64) {
    for _ in 0..n * TICKS_PER_DAY {
        app.world_mut().run_schedule(SimTick);
    }
}

/// The current tick from the clock resource.
pub fn current_tick(app: &App) -> u64 {
    app.world().resource::<SimClock>().now()
}

/// Queue a command for the next tick's applicator run.
pub fn write_command(world: &mut World, cmd: VisitCommand) {
    world.resource_mut::<Messages<VisitCommand>>().write(cmd);
}

/// Drain all pending reactive events for assertions.
pub fn drain_reactive(app: &mut App) -> Vec<VisitReactiveEvent> {
    app.world_mut()
        .resource_mut::<Messages<VisitReactiveEvent>>()
        .drain()
        .collect()
}
