use bevy_ecs::system::Res;

use super::clock::SimClock;
use super::time::{SimTime, TICKS_PER_DAY, TICKS_PER_HOUR};

// Internal check functions for testability.

fn daily_check(time: SimTime) -> bool {
    time.as_ticks().is_multiple_of(TICKS_PER_DAY)
}

fn hourly_check(time: SimTime) -> bool {
    time.as_ticks().is_multiple_of(TICKS_PER_HOUR)
}

// Bevy run condition functions (for use with `.run_if()`).

pub fn daily(clock: Res<SimClock>) -> bool {
    daily_check(clock.time)
}

pub fn hourly(clock: Res<SimClock>) -> bool {
    hourly_check(clock.time)
}
