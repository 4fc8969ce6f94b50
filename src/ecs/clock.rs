use bevy_ecs::resource::Resource;
use bevy_ecs::system::ResMut;

use super::time::SimTime;

/// Simulation clock resource tracking the current time and tick count.
///
/// Advances by one tick per schedule run. The `advance_clock` system moves
/// the clock forward at the end of each tick (in `SimPhase::Last`), so
/// systems see the current time before it advances.
#[derive(Resource, Debug, Clone)]
pub struct SimClock {
    pub time: SimTime,
    pub tick_count: u64,
}

impl SimClock {
    pub fn new(start_day: u64) -> Self {
        Self {
            time: SimTime::from_day(start_day),
            tick_count: 0,
        }
    }

    /// The current tick — what lease expirations and threat deadlines
    /// are measured against.
    pub fn now(&self) -> u64 {
        self.time.as_ticks()
    }

    /// Advance the clock by one tick.
    pub fn advance(&mut self) {
        self.time = SimTime::from_ticks(self.time.as_ticks() + 1);
        self.tick_count += 1;
    }
}

/// Bevy system that advances the simulation clock by one tick.
/// Registered in `SimPhase::Last` so all other systems see the current
/// time before it advances.
pub fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.advance();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::time::{TICKS_PER_DAY, TICKS_PER_HOUR};

    #[test]
    fn new_clock_starts_at_given_day() {
        let clock = SimClock::new(5);
        assert_eq!(clock.time.day(), 5);
        assert_eq!(clock.time.hour(), 0);
        assert_eq!(clock.tick_count, 0);
        assert_eq!(clock.now(), 5 * TICKS_PER_DAY);
    }

    #[test]
    fn advance_increments_tick() {
        let mut clock = SimClock::new(0);
        clock.advance();
        assert_eq!(clock.now(), 1);
        assert_eq!(clock.tick_count, 1);
    }

    #[test]
    fn advance_rolls_over_hour() {
        let mut clock = SimClock::new(0);
        for _ in 0..TICKS_PER_HOUR {
            clock.advance();
        }
        assert_eq!(clock.time.hour(), 1);
    }

    #[test]
    fn advance_rolls_over_day() {
        let mut clock = SimClock::new(0);
        for _ in 0..TICKS_PER_DAY {
            clock.advance();
        }
        assert_eq!(clock.time.day(), 1);
        assert_eq!(clock.time.hour(), 0);
        assert_eq!(clock.tick_count, TICKS_PER_DAY);
    }

    #[test]
    fn tick_count_independent_of_start_day() {
        let mut clock = SimClock::new(10);
        clock.advance();
        assert_eq!(clock.tick_count, 1);
        assert_eq!(clock.now(), 10 * TICKS_PER_DAY + 1);
    }
}
