use std::fmt;

use serde::{Deserialize, Serialize};

// Calendar constants (host simulation clock: 2,500 ticks per hour).
pub const TICKS_PER_HOUR: u64 = 2_500;
pub const HOURS_PER_DAY: u64 = 24;
pub const DAYS_PER_SEASON: u64 = 15;
pub const SEASONS_PER_YEAR: u64 = 4;

pub const TICKS_PER_DAY: u64 = TICKS_PER_HOUR * HOURS_PER_DAY; // 60,000
pub const DAYS_PER_YEAR: u64 = DAYS_PER_SEASON * SEASONS_PER_YEAR; // 60
pub const TICKS_PER_SEASON: u64 = TICKS_PER_DAY * DAYS_PER_SEASON; // 900,000
pub const TICKS_PER_YEAR: u64 = TICKS_PER_DAY * DAYS_PER_YEAR; // 3,600,000

/// Simulation time as total elapsed ticks since world start.
///
/// A plain `u64` wrapper — no bit packing, just ticks. All calendar
/// accessors (year, season, day, hour) are derived via division/modulo.
/// Natural `u64` ordering equals chronological ordering.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTime(u64);

impl SimTime {
    /// Create from a raw tick count.
    pub fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Start of a day (day 0, hour 0).
    pub fn from_day(day: u64) -> Self {
        Self(day * TICKS_PER_DAY)
    }

    /// Full specification: day-of-world (0-based) and hour (0–23).
    pub fn new(day: u64, hour: u64) -> Self {
        debug_assert!(hour < HOURS_PER_DAY, "hour out of range: {hour}");
        Self(day * TICKS_PER_DAY + hour * TICKS_PER_HOUR)
    }

    /// The inner tick count.
    pub fn as_ticks(self) -> u64 {
        self.0
    }

    /// Day of world (0-based).
    pub fn day(self) -> u64 {
        self.0 / TICKS_PER_DAY
    }

    /// Hour of day (0–23).
    pub fn hour(self) -> u64 {
        (self.0 % TICKS_PER_DAY) / TICKS_PER_HOUR
    }

    /// Year of world (0-based, 60-day years).
    pub fn year(self) -> u64 {
        self.0 / TICKS_PER_YEAR
    }

    /// Season within the year (0–3).
    pub fn season(self) -> u64 {
        (self.0 % TICKS_PER_YEAR) / TICKS_PER_SEASON
    }

    /// Day within the season (0–14).
    pub fn day_of_season(self) -> u64 {
        (self.0 % TICKS_PER_SEASON) / TICKS_PER_DAY
    }

    /// True at the first tick of a day.
    pub fn is_day_start(self) -> bool {
        self.0.is_multiple_of(TICKS_PER_DAY)
    }

    /// Whole days elapsed between `earlier` and `self` (saturating).
    pub fn days_since(self, earlier: SimTime) -> u64 {
        (self.0 / TICKS_PER_DAY).saturating_sub(earlier.0 / TICKS_PER_DAY)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{} {:02}h", self.day(), self.hour())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_new() {
        let t = SimTime::new(42, 13);
        assert_eq!(t.day(), 42);
        assert_eq!(t.hour(), 13);
    }

    #[test]
    fn from_day_defaults() {
        let t = SimTime::from_day(7);
        assert_eq!(t.day(), 7);
        assert_eq!(t.hour(), 0);
        assert!(t.is_day_start());
    }

    #[test]
    fn from_ticks_round_trip() {
        let t = SimTime::new(100, 23);
        let raw = t.as_ticks();
        assert_eq!(SimTime::from_ticks(raw), t);
    }

    #[test]
    fn chronological_ordering() {
        let a = SimTime::new(1, 0);
        let b = SimTime::new(1, 5);
        let c = SimTime::new(2, 0);
        let d = SimTime::new(61, 0);
        assert!(a < b);
        assert!(b < c);
        assert!(c < d);
    }

    #[test]
    fn season_derivation() {
        assert_eq!(SimTime::from_day(0).season(), 0);
        assert_eq!(SimTime::from_day(14).season(), 0);
        assert_eq!(SimTime::from_day(15).season(), 1);
        assert_eq!(SimTime::from_day(59).season(), 3);
        assert_eq!(SimTime::from_day(59).day_of_season(), 14);
        // Day 60 → year 1, season 0
        assert_eq!(SimTime::from_day(60).year(), 1);
        assert_eq!(SimTime::from_day(60).season(), 0);
    }

    #[test]
    fn is_day_start() {
        assert!(SimTime::from_day(3).is_day_start());
        assert!(!SimTime::from_ticks(3 * TICKS_PER_DAY + 1).is_day_start());
        assert!(!SimTime::new(3, 1).is_day_start());
    }

    #[test]
    fn days_since() {
        let a = SimTime::from_day(10);
        let b = SimTime::from_day(14);
        assert_eq!(b.days_since(a), 4);
        assert_eq!(a.days_since(b), 0); // saturates
        // Partial days floor
        let c = SimTime::from_ticks(14 * TICKS_PER_DAY + TICKS_PER_DAY - 1);
        assert_eq!(c.days_since(a), 4);
    }

    #[test]
    fn display_format() {
        assert_eq!(SimTime::from_day(3).to_string(), "D3 00h");
        assert_eq!(SimTime::new(42, 7).to_string(), "D42 07h");
    }

    #[test]
    fn constants_are_consistent() {
        assert_eq!(TICKS_PER_DAY, 60_000);
        assert_eq!(TICKS_PER_SEASON, TICKS_PER_DAY * DAYS_PER_SEASON);
        assert_eq!(TICKS_PER_YEAR, TICKS_PER_SEASON * SEASONS_PER_YEAR);
        assert_eq!(DAYS_PER_YEAR, 60);
    }
}
