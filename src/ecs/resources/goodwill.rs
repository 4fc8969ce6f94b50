use std::collections::{BTreeMap, BTreeSet};

use bevy_ecs::resource::Resource;
use serde::{Deserialize, Serialize};

/// Why goodwill changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoodwillReason {
    Theft,
    Vandalism,
    Encroachment,
}

/// Magnitude of a scaled reputation penalty.
///
/// `round(base + scaling × unit_value × quantity)`. Pure and deterministic;
/// non-decreasing in both value and quantity, and never below `base` for
/// non-negative inputs.
pub fn penalty(base: i32, scaling: f64, unit_value: f64, quantity: u32) -> i32 {
    (base as f64 + scaling * unit_value * quantity as f64).round() as i32
}

/// One recorded goodwill adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoodwillEntry {
    pub faction: u64,
    pub delta: i32,
    pub reason: GoodwillReason,
    pub tick: u64,
}

/// The reputation store interface: per-faction running totals (clamped to
/// [-100, 100]) plus an append-only adjustment record. Totals are measured
/// from the requester's point of view.
#[derive(Resource, Debug, Clone, Default)]
pub struct GoodwillLedger {
    totals: BTreeMap<u64, i32>,
    pub entries: Vec<GoodwillEntry>,
}

impl GoodwillLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adjust(&mut self, faction: u64, delta: i32, reason: GoodwillReason, tick: u64) {
        let total = self.totals.entry(faction).or_insert(0);
        *total = (*total + delta).clamp(-100, 100);
        self.entries.push(GoodwillEntry {
            faction,
            delta,
            reason,
            tick,
        });
    }

    pub fn total(&self, faction: u64) -> i32 {
        self.totals.get(&faction).copied().unwrap_or(0)
    }
}

/// Symmetric hostile-pair registry between factions.
#[derive(Resource, Debug, Clone, Default)]
pub struct FactionRelations {
    hostile: BTreeSet<(u64, u64)>,
}

fn ordered(a: u64, b: u64) -> (u64, u64) {
    if a <= b { (a, b) } else { (b, a) }
}

impl FactionRelations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_hostile(&mut self, a: u64, b: u64) {
        self.hostile.insert(ordered(a, b));
    }

    pub fn set_friendly(&mut self, a: u64, b: u64) {
        self.hostile.remove(&ordered(a, b));
    }

    pub fn are_hostile(&self, a: u64, b: u64) -> bool {
        self.hostile.contains(&ordered(a, b))
    }
}
