use std::collections::{BTreeMap, BTreeSet};

use bevy_ecs::resource::Resource;
use serde::{Deserialize, Serialize};

/// A time-bounded ownership grant over a structure.
///
/// The cost and room are shared by every bed leased in the same
/// transaction; cancellation refunds the room batch once against
/// `total_cost`, not per bed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lease {
    /// Tick at or after which the sweep reverts the structure.
    pub expires_at: u64,
    /// Silver paid for the whole room batch.
    pub total_cost: i64,
    /// Room the leased structure belongs to.
    pub room: u32,
}

/// The world-scoped registry of visit sessions, tracked location property,
/// and leases — exactly the persisted layout, all keyed by stable ids.
///
/// One instance per world. Every consumer validates id liveness through
/// `SimEntityMap` before acting; dangling entries are pruned on load.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct VisitState {
    /// location id → scene-parent id.
    pub scene_parents: BTreeMap<u64, u64>,
    /// location id → live scene id. A location present here has an active
    /// session (uniqueness is the map key).
    pub scenes: BTreeMap<u64, u64>,
    /// Movable resources belonging to a location's original inventory.
    pub tracked_resources: BTreeSet<u64>,
    /// Fixed structures reassigned to the visiting party for the visit.
    pub tracked_structures: Vec<u64>,
    /// structure id → active lease. At most one lease per structure.
    pub leases: BTreeMap<u64, Lease>,
    /// Ticks accumulated toward the next resupply drop.
    pub resupply_counter: u64,
    /// Ticks accumulated toward the next incursion cycle.
    pub incursion_counter: u64,
    /// Current randomized incursion interval, re-rolled after each firing
    /// cycle.
    pub incursion_interval_days: u32,
}

impl Default for VisitState {
    fn default() -> Self {
        Self {
            scene_parents: BTreeMap::new(),
            scenes: BTreeMap::new(),
            tracked_resources: BTreeSet::new(),
            tracked_structures: Vec::new(),
            leases: BTreeMap::new(),
            resupply_counter: 0,
            incursion_counter: 0,
            incursion_interval_days: 3,
        }
    }
}

impl VisitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The live scene id for a location, if a session exists.
    pub fn scene_for(&self, location: u64) -> Option<u64> {
        self.scenes.get(&location).copied()
    }

    /// The location id owning a scene, if any session maps to it.
    pub fn location_of_scene(&self, scene: u64) -> Option<u64> {
        self.scenes
            .iter()
            .find(|&(_, &s)| s == scene)
            .map(|(&loc, _)| loc)
    }

    pub fn has_session(&self, location: u64) -> bool {
        self.scenes.contains_key(&location)
    }

    /// Active sessions as (location, scene) pairs.
    pub fn sessions(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.scenes.iter().map(|(&loc, &scene)| (loc, scene))
    }

    pub fn is_tracked_resource(&self, id: u64) -> bool {
        self.tracked_resources.contains(&id)
    }

    pub fn is_tracked_structure(&self, id: u64) -> bool {
        self.tracked_structures.contains(&id)
    }

    /// Idempotent: re-tracking an already tracked resource is a no-op.
    pub fn track_resource(&mut self, id: u64) {
        self.tracked_resources.insert(id);
    }

    pub fn untrack_resource(&mut self, id: u64) -> bool {
        self.tracked_resources.remove(&id)
    }

    /// Idempotent: membership is checked before pushing.
    pub fn track_structure(&mut self, id: u64) {
        if !self.is_tracked_structure(id) {
            self.tracked_structures.push(id);
        }
    }

    pub fn untrack_structure(&mut self, id: u64) -> bool {
        let before = self.tracked_structures.len();
        self.tracked_structures.retain(|&s| s != id);
        self.tracked_structures.len() != before
    }

    /// Record a lease. No-op if the structure is already leased.
    pub fn grant_lease(&mut self, structure: u64, lease: Lease) {
        self.leases.entry(structure).or_insert(lease);
    }

    pub fn is_leased(&self, structure: u64) -> bool {
        self.leases.contains_key(&structure)
    }
}
