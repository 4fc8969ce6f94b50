use bevy_ecs::component::Component;
use serde::{Deserialize, Serialize};

/// Lifecycle of a location with respect to visit sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationLifecycle {
    Unvisited,
    Active,
    TornDown,
}

/// State of a world-map location.
#[derive(Component, Debug, Clone)]
pub struct LocationState {
    /// Stable id of the controlling faction.
    pub faction: u64,
    pub lifecycle: LocationLifecycle,
}

impl LocationState {
    pub fn new(faction: u64) -> Self {
        Self {
            faction,
            lifecycle: LocationLifecycle::Unvisited,
        }
    }
}

/// State of a scene parent — the persistent wrapper created alongside a
/// session.
#[derive(Component, Debug, Clone)]
pub struct SceneParentState {
    /// Stable id of the location this parent wraps.
    pub location: u64,
    /// Tick before which the incursion cycle skips this session. Refreshed
    /// on every entry so a visit is not instantly ambushed by a stale timer.
    pub threat_check_at: u64,
}
