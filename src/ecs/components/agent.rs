use bevy_ecs::component::Component;

/// State of an agent (pawn) present in a scene.
#[derive(Component, Debug, Clone)]
pub struct AgentCore {
    /// Stable id of the agent's faction.
    pub faction: u64,
    /// Incapacitated agents count toward the all-downed teardown trigger
    /// and cannot receive supply drops.
    pub downed: bool,
    pub position: (i32, i32),
    /// Nutrition consumed per in-game day, used by the resupply cadence.
    pub nutrition_per_day: f64,
}

impl AgentCore {
    pub fn new(faction: u64) -> Self {
        Self {
            faction,
            downed: false,
            position: (0, 0),
            nutrition_per_day: 1.6,
        }
    }
}
