use bevy_ecs::component::Component;

/// Faction state relevant to visit sessions and incursion eligibility.
#[derive(Component, Debug, Clone)]
pub struct FactionCore {
    pub defeated: bool,
    /// Hidden factions never appear as incursion candidates.
    pub hidden: bool,
    /// Whether the faction can field raid forces at all.
    pub raid_capable: bool,
}

impl Default for FactionCore {
    fn default() -> Self {
        Self {
            defeated: false,
            hidden: false,
            raid_capable: true,
        }
    }
}
