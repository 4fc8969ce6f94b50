use bevy_ecs::component::Component;

/// The currency kind used for lease and trade payments.
pub const SILVER_KIND: &str = "Silver";
/// The kind materialized by supply drops.
pub const RATION_KIND: &str = "Ration";

/// State of a movable item stack.
#[derive(Component, Debug, Clone)]
pub struct ItemState {
    /// Item kind name (the host's def name, e.g. `"Silver"`, `"Ration"`).
    pub kind: String,
    pub stack: u32,
    /// Market value per unit, the basis of scaled theft penalties.
    pub unit_value: f64,
    /// Nutrition per unit; zero for inedible kinds.
    pub nutrition: f64,
    /// Forbidden items are ignored by the visiting party's automation.
    /// Tracked location inventory is forbidden by default on capture.
    pub forbidden: bool,
    /// Stable id of the agent carrying this stack, if any. Carried stacks
    /// stay located in the scene but are never captured as location
    /// inventory.
    pub carried_by: Option<u64>,
    pub position: (i32, i32),
}

impl ItemState {
    pub fn new(kind: impl Into<String>, stack: u32, unit_value: f64) -> Self {
        Self {
            kind: kind.into(),
            stack,
            unit_value,
            nutrition: 0.0,
            forbidden: false,
            carried_by: None,
            position: (0, 0),
        }
    }

    pub fn silver(stack: u32) -> Self {
        Self::new(SILVER_KIND, stack, 1.0)
    }

    pub fn with_nutrition(mut self, nutrition: f64) -> Self {
        self.nutrition = nutrition;
        self
    }

    pub fn carried_by(mut self, agent: u64) -> Self {
        self.carried_by = Some(agent);
        self
    }

    pub fn is_food(&self) -> bool {
        self.nutrition > 0.0
    }
}
