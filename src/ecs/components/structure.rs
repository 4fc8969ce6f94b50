use bevy_ecs::component::Component;

/// Functional classification of a fixed structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    /// Sleeping quarters — leased via `RentBeds`, never auto-granted.
    Bed,
    /// Recreational buildings — granted to the visitor on entry.
    Recreation,
    Other,
}

/// State of a fixed structure (building) inside a scene.
#[derive(Component, Debug, Clone)]
pub struct StructureState {
    pub kind: StructureKind,
    /// Stable id of the owning faction.
    pub faction: u64,
    /// Room grouping id, used to lease whole rooms at once.
    pub room: u32,
    /// Minifiable structures can be picked up; an uninstalled one counts as
    /// location inventory (a tracked resource), not as a placed structure.
    pub minifiable: bool,
    pub installed: bool,
    /// Prisoner-only beds are never lease-eligible.
    pub prisoner_only: bool,
    /// Stable id of the assigned occupant, cleared when a lease ends.
    pub occupant: Option<u64>,
    /// Market value per unit, the basis of the minify-theft penalty.
    pub unit_value: f64,
    pub position: (i32, i32),
}

impl StructureState {
    pub fn new(kind: StructureKind, faction: u64) -> Self {
        Self {
            kind,
            faction,
            room: 0,
            minifiable: false,
            installed: true,
            prisoner_only: false,
            occupant: None,
            unit_value: 0.0,
            position: (0, 0),
        }
    }

    pub fn bed(faction: u64, room: u32) -> Self {
        Self {
            kind: StructureKind::Bed,
            room,
            minifiable: true,
            unit_value: 40.0,
            ..Self::new(StructureKind::Bed, faction)
        }
    }

    pub fn recreation(faction: u64) -> Self {
        Self {
            unit_value: 60.0,
            ..Self::new(StructureKind::Recreation, faction)
        }
    }

    pub fn at(mut self, position: (i32, i32)) -> Self {
        self.position = position;
        self
    }

    pub fn is_bed(&self) -> bool {
        self.kind == StructureKind::Bed
    }
}
