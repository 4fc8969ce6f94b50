use std::collections::{BTreeMap, BTreeSet};

use bevy_ecs::component::Component;

/// Grid-level state of a live scene: bounds, fog-of-war, the friendly
/// operating ("home") area, and impassable cells.
///
/// Cell coordinates are `(x, y)` with both axes in `0..size`.
#[derive(Component, Debug, Clone)]
pub struct SceneState {
    /// Stable id of the location this scene materializes.
    pub location: u64,
    /// Side length of the square grid.
    pub size: i32,
    /// Cells still obscured by fog. A freshly generated scene is fully
    /// fogged; entry clears fog over room interiors and around structures.
    pub fogged: BTreeSet<(i32, i32)>,
    /// Floor extents of the host's rooms, keyed by room number. Filled in
    /// by the generator; entry clears fog over every room cell.
    pub rooms: BTreeMap<u32, BTreeSet<(i32, i32)>>,
    /// Cells the visiting party's automation treats as safe/workable.
    pub home_area: BTreeSet<(i32, i32)>,
    /// Impassable cells (walls, rock). Everything else is standable.
    pub blocked: BTreeSet<(i32, i32)>,
}

impl SceneState {
    /// A fully fogged, empty scene of the given side length.
    pub fn new(location: u64, size: i32) -> Self {
        let mut fogged = BTreeSet::new();
        for x in 0..size {
            for y in 0..size {
                fogged.insert((x, y));
            }
        }
        Self {
            location,
            size,
            fogged,
            rooms: BTreeMap::new(),
            home_area: BTreeSet::new(),
            blocked: BTreeSet::new(),
        }
    }

    /// Record cells as part of a numbered room's floor.
    pub fn mark_room(&mut self, room: u32, cells: impl IntoIterator<Item = (i32, i32)>) {
        let extent = self.rooms.entry(room).or_default();
        for cell in cells {
            extent.insert(cell);
        }
    }

    pub fn center(&self) -> (i32, i32) {
        (self.size / 2, self.size / 2)
    }

    pub fn in_bounds(&self, cell: (i32, i32)) -> bool {
        cell.0 >= 0 && cell.0 < self.size && cell.1 >= 0 && cell.1 < self.size
    }

    pub fn is_standable(&self, cell: (i32, i32)) -> bool {
        self.in_bounds(cell) && !self.blocked.contains(&cell)
    }

    pub fn is_fogged(&self, cell: (i32, i32)) -> bool {
        self.fogged.contains(&cell)
    }

    pub fn unfog(&mut self, cell: (i32, i32)) {
        self.fogged.remove(&cell);
    }

    /// Clear fog over a cell and its four cardinal neighbors.
    pub fn unfog_with_cardinal(&mut self, cell: (i32, i32)) {
        self.unfog(cell);
        for adj in cardinal_neighbors(cell) {
            if self.in_bounds(adj) {
                self.unfog(adj);
            }
        }
    }

    /// Mark all in-bounds cells within Chebyshev `radius` of `cell` as
    /// part of the home area.
    pub fn mark_home_around(&mut self, cell: (i32, i32), radius: i32) {
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                let adj = (cell.0 + dx, cell.1 + dy);
                if self.in_bounds(adj) {
                    self.home_area.insert(adj);
                }
            }
        }
    }
}

/// The four cardinal neighbors of a cell (may be out of bounds).
pub fn cardinal_neighbors(cell: (i32, i32)) -> [(i32, i32); 4] {
    [
        (cell.0 + 1, cell.1),
        (cell.0 - 1, cell.1),
        (cell.0, cell.1 + 1),
        (cell.0, cell.1 - 1),
    ]
}
