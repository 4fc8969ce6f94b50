use bevy_ecs::component::Component;

/// Core identity component present on every ECS entity that maps to a
/// simulation object. The `id` is the stable identifier stored in the
/// persisted registries (`VisitState`); the `Entity` value never is.
#[derive(Component, Debug, Clone)]
pub struct SimEntity {
    pub id: u64,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Marker components — one per entity kind
// ---------------------------------------------------------------------------

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Faction;

/// A point of interest on the world map that can be entered.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Location;

/// Persistent wrapper owning a live scene (survives while the session does).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SceneParent;

/// The live, mutable materialization of a location.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Scene;

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Agent;

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ItemMarker;

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Structure;

// ---------------------------------------------------------------------------
// Meta-markers
// ---------------------------------------------------------------------------

/// Marks the requester (player-controlled) faction. Exactly one faction
/// carries this marker per world.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct IsPlayer;
