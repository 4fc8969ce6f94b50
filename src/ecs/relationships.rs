use std::ops::Deref;

use bevy_ecs::component::Component;
use bevy_ecs::entity::Entity;

// ---------------------------------------------------------------------------
// LocatedIn — agent/item/structure → scene
// ---------------------------------------------------------------------------

/// Scene membership. Bevy maintains the reverse index (`LocatedInSources`
/// on the scene), which is what teardown and snapshot validation iterate.
#[derive(Component, Clone, Debug)]
#[relationship(relationship_target = LocatedInSources)]
pub struct LocatedIn(pub Entity);

#[derive(Component, Default, Debug)]
#[relationship_target(relationship = LocatedIn)]
pub struct LocatedInSources(Vec<Entity>);

impl Deref for LocatedInSources {
    type Target = [Entity];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
