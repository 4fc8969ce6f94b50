pub mod app;
pub mod clock;
pub mod commands;
pub mod components;
pub mod conditions;
pub mod events;
pub mod relationships;
pub mod resources;
pub mod scene;
pub mod schedule;
pub mod spawn;
pub mod systems;
pub mod test_helpers;
pub mod time;

pub use app::{
    build_visit_app, build_visit_app_deterministic, build_visit_app_seeded,
    build_visit_app_with_executor,
};
pub use clock::SimClock;
pub use commands::{VisitCommand, VisitCommandKind};
pub use events::{GameplayEvent, TeardownReason, VisitReactiveEvent};
pub use schedule::{DomainSet, SimPhase, SimTick};
pub use time::SimTime;
