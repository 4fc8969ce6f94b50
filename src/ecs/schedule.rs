use bevy_ecs::schedule::{ExecutorKind, IntoScheduleConfigs, Schedule, ScheduleLabel, SystemSet};

use super::clock::advance_clock;

/// Schedule label for the main simulation tick.
/// Run manually each tick via `app.world_mut().run_schedule(SimTick)`.
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimTick;

/// Ordered phases within each simulation tick.
///
/// Systems are assigned to phases via `.in_set(SimPhase::Update)` etc.
/// Phases run in declaration order: PreUpdate < Update < PostUpdate < Reactions < Last.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimPhase {
    PreUpdate,
    Update,
    PostUpdate,
    Reactions,
    Last,
}

/// Per-domain system sets within `SimPhase::Update`.
///
/// Cross-domain ordering:
/// ```text
/// Sessions → Detection → Leases → Events
/// ```
///
/// Sessions runs first so teardown triggers fire before anything acts on a
/// scene this tick; the periodic event scheduler runs last so it sees the
/// surviving sessions.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum DomainSet {
    Sessions,
    Detection,
    Leases,
    Events,
}

/// Configure cross-domain ordering within `SimPhase::Update`.
fn configure_domain_ordering(schedule: &mut Schedule) {
    schedule.configure_sets(DomainSet::Sessions.in_set(SimPhase::Update));
    schedule.configure_sets(DomainSet::Detection.in_set(SimPhase::Update));
    schedule.configure_sets(DomainSet::Leases.in_set(SimPhase::Update));
    schedule.configure_sets(DomainSet::Events.in_set(SimPhase::Update));

    schedule.configure_sets(DomainSet::Detection.after(DomainSet::Sessions));
    schedule.configure_sets(DomainSet::Leases.after(DomainSet::Detection));
    schedule.configure_sets(DomainSet::Events.after(DomainSet::Leases));
}

/// Build a configured `SimTick` schedule with phase ordering.
pub fn configure_sim_schedule(executor: ExecutorKind) -> Schedule {
    let mut schedule = Schedule::new(SimTick);
    schedule.set_executor_kind(executor);
    schedule.configure_sets(
        (
            SimPhase::PreUpdate,
            SimPhase::Update,
            SimPhase::PostUpdate,
            SimPhase::Reactions,
            SimPhase::Last,
        )
            .chain(),
    );
    configure_domain_ordering(&mut schedule);
    schedule.add_systems(advance_clock.in_set(SimPhase::Last));
    schedule
}
