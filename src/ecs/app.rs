use bevy_app::App;
use bevy_ecs::message::MessageRegistry;
use bevy_ecs::schedule::{ExecutorKind, IntoScheduleConfigs};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::clock::SimClock;
use super::commands::{VisitCommand, apply_visit_commands};
use super::events::{GameplayEvent, VisitReactiveEvent};
use super::resources::{
    EcsIdGenerator, EventLog, EventsRng, FactionRelations, GoodwillLedger, SimEntityMap, SimRng,
    VisitConfig, VisitState, distribute_rng,
};
use super::scene::SceneServices;
use super::schedule::{SimPhase, configure_sim_schedule};
use super::systems::{DetectionPlugin, EventsPlugin, GoodwillPlugin, LeasesPlugin, SessionsPlugin};

/// Build a headless Bevy app with simulation clock, core resources,
/// message types, the command applicator, and every engine plugin.
///
/// Manual tick control:
/// ```no_run
/// # use settlement_visits::ecs::{build_visit_app, SimTick};
/// let mut app = build_visit_app(0);
/// for _ in 0..60_000 {  // one in-game day of ticks
///     app.world_mut().run_schedule(SimTick);
/// }
/// ```
pub fn build_visit_app(start_day: u64) -> App {
    build_visit_app_seeded(start_day, 42)
}

/// Build a headless Bevy app with a specific RNG seed and multi-threaded executor.
pub fn build_visit_app_seeded(start_day: u64, seed: u64) -> App {
    build_visit_app_with_executor(start_day, seed, ExecutorKind::MultiThreaded)
}

/// Build a headless Bevy app with single-threaded executor for reproducible determinism.
///
/// Use this when exact RNG consumption order across ticks must be identical across runs.
pub fn build_visit_app_deterministic(start_day: u64, seed: u64) -> App {
    build_visit_app_with_executor(start_day, seed, ExecutorKind::SingleThreaded)
}

/// Build a headless Bevy app with a specific executor kind.
pub fn build_visit_app_with_executor(start_day: u64, seed: u64, executor: ExecutorKind) -> App {
    let mut app = App::empty();

    // Core resources
    app.insert_resource(SimClock::new(start_day));
    app.insert_resource(EventLog::new());
    app.insert_resource(EcsIdGenerator::default());
    app.insert_resource(SimEntityMap::new());
    app.insert_resource(VisitState::new());
    app.insert_resource(VisitConfig::default());
    app.insert_resource(GoodwillLedger::new());
    app.insert_resource(FactionRelations::new());
    app.insert_resource(SceneServices::default());
    app.insert_resource(SimRng {
        rng: SmallRng::seed_from_u64(seed),
        seed,
    });

    // Per-domain RNG resources (reseeded each tick by distribute_rng)
    app.init_resource::<EventsRng>();

    // Register message types
    MessageRegistry::register_message::<VisitCommand>(app.world_mut());
    MessageRegistry::register_message::<VisitReactiveEvent>(app.world_mut());
    MessageRegistry::register_message::<GameplayEvent>(app.world_mut());

    // Build schedule with message rotation + applicator + RNG distribution
    let mut schedule = configure_sim_schedule(executor);
    schedule.add_systems(bevy_ecs::message::message_update_system.in_set(SimPhase::PreUpdate));
    schedule.add_systems(distribute_rng.in_set(SimPhase::PreUpdate));
    schedule.add_systems(apply_visit_commands.in_set(SimPhase::PostUpdate));
    app.add_schedule(schedule);

    app.add_plugins((
        SessionsPlugin,
        DetectionPlugin,
        LeasesPlugin,
        EventsPlugin,
        GoodwillPlugin,
    ));
    app
}
