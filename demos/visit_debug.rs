use settlement_visits::ecs::commands::{VisitCommand, VisitCommandKind};
use settlement_visits::ecs::components::{AgentCore, FactionCore, ItemState, StructureState};
use settlement_visits::ecs::resources::event_log::EventKind;
use settlement_visits::ecs::resources::{EventLog, GoodwillLedger, VisitState};
use settlement_visits::ecs::scene::{SceneServices, ScriptedGenerator};
use settlement_visits::ecs::spawn::{spawn_agent, spawn_faction, spawn_item, spawn_location, spawn_player_faction};
use settlement_visits::ecs::test_helpers::{tick, tick_days, write_command};
use settlement_visits::ecs::build_visit_app_seeded;

fn main() {
    let mut app = build_visit_app_seeded(0, 42);
    let world = app.world_mut();
    let player = spawn_player_faction(world, "Expedition");
    let host = spawn_faction(world, "Hill Tribe", FactionCore::default());
    let location = spawn_location(world, "Hilltop", host);

    let generator = ScriptedGenerator::new(move |ctx, location| {
        let scene = ctx.spawn_scene(location, 33);
        ctx.spawn_agent(scene, "Keeper", AgentCore::new(host));
        ctx.spawn_item(scene, ItemState::new("Steel", 20, 10.0));
        ctx.spawn_structure(scene, StructureState::bed(host, 1).at((8, 8)));
        ctx.spawn_structure(scene, StructureState::bed(host, 1).at((8, 9)));
        ctx.spawn_structure(scene, StructureState::recreation(host).at((10, 10)));
        ctx.mark_room(
            scene,
            1,
            (7..=9).flat_map(|x| (7..=10).map(move |y| (x, y))),
        );
        Ok(scene)
    });
    world.insert_resource(SceneServices { generator: Box::new(generator) });

    let agent = spawn_agent(world, "Scout", player, None);
    spawn_item(world, None, ItemState::silver(500).carried_by(agent));
    write_command(
        world,
        VisitCommand::new(
            VisitCommandKind::EnterLocation { location, party: vec![agent] },
            EventKind::SessionOpened,
            "Scout enters the settlement",
        ),
    );
    tick(&mut app);
    write_command(
        app.world_mut(),
        VisitCommand::new(
            VisitCommandKind::RentBeds { location, days: 5 },
            EventKind::LeaseGranted,
            "Scout rents a room",
        ),
    );
    tick_days(&mut app, 3);

    let state = app.world().resource::<VisitState>();
    eprintln!(
        "sessions={} tracked_resources={} tracked_structures={} leases={}",
        state.scenes.len(),
        state.tracked_resources.len(),
        state.tracked_structures.len(),
        state.leases.len()
    );
    let ledger = app.world().resource::<GoodwillLedger>();
    eprintln!("goodwill vs hosts: {}", ledger.total(host));
    let log = app.world().resource::<EventLog>();
    for event in &log.events {
        eprintln!("[{}] {:?}: {}", event.timestamp, event.kind, event.description);
    }
}
