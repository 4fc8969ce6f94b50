#![allow(dead_code)]

use bevy_app::App;
use bevy_ecs::message::Messages;

use settlement_visits::ecs::build_visit_app_deterministic;
use settlement_visits::ecs::commands::{VisitCommand, VisitCommandKind};
use settlement_visits::ecs::components::{AgentCore, FactionCore, ItemState, StructureState};
use settlement_visits::ecs::events::GameplayEvent;
use settlement_visits::ecs::resources::event_log::EventKind;
use settlement_visits::ecs::scene::{SceneServices, ScriptedGenerator};
use settlement_visits::ecs::spawn::{
    spawn_agent, spawn_faction, spawn_item, spawn_location, spawn_player_faction,
};
use settlement_visits::ecs::test_helpers::{tick, write_command};

/// A world with one visiting faction, one host faction, and one host
/// location whose scene is produced by [`install_standard_scene`].
pub struct VisitFixture {
    pub app: App,
    pub player: u64,
    pub host: u64,
    pub location: u64,
}

pub fn setup() -> VisitFixture {
    let mut app = build_visit_app_deterministic(0, 7);
    let world = app.world_mut();
    let player = spawn_player_faction(world, "Expedition");
    let host = spawn_faction(world, "Hill Tribe", FactionCore::default());
    let location = spawn_location(world, "Hilltop", host);
    install_standard_scene(&mut app, host);
    VisitFixture {
        app,
        player,
        host,
        location,
    }
}

/// The standard scripted scene: one host keeper, a steel stack worth
/// penalty-testing (5 × value 10), a two-bed room, a one-bed room, and a
/// recreation structure.
pub fn install_standard_scene(app: &mut App, host: u64) {
    let generator = ScriptedGenerator::new(move |ctx, location| {
        let scene = ctx.spawn_scene(location, 33);
        ctx.spawn_agent(scene, "Keeper", AgentCore::new(host));
        ctx.spawn_item(scene, {
            let mut steel = ItemState::new("Steel", 5, 10.0);
            steel.position = (5, 5);
            steel
        });
        ctx.spawn_structure(scene, StructureState::bed(host, 1).at((8, 8)));
        ctx.spawn_structure(scene, StructureState::bed(host, 1).at((8, 9)));
        ctx.spawn_structure(scene, StructureState::bed(host, 2).at((12, 12)));
        ctx.spawn_structure(scene, StructureState::recreation(host).at((10, 10)));
        // Room floors around the beds
        ctx.mark_room(
            scene,
            1,
            (7..=9).flat_map(|x| (7..=11).map(move |y| (x, y))),
        );
        ctx.mark_room(
            scene,
            2,
            (11..=13).flat_map(|x| (11..=13).map(move |y| (x, y))),
        );
        Ok(scene)
    });
    app.world_mut().insert_resource(SceneServices {
        generator: Box::new(generator),
    });
}

/// Spawn a one-agent party (optionally carrying silver) and enter the
/// fixture location. Runs one tick; returns the agent's stable id.
pub fn enter_with_party(fx: &mut VisitFixture, silver: u32) -> u64 {
    let world = fx.app.world_mut();
    let agent = spawn_agent(world, "Visitor", fx.player, None);
    if silver > 0 {
        spawn_item(world, None, ItemState::silver(silver).carried_by(agent));
    }
    write_command(
        world,
        VisitCommand::new(
            VisitCommandKind::EnterLocation {
                location: fx.location,
                party: vec![agent],
            },
            EventKind::SessionOpened,
            "Party enters the settlement",
        ),
    );
    tick(&mut fx.app);
    agent
}

/// Queue an inbound gameplay event for the next tick's detection pass.
pub fn write_gameplay(app: &mut App, event: GameplayEvent) {
    app.world_mut()
        .resource_mut::<Messages<GameplayEvent>>()
        .write(event);
}
