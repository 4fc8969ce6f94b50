mod common;

use common::{enter_with_party, setup, write_gameplay, VisitFixture};
use settlement_visits::ecs::commands::{VisitCommand, VisitCommandKind};
use settlement_visits::ecs::components::ItemState;
use settlement_visits::ecs::events::{DepartureMode, DestructionMode, GameplayEvent, WorkActivity};
use settlement_visits::ecs::resources::event_log::EventKind;
use settlement_visits::ecs::resources::goodwill::GoodwillReason;
use settlement_visits::ecs::resources::{
    FactionRelations, GoodwillLedger, VisitConfig, VisitState,
};
use settlement_visits::ecs::spawn::spawn_item;
use settlement_visits::ecs::test_helpers::{tick, tick_hours, write_command};

fn tracked_steel(fx: &VisitFixture) -> u64 {
    *fx.app
        .world()
        .resource::<VisitState>()
        .tracked_resources
        .iter()
        .next()
        .unwrap()
}

fn tracked_recreation(fx: &VisitFixture) -> u64 {
    fx.app.world().resource::<VisitState>().tracked_structures[0]
}

fn goodwill(fx: &VisitFixture) -> i32 {
    fx.app.world().resource::<GoodwillLedger>().total(fx.host)
}

#[test]
fn theft_penalty_scales_with_value_and_quantity() {
    let mut fx = setup();
    let agent = enter_with_party(&mut fx, 0);
    let steel = tracked_steel(&fx);

    write_gameplay(
        &mut fx.app,
        GameplayEvent::WorkCompleted {
            agent,
            target: steel,
            activity: WorkActivity::Haul,
        },
    );
    tick(&mut fx.app);

    // round(5 + 0.1 × 10 × 5) = 10
    assert_eq!(goodwill(&fx), -10);
    assert!(!fx
        .app
        .world()
        .resource::<VisitState>()
        .is_tracked_resource(steel));
}

#[test]
fn building_work_is_not_theft() {
    let mut fx = setup();
    let agent = enter_with_party(&mut fx, 0);
    let steel = tracked_steel(&fx);

    write_gameplay(
        &mut fx.app,
        GameplayEvent::WorkCompleted {
            agent,
            target: steel,
            activity: WorkActivity::Construct,
        },
    );
    tick(&mut fx.app);

    assert_eq!(goodwill(&fx), 0);
    assert!(fx
        .app
        .world()
        .resource::<VisitState>()
        .is_tracked_resource(steel));
}

#[test]
fn host_handling_own_goods_is_not_theft() {
    let mut fx = setup();
    enter_with_party(&mut fx, 0);
    let steel = tracked_steel(&fx);

    // Actor id that maps to no party agent
    write_gameplay(
        &mut fx.app,
        GameplayEvent::WorkCompleted {
            agent: 9999,
            target: steel,
            activity: WorkActivity::Haul,
        },
    );
    tick(&mut fx.app);

    assert_eq!(goodwill(&fx), 0);
    assert!(fx
        .app
        .world()
        .resource::<VisitState>()
        .is_tracked_resource(steel));
}

#[test]
fn caravan_excess_over_carried_goods_is_theft() {
    let mut fx = setup();
    enter_with_party(&mut fx, 0);
    let steel = tracked_steel(&fx);

    write_gameplay(
        &mut fx.app,
        GameplayEvent::CaravanDeparted {
            location: fx.location,
            mode: DepartureMode::Overland,
            manifest: vec![("Steel".to_string(), 3)],
        },
    );
    tick(&mut fx.app);

    // round(5 + 0.1 × 10 × 3) = 8
    assert_eq!(goodwill(&fx), -8);
    assert!(!fx
        .app
        .world()
        .resource::<VisitState>()
        .is_tracked_resource(steel));
}

#[test]
fn caravan_covered_by_carried_goods_is_clean() {
    let mut fx = setup();
    let player = fx.player;
    let world = fx.app.world_mut();
    let agent =
        settlement_visits::ecs::spawn::spawn_agent(world, "Porter", player, None);
    spawn_item(
        world,
        None,
        ItemState::new("Steel", 3, 10.0).carried_by(agent),
    );
    write_command(
        world,
        VisitCommand::new(
            VisitCommandKind::EnterLocation {
                location: fx.location,
                party: vec![agent],
            },
            EventKind::SessionOpened,
            "Party enters with its own steel",
        ),
    );
    tick(&mut fx.app);
    let steel = tracked_steel(&fx);

    write_gameplay(
        &mut fx.app,
        GameplayEvent::CaravanDeparted {
            location: fx.location,
            mode: DepartureMode::Vehicle,
            manifest: vec![("Steel".to_string(), 3)],
        },
    );
    tick(&mut fx.app);

    assert_eq!(goodwill(&fx), 0);
    assert!(fx
        .app
        .world()
        .resource::<VisitState>()
        .is_tracked_resource(steel));
}

#[test]
fn deconstruction_is_vandalism() {
    let mut fx = setup();
    enter_with_party(&mut fx, 0);
    let recreation = tracked_recreation(&fx);

    write_gameplay(
        &mut fx.app,
        GameplayEvent::StructureDestroyed {
            structure: recreation,
            mode: DestructionMode::Deconstructed,
        },
    );
    tick(&mut fx.app);

    assert_eq!(goodwill(&fx), -5);
    assert!(!fx
        .app
        .world()
        .resource::<VisitState>()
        .is_tracked_structure(recreation));
}

#[test]
fn flat_penalties_ignore_the_scaled_tuning() {
    let mut fx = setup();
    let agent = enter_with_party(&mut fx, 0);
    let steel = tracked_steel(&fx);
    let recreation = tracked_recreation(&fx);
    fx.app
        .world_mut()
        .resource_mut::<VisitConfig>()
        .base_penalty = 20;

    // Deconstruction stays at the fixed -5
    write_gameplay(
        &mut fx.app,
        GameplayEvent::StructureDestroyed {
            structure: recreation,
            mode: DestructionMode::Deconstructed,
        },
    );
    tick(&mut fx.app);
    assert_eq!(goodwill(&fx), -5);

    // ...while scaled theft picks up the new base: round(20 + 0.1 × 10 × 5) = 25
    write_gameplay(
        &mut fx.app,
        GameplayEvent::WorkCompleted {
            agent,
            target: steel,
            activity: WorkActivity::Haul,
        },
    );
    tick(&mut fx.app);
    assert_eq!(goodwill(&fx), -30);
}

#[test]
fn combat_destruction_untracks_without_penalty() {
    let mut fx = setup();
    enter_with_party(&mut fx, 0);
    let recreation = tracked_recreation(&fx);

    write_gameplay(
        &mut fx.app,
        GameplayEvent::StructureDestroyed {
            structure: recreation,
            mode: DestructionMode::Destroyed,
        },
    );
    tick(&mut fx.app);

    assert_eq!(goodwill(&fx), 0);
    assert!(!fx
        .app
        .world()
        .resource::<VisitState>()
        .is_tracked_structure(recreation));
}

#[test]
fn minify_is_scaled_theft() {
    let mut fx = setup();
    enter_with_party(&mut fx, 0);
    let recreation = tracked_recreation(&fx);

    write_gameplay(
        &mut fx.app,
        GameplayEvent::StructureMinified {
            structure: recreation,
        },
    );
    tick(&mut fx.app);

    // round(5 + 0.1 × 60 × 1) = 11
    assert_eq!(goodwill(&fx), -11);
    assert!(!fx
        .app
        .world()
        .resource::<VisitState>()
        .is_tracked_structure(recreation));
}

#[test]
fn building_on_host_ground_is_encroachment() {
    let mut fx = setup();
    enter_with_party(&mut fx, 0);

    write_gameplay(
        &mut fx.app,
        GameplayEvent::ConstructionCompleted {
            location: fx.location,
            builder_faction: fx.player,
        },
    );
    tick(&mut fx.app);

    assert_eq!(goodwill(&fx), -5);
    let ledger = fx.app.world().resource::<GoodwillLedger>();
    assert!(matches!(
        ledger.entries.last().unwrap().reason,
        GoodwillReason::Encroachment
    ));
}

#[test]
fn mining_host_ground_is_vandalism() {
    let mut fx = setup();
    enter_with_party(&mut fx, 0);

    write_gameplay(
        &mut fx.app,
        GameplayEvent::MiningCompleted {
            location: fx.location,
            miner_faction: fx.player,
        },
    );
    tick(&mut fx.app);

    assert_eq!(goodwill(&fx), -5);
}

#[test]
fn master_gate_disables_penalties_but_still_untracks() {
    let mut fx = setup();
    let agent = enter_with_party(&mut fx, 0);
    let steel = tracked_steel(&fx);
    fx.app
        .world_mut()
        .resource_mut::<VisitConfig>()
        .enable_penalties = false;

    write_gameplay(
        &mut fx.app,
        GameplayEvent::WorkCompleted {
            agent,
            target: steel,
            activity: WorkActivity::Haul,
        },
    );
    tick(&mut fx.app);

    assert_eq!(goodwill(&fx), 0);
    assert!(!fx
        .app
        .world()
        .resource::<VisitState>()
        .is_tracked_resource(steel));
}

#[test]
fn hostility_threshold_ends_the_visit() {
    let mut fx = setup();
    enter_with_party(&mut fx, 0);

    write_command(
        fx.app.world_mut(),
        VisitCommand::new(
            VisitCommandKind::AdjustGoodwill {
                faction: fx.host,
                delta: -80,
                reason: GoodwillReason::Theft,
            },
            EventKind::GoodwillPenalty,
            "Grand theft",
        ),
    );
    tick(&mut fx.app);

    // -80 is past the -75 threshold: the hosts turn hostile
    assert!(fx
        .app
        .world()
        .resource::<FactionRelations>()
        .are_hostile(fx.host, fx.player));

    // ...and the hourly check cedes the session back to them
    tick_hours(&mut fx.app, 1);
    assert!(!fx.app.world().resource::<VisitState>().has_session(fx.location));
}
