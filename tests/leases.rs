mod common;

use common::{enter_with_party, setup, VisitFixture};
use settlement_visits::ecs::commands::{VisitCommand, VisitCommandKind};
use settlement_visits::ecs::components::{ItemState, StructureState, SILVER_KIND};
use settlement_visits::ecs::events::{RejectReason, VisitReactiveEvent};
use settlement_visits::ecs::resources::event_log::EventKind;
use settlement_visits::ecs::resources::{SimEntityMap, VisitConfig, VisitState};
use settlement_visits::ecs::test_helpers::{drain_reactive, tick, tick_days, write_command};

fn rent_cmd(location: u64, days: u32) -> VisitCommand {
    VisitCommand::new(
        VisitCommandKind::RentBeds { location, days },
        EventKind::LeaseGranted,
        "Rent a room",
    )
}

fn cancel_cmd(location: u64, room: u32) -> VisitCommand {
    VisitCommand::new(
        VisitCommandKind::CancelLease { location, room },
        EventKind::LeaseCancelled,
        "Cancel the room lease",
    )
}

/// Total silver currently held by anything in the world.
fn total_silver(fx: &mut VisitFixture) -> u32 {
    let mut query = fx.app.world_mut().query::<&ItemState>();
    query
        .iter(fx.app.world())
        .filter(|item| item.kind == SILVER_KIND)
        .map(|item| item.stack)
        .sum()
}

#[test]
fn renting_takes_the_biggest_room() {
    let mut fx = setup();
    enter_with_party(&mut fx, 200);
    drain_reactive(&mut fx.app);

    write_command(fx.app.world_mut(), rent_cmd(fx.location, 5));
    tick(&mut fx.app);

    let reactive = drain_reactive(&mut fx.app);
    let granted = reactive.iter().find_map(|e| match e {
        VisitReactiveEvent::LeaseGranted {
            room,
            beds,
            total_cost,
            ..
        } => Some((*room, beds.clone(), *total_cost)),
        _ => None,
    });
    let (room, beds, total_cost) = granted.expect("lease granted");

    // The two-bed room wins over the one-bed room
    assert_eq!(room, 1);
    assert_eq!(beds.len(), 2);
    // 30 silver per day × 5 days
    assert_eq!(total_cost, 150);
    assert_eq!(total_silver(&mut fx), 50);

    let state = fx.app.world().resource::<VisitState>().clone();
    assert_eq!(state.leases.len(), 2);
    let map = fx.app.world().resource::<SimEntityMap>().clone();
    for bed in &beds {
        assert!(state.is_leased(*bed));
        assert!(state.is_tracked_structure(*bed));
        let structure = fx
            .app
            .world()
            .get::<StructureState>(map.bevy(*bed))
            .unwrap();
        assert_eq!(structure.faction, fx.player);
    }
}

#[test]
fn renting_rejected_when_funds_short() {
    let mut fx = setup();
    enter_with_party(&mut fx, 100);
    drain_reactive(&mut fx.app);

    write_command(fx.app.world_mut(), rent_cmd(fx.location, 5));
    tick(&mut fx.app);

    let reactive = drain_reactive(&mut fx.app);
    assert!(reactive.iter().any(|e| matches!(
        e,
        VisitReactiveEvent::CommandRejected {
            reason: RejectReason::InsufficientFunds { required: 150 },
            ..
        }
    )));
    // Nothing changed: no lease, silver untouched
    assert!(fx.app.world().resource::<VisitState>().leases.is_empty());
    assert_eq!(total_silver(&mut fx), 100);
}

#[test]
fn renting_rejected_when_disabled() {
    let mut fx = setup();
    enter_with_party(&mut fx, 200);
    fx.app
        .world_mut()
        .resource_mut::<VisitConfig>()
        .enable_leasing = false;
    drain_reactive(&mut fx.app);

    write_command(fx.app.world_mut(), rent_cmd(fx.location, 5));
    tick(&mut fx.app);

    let reactive = drain_reactive(&mut fx.app);
    assert!(reactive.iter().any(|e| matches!(
        e,
        VisitReactiveEvent::CommandRejected {
            reason: RejectReason::LeasingDisabled,
            ..
        }
    )));
}

#[test]
fn lease_days_are_clamped() {
    let mut fx = setup();
    enter_with_party(&mut fx, 2000);
    drain_reactive(&mut fx.app);

    // 99 days clamps to the 30-day maximum: 30 × 30 = 900
    write_command(fx.app.world_mut(), rent_cmd(fx.location, 99));
    tick(&mut fx.app);

    let reactive = drain_reactive(&mut fx.app);
    assert!(reactive.iter().any(|e| matches!(
        e,
        VisitReactiveEvent::LeaseGranted {
            total_cost: 900,
            ..
        }
    )));
}

#[test]
fn cancelling_refunds_prorated_once_per_room() {
    let mut fx = setup();
    enter_with_party(&mut fx, 200);
    write_command(fx.app.world_mut(), rent_cmd(fx.location, 5));
    tick(&mut fx.app);
    drain_reactive(&mut fx.app);

    // One tick later: 4 whole days remain of 5 → 40% of 150 = 60
    write_command(fx.app.world_mut(), cancel_cmd(fx.location, 1));
    tick(&mut fx.app);

    let reactive = drain_reactive(&mut fx.app);
    assert!(reactive.iter().any(|e| matches!(
        e,
        VisitReactiveEvent::LeaseCancelled {
            room: 1,
            refund: 60,
            ..
        }
    )));

    // 200 - 150 + 60
    assert_eq!(total_silver(&mut fx), 110);

    let state = fx.app.world().resource::<VisitState>().clone();
    assert!(state.leases.is_empty());

    // Beds back with the hosts
    let host = fx.host;
    let mut query = fx.app.world_mut().query::<&StructureState>();
    for structure in query.iter(fx.app.world()) {
        if structure.is_bed() {
            assert_eq!(structure.faction, host);
        }
    }
}

#[test]
fn early_cancel_refunds_the_full_cost() {
    let mut fx = setup();
    enter_with_party(&mut fx, 1000);
    write_command(fx.app.world_mut(), rent_cmd(fx.location, 30));
    tick(&mut fx.app);
    drain_reactive(&mut fx.app);

    // 29 whole days remain; 29 × 10% caps at 100% of the 900 cost
    write_command(fx.app.world_mut(), cancel_cmd(fx.location, 1));
    tick(&mut fx.app);

    let reactive = drain_reactive(&mut fx.app);
    assert!(reactive.iter().any(|e| matches!(
        e,
        VisitReactiveEvent::LeaseCancelled { refund: 900, .. }
    )));
    assert_eq!(total_silver(&mut fx), 1000);
}

#[test]
fn cancelling_unleased_room_is_rejected() {
    let mut fx = setup();
    enter_with_party(&mut fx, 200);
    drain_reactive(&mut fx.app);

    write_command(fx.app.world_mut(), cancel_cmd(fx.location, 2));
    tick(&mut fx.app);

    let reactive = drain_reactive(&mut fx.app);
    assert!(reactive.iter().any(|e| matches!(
        e,
        VisitReactiveEvent::CommandRejected {
            reason: RejectReason::NoEligibleRooms,
            ..
        }
    )));
}

#[test]
fn expired_leases_swept_daily() {
    let mut fx = setup();
    enter_with_party(&mut fx, 200);
    write_command(fx.app.world_mut(), rent_cmd(fx.location, 1));
    tick(&mut fx.app);

    // Two days out the daily sweep has seen the expiry
    tick_days(&mut fx.app, 2);

    let state = fx.app.world().resource::<VisitState>().clone();
    assert!(state.leases.is_empty());
    assert!(state.tracked_structures.len() <= 1); // recreation only

    let mut query = fx.app.world_mut().query::<&StructureState>();
    for structure in query.iter(fx.app.world()) {
        if structure.is_bed() {
            assert_eq!(structure.faction, fx.host);
            assert_eq!(structure.occupant, None);
        }
    }

    let log = fx
        .app
        .world()
        .resource::<settlement_visits::ecs::resources::EventLog>();
    assert!(log.events.iter().any(|e| e.kind == EventKind::LeasesExpired));
}

#[test]
fn renting_again_after_sweep_works() {
    let mut fx = setup();
    enter_with_party(&mut fx, 500);
    write_command(fx.app.world_mut(), rent_cmd(fx.location, 1));
    tick(&mut fx.app);
    tick_days(&mut fx.app, 2);
    drain_reactive(&mut fx.app);

    write_command(fx.app.world_mut(), rent_cmd(fx.location, 1));
    tick(&mut fx.app);

    let reactive = drain_reactive(&mut fx.app);
    assert!(reactive
        .iter()
        .any(|e| matches!(e, VisitReactiveEvent::LeaseGranted { room: 1, .. })));
}
