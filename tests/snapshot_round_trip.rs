mod common;

use common::{enter_with_party, setup};
use settlement_visits::ecs::resources::{EventLog, SimEntityMap, VisitState};
use settlement_visits::ecs::test_helpers::{current_tick, tick, tick_days};
use settlement_visits::snapshot::{export_events_jsonl, load_visit_state, save_visit_state};

#[test]
fn session_survives_a_save_and_load() {
    let mut fx = setup();
    enter_with_party(&mut fx, 0);
    tick_days(&mut fx.app, 1);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("visits.json");
    save_visit_state(fx.app.world(), &path).unwrap();

    let before = fx.app.world().resource::<VisitState>().clone();
    let tick_before = current_tick(&fx.app);

    // Wipe the live state, reload from disk into the same world
    fx.app.world_mut().insert_resource(VisitState::new());
    load_visit_state(fx.app.world_mut(), &path).unwrap();

    let after = fx.app.world().resource::<VisitState>().clone();
    assert_eq!(after.scene_parents, before.scene_parents);
    assert_eq!(after.scenes, before.scenes);
    assert_eq!(after.tracked_resources, before.tracked_resources);
    assert_eq!(after.tracked_structures, before.tracked_structures);
    assert_eq!(after.leases, before.leases);
    assert_eq!(current_tick(&fx.app), tick_before);

    // The engine keeps running on the restored state
    tick(&mut fx.app);
    assert!(fx.app.world().resource::<VisitState>().has_session(fx.location));
}

#[test]
fn loading_into_a_gutted_world_prunes_the_session() {
    let mut fx = setup();
    enter_with_party(&mut fx, 0);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("visits.json");
    save_visit_state(fx.app.world(), &path).unwrap();

    // Despawn the scene and the tracked steel out from under the snapshot
    let state = fx.app.world().resource::<VisitState>().clone();
    let scene = state.scene_for(fx.location).unwrap();
    let steel = *state.tracked_resources.iter().next().unwrap();
    for id in [scene, steel] {
        let entity = fx.app.world().resource::<SimEntityMap>().bevy(id);
        fx.app.world_mut().despawn(entity);
        fx.app.world_mut().resource_mut::<SimEntityMap>().remove(id);
    }

    load_visit_state(fx.app.world_mut(), &path).unwrap();

    // Validation drops the dangling session and the dangling resource, but
    // the recreation structure still resolves and stays tracked
    let restored = fx.app.world().resource::<VisitState>();
    assert!(!restored.has_session(fx.location));
    assert!(restored.scene_parents.is_empty());
    assert!(restored.tracked_resources.is_empty());
    assert_eq!(restored.tracked_structures.len(), 1);
}

#[test]
fn event_log_exports_as_jsonl() {
    let mut fx = setup();
    enter_with_party(&mut fx, 0);

    let dir = tempfile::tempdir().unwrap();
    let log = fx.app.world().resource::<EventLog>();
    export_events_jsonl(log, dir.path()).unwrap();

    let events = std::fs::read_to_string(dir.path().join("events.jsonl")).unwrap();
    assert_eq!(events.lines().count(), log.events.len());
    for line in events.lines() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(value.get("kind").is_some());
    }

    let participants =
        std::fs::read_to_string(dir.path().join("event_participants.jsonl")).unwrap();
    assert_eq!(participants.lines().count(), log.participants.len());
}
