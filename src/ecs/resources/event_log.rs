use bevy_ecs::resource::Resource;
use serde::{Deserialize, Serialize};

use crate::ecs::time::SimTime;

/// What kind of state transition an audit event records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    SessionOpened,
    SessionClosed,
    GoodwillPenalty,
    LeaseGranted,
    LeaseCancelled,
    LeasesExpired,
    SuppliesDropped,
    Incursion,
    Trade,
    Custom(String),
}

/// Role an entity plays in an audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantRole {
    Subject,
    Target,
    Location,
    Faction,
}

/// An audit event record, timestamped at tick resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcsEvent {
    pub id: u64,
    pub kind: EventKind,
    pub timestamp: SimTime,
    pub description: String,
    pub caused_by: Option<u64>,
    pub data: serde_json::Value,
}

/// Links a stable entity id to an event with a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParticipant {
    pub event_id: u64,
    pub entity_id: u64,
    pub role: ParticipantRole,
}

/// Accumulates audit events and participants for the life of the world
/// (exported to JSONL alongside the snapshot).
#[derive(Resource, Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<EcsEvent>,
    pub participants: Vec<EventParticipant>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.participants.clear();
    }
}
