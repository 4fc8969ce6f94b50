pub mod applicator;
mod apply_events;
mod apply_goodwill;
mod apply_leases;
mod apply_sessions;
mod apply_trade;

use bevy_ecs::message::Message;

use crate::ecs::events::TeardownReason;
use crate::ecs::resources::event_log::{EventKind, ParticipantRole};
use crate::ecs::resources::goodwill::GoodwillReason;

pub use applicator::apply_visit_commands;

/// A command describing an intended state change in the visit engine.
///
/// Systems and the host UI emit these via `MessageWriter<VisitCommand>`.
/// The centralized applicator in `SimPhase::PostUpdate` processes them:
/// applies state changes, records audit trail entries in `EventLog`, and
/// emits `VisitReactiveEvent` messages. Commands that hit a precondition
/// failure emit `CommandRejected` and change nothing.
#[derive(Message, Clone, Debug)]
pub struct VisitCommand {
    /// The intent — what state change to apply.
    pub kind: VisitCommandKind,
    /// Human-readable description for the EventLog.
    pub description: String,
    /// Causal chain: event_id of the event that triggered this command.
    pub caused_by: Option<u64>,
    /// What EventKind to record in the EventLog (ignored for bookkeeping commands).
    pub event_kind: EventKind,
    /// Stable ids involved and their roles.
    pub participants: Vec<(u64, ParticipantRole)>,
    /// Structured metadata for the Event.data field.
    pub event_data: serde_json::Value,
    /// If true, no Event entry is recorded.
    bookkeeping: bool,
}

impl VisitCommand {
    /// Create a command that records a full Event in the log when applied.
    pub fn new(
        kind: VisitCommandKind,
        event_kind: EventKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            caused_by: None,
            event_kind,
            participants: Vec::new(),
            event_data: serde_json::Value::Null,
            bookkeeping: false,
        }
    }

    /// Create a bookkeeping-only command (no Event entry).
    pub fn bookkeeping(kind: VisitCommandKind) -> Self {
        Self {
            kind,
            description: String::new(),
            caused_by: None,
            // Unused for bookkeeping, but needs a value
            event_kind: EventKind::Custom("bookkeeping".to_string()),
            participants: Vec::new(),
            event_data: serde_json::Value::Null,
            bookkeeping: true,
        }
    }

    /// Whether this command is bookkeeping-only (no Event entry).
    pub fn is_bookkeeping(&self) -> bool {
        self.bookkeeping
    }

    /// Set the causal chain event_id.
    pub fn caused_by(mut self, event_id: u64) -> Self {
        self.caused_by = Some(event_id);
        self
    }

    /// Add a participant.
    pub fn with_participant(mut self, entity_id: u64, role: ParticipantRole) -> Self {
        self.participants.push((entity_id, role));
        self
    }

    /// Set the event data.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.event_data = data;
        self
    }
}

/// All possible state-change intents.
#[derive(Clone, Debug)]
pub enum VisitCommandKind {
    // -- Session cache --
    /// Create-or-reuse the session for a location and move the party in.
    EnterLocation { location: u64, party: Vec<u64> },
    /// Idempotent session teardown; cascades into registry and lease purge.
    TeardownLocation {
        location: u64,
        reason: TeardownReason,
    },

    // -- Ownership registry / reputation --
    AdjustGoodwill {
        faction: u64,
        delta: i32,
        reason: GoodwillReason,
    },
    UntrackResource { resource: u64 },
    /// Untracking a structure also drops any lease on it.
    UntrackStructure { structure: u64 },

    // -- Leasing and trade --
    RentBeds { location: u64, days: u32 },
    CancelLease { location: u64, room: u32 },
    SweepExpiredLeases,
    Trade {
        location: u64,
        purchases: Vec<(String, u32)>,
    },

    // -- Periodic events --
    DropSupplies {
        location: u64,
        units: u32,
        candidates: Vec<(i32, i32)>,
    },
    TriggerIncursion {
        location: u64,
        faction: u64,
        forced: bool,
    },
}
