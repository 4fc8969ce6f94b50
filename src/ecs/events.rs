use bevy_ecs::message::Message;

use super::resources::goodwill::GoodwillReason;

// ---------------------------------------------------------------------------
// Inbound gameplay events
// ---------------------------------------------------------------------------

/// What the agent was doing when a unit of work completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkActivity {
    Construct,
    Install,
    Haul,
    Mine,
    Other,
}

impl WorkActivity {
    /// Placing/building context never counts as theft.
    pub fn is_building_context(self) -> bool {
        matches!(self, WorkActivity::Construct | WorkActivity::Install)
    }
}

/// How a departing party carries its cargo. Both modes run the same
/// manifest theft check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartureMode {
    Overland,
    Vehicle,
}

/// How a structure was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructionMode {
    /// Deliberate deconstruction — the vandalism case.
    Deconstructed,
    /// Combat damage, fire, etc. Untracks without penalty.
    Destroyed,
}

/// Typed events published by external collaborators (construction, mining,
/// trading, caravan subsystems). The detection systems subscribe to these
/// instead of intercepting the collaborators' internals.
///
/// All entity references are stable ids; handlers validate liveness and
/// skip anything that no longer resolves.
#[derive(Message, Clone, Debug)]
pub enum GameplayEvent {
    /// A unit of work targeting a thing finished.
    WorkCompleted {
        agent: u64,
        target: u64,
        activity: WorkActivity,
    },
    /// A departure transaction confirmed a cargo manifest of
    /// (kind, quantity) pairs.
    CaravanDeparted {
        location: u64,
        mode: DepartureMode,
        manifest: Vec<(String, u32)>,
    },
    StructureDestroyed {
        structure: u64,
        mode: DestructionMode,
    },
    /// A structure was picked up (minified).
    StructureMinified { structure: u64 },
    ConstructionCompleted {
        location: u64,
        builder_faction: u64,
    },
    MiningCompleted { location: u64, miner_faction: u64 },
}

// ---------------------------------------------------------------------------
// Outbound reactive events
// ---------------------------------------------------------------------------

/// What ended a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownReason {
    /// The controlling faction turned hostile and took the location back.
    Ceded,
    VisitorsIncapacitated,
    /// Host-driven scene deinit; skipped while visitors remain.
    SceneDiscarded,
    /// The last requester agent left the scene.
    Evacuated,
}

/// Why a command was rejected. Rejections never change state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    UnknownLocation,
    /// The location is requester-owned or its faction is hostile.
    HostileLocation,
    GenerationFailed,
    LeasingDisabled,
    InsufficientFunds { required: i64 },
    NoEligibleRooms,
    NoEligibleRecipients,
    EmptyPurchase,
}

/// Reactive events emitted by the command applicator for cross-system
/// reactions and host consumption (notices, camera jumps, raid spawning).
///
/// Each variant carries an `event_id` linking back to the EventLog entry
/// that caused it, except rejections, which record no audit event.
#[derive(Message, Clone, Debug)]
pub enum VisitReactiveEvent {
    SessionOpened {
        event_id: u64,
        location: u64,
        scene: u64,
        reused: bool,
    },
    SessionClosed {
        event_id: u64,
        location: u64,
        reason: TeardownReason,
    },
    GoodwillChanged {
        event_id: u64,
        faction: u64,
        delta: i32,
        reason: GoodwillReason,
    },
    LeaseGranted {
        event_id: u64,
        location: u64,
        room: u32,
        beds: Vec<u64>,
        total_cost: i64,
        expires_at: u64,
    },
    LeaseCancelled {
        event_id: u64,
        location: u64,
        room: u32,
        refund: i64,
    },
    /// One notice per sweep listing every reverted structure.
    LeasesExpired { event_id: u64, reverted: Vec<u64> },
    SuppliesDropped {
        event_id: u64,
        location: u64,
        units: u32,
        cell: (i32, i32),
    },
    IncursionTriggered {
        event_id: u64,
        location: u64,
        faction: u64,
        forced: bool,
    },
    TradeCompleted {
        event_id: u64,
        location: u64,
        total_cost: i64,
    },
    CommandRejected { location: u64, reason: RejectReason },
}
