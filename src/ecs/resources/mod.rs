pub mod config;
pub mod entity_map;
pub mod event_log;
pub mod goodwill;
pub mod sim_resources;
pub mod visit_state;

pub use config::{TradeGood, VisitConfig};
pub use entity_map::SimEntityMap;
pub use event_log::{EcsEvent, EventKind, EventLog, EventParticipant, ParticipantRole};
pub use goodwill::{FactionRelations, GoodwillEntry, GoodwillLedger, GoodwillReason, penalty};
pub use sim_resources::{EcsIdGenerator, EventsRng, SimRng, distribute_rng};
pub use visit_state::{Lease, VisitState};
