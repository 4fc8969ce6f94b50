use crate::ecs::events::VisitReactiveEvent;
use crate::ecs::resources::goodwill::GoodwillReason;

use super::applicator::ApplyCtx;
use super::VisitCommand;

/// Apply a goodwill adjustment to the ledger and announce it so the
/// diplomacy reaction can check the hostility threshold.
pub(crate) fn apply_adjust_goodwill(
    ctx: &mut ApplyCtx,
    cmd: &VisitCommand,
    faction: u64,
    delta: i32,
    reason: GoodwillReason,
) {
    ctx.goodwill.adjust(faction, delta, reason, ctx.now);
    let event_id = ctx.record_event(cmd);
    ctx.emit(VisitReactiveEvent::GoodwillChanged {
        event_id,
        faction,
        delta,
        reason,
    });
}

/// Drop a resource from the tracking registry. Bookkeeping, no event.
pub(crate) fn apply_untrack_resource(ctx: &mut ApplyCtx, resource: u64) {
    ctx.visit_state.untrack_resource(resource);
}

/// Drop a structure from the tracking registry. Any lease on it is
/// forfeited along with the tracking entry.
pub(crate) fn apply_untrack_structure(ctx: &mut ApplyCtx, structure: u64) {
    ctx.visit_state.untrack_structure(structure);
    ctx.visit_state.leases.remove(&structure);
}
