use bevy_ecs::world::World;

use crate::ecs::components::common::SimEntity;
use crate::ecs::components::{AgentCore, ItemMarker, ItemState, RATION_KIND};
use crate::ecs::events::{RejectReason, VisitReactiveEvent};
use crate::ecs::relationships::LocatedIn;

use super::applicator::{ApplyCtx, deduct_silver, player_agents_in_scene, player_faction_id};
use super::VisitCommand;

/// Purchase goods from the host faction's stock list. Quantities are
/// clamped to the per-kind maximum and unknown kinds are dropped before
/// pricing; the whole purchase is atomic against the party's silver.
pub(crate) fn apply_trade(
    ctx: &mut ApplyCtx,
    world: &mut World,
    cmd: &VisitCommand,
    location: u64,
    purchases: &[(String, u32)],
) {
    let Some(scene_entity) = ctx
        .visit_state
        .scene_for(location)
        .and_then(|scene| ctx.entity_map.get_bevy(scene))
    else {
        ctx.reject(location, RejectReason::UnknownLocation);
        return;
    };
    let Some(player) = player_faction_id(world) else {
        return;
    };

    // Normalize the basket against the configured stock list
    let mut basket: Vec<(String, u32, f64, i64)> = Vec::new();
    for (kind, quantity) in purchases {
        let Some(good) = ctx.config.trade_goods.iter().find(|g| &g.kind == kind) else {
            continue;
        };
        let quantity = (*quantity).min(ctx.config.max_trade_quantity);
        if quantity == 0 {
            continue;
        }
        let price = good.unit_value.ceil() as i64;
        basket.push((good.kind.clone(), quantity, good.unit_value, price));
    }
    if basket.is_empty() {
        ctx.reject(location, RejectReason::EmptyPurchase);
        return;
    }

    let Some((recipient_id, recipient_entity)) =
        player_agents_in_scene(world, scene_entity, player)
            .first()
            .copied()
    else {
        ctx.reject(location, RejectReason::NoEligibleRecipients);
        return;
    };

    let total_cost: i64 = basket
        .iter()
        .map(|(_, quantity, _, price)| price * *quantity as i64)
        .sum();
    if !deduct_silver(world, &mut ctx.entity_map, scene_entity, player, total_cost) {
        ctx.reject(
            location,
            RejectReason::InsufficientFunds {
                required: total_cost,
            },
        );
        return;
    }

    let position = world
        .get::<AgentCore>(recipient_entity)
        .map(|core| core.position)
        .unwrap_or((0, 0));
    for (kind, quantity, unit_value, _) in basket {
        let mut item = ItemState::new(&kind, quantity, unit_value).carried_by(recipient_id);
        if kind == RATION_KIND {
            item.nutrition = ctx.config.ration_nutrition;
        }
        item.position = position;
        let id = ctx.id_gen.0.next_id();
        let entity = world
            .spawn((
                SimEntity {
                    id,
                    name: format!("{kind}-{id}"),
                },
                ItemMarker,
                item,
                LocatedIn(scene_entity),
            ))
            .id();
        ctx.entity_map.insert(id, entity);
    }

    let event_id = ctx.record_event(cmd);
    ctx.emit(VisitReactiveEvent::TradeCompleted {
        event_id,
        location,
        total_cost,
    });
}
