//! Charge initiation and cooldown start.

use hecs::{Entity, World};
use tracing::debug;

use medarot_core::catalog::Catalog;
use medarot_core::components::{ActionIntent, ActionState, Gauge, Parts, Target};
use medarot_core::config::GameConfig;
use medarot_core::enums::{PartSlot, StateKind, TargetPolicy};
use medarot_core::error::ChargeRejection;

use crate::part_info::{GaugeKind, PartInfo};

/// Start charging `slot` on an idle actor.
///
/// `target` is the preselected (entity, slot) for ranged and intervention
/// parts; melee parts ignore it and resolve their target at execution.
/// A rejection leaves the world untouched.
pub fn start_charge(
    world: &mut World,
    catalog: &Catalog,
    config: &GameConfig,
    actor: Entity,
    slot: PartSlot,
    target: Option<(Entity, Option<PartSlot>)>,
) -> Result<(), ChargeRejection> {
    let state = world
        .get::<&ActionState>(actor)
        .map_err(|_| ChargeRejection::UnknownActor)?
        .kind;
    if state != StateKind::Idle {
        return Err(ChargeRejection::NotIdle);
    }
    let (definition_id, broken) = {
        let parts = world
            .get::<&Parts>(actor)
            .map_err(|_| ChargeRejection::UnknownActor)?;
        let part = parts.get(slot);
        (part.definition_id.clone(), part.is_broken)
    };
    let definition = catalog
        .part(&definition_id)
        .ok_or(ChargeRejection::SlotMissing)?;
    if broken {
        return Err(ChargeRejection::SlotBroken);
    }
    if !definition.category.is_action() {
        return Err(ChargeRejection::NoActionCategory);
    }

    let policy = TargetPolicy::for_category(definition.category);
    let recorded = match policy {
        TargetPolicy::Preselected => target.map_or_else(Target::default, |(entity, target_slot)| Target {
            policy,
            entity: Some(entity),
            slot: target_slot,
        }),
        TargetPolicy::ClosestAtExecution => Target {
            policy,
            entity: None,
            slot: None,
        },
    };
    let duration = PartInfo::new(world, catalog, config).gauge_duration(
        definition.charge,
        actor,
        GaugeKind::Charge,
    );
    debug!(?actor, ?slot, duration, ?policy, "charge started");

    world
        .insert(
            actor,
            (
                ActionIntent { slot: Some(slot) },
                recorded,
                Gauge {
                    progress: 0,
                    total_duration: duration,
                    current: 0.0,
                },
            ),
        )
        .map_err(|_| ChargeRejection::UnknownActor)?;
    if let Ok(mut state) = world.get::<&mut ActionState>(actor) {
        state.kind = StateKind::Charging;
    }
    Ok(())
}

/// Put the actor into cooldown for the part it just used.
pub fn start_cooldown(world: &mut World, catalog: &Catalog, config: &GameConfig, actor: Entity) {
    let slot = world.get::<&ActionIntent>(actor).ok().and_then(|i| i.slot);
    let base = slot
        .and_then(|slot| {
            let parts = world.get::<&Parts>(actor).ok()?;
            catalog.part(&parts.get(slot).definition_id).map(|d| d.cooldown)
        })
        .unwrap_or(0.0);
    let duration = PartInfo::new(world, catalog, config).gauge_duration(base, actor, GaugeKind::Cooldown);

    let Ok((state, gauge)) = world.query_one_mut::<(&mut ActionState, &mut Gauge)>(actor) else {
        return;
    };
    if state.is_broken() {
        return;
    }
    state.kind = StateKind::Cooldown;
    gauge.restart(duration);
    debug!(?actor, duration, "cooldown started");
}

/// Drop a pending action and put the actor back to idle.
pub fn reset_to_idle(world: &mut World, actor: Entity) {
    if let Ok((state, gauge, intent, target)) =
        world.query_one_mut::<(&mut ActionState, &mut Gauge, &mut ActionIntent, &mut Target)>(actor)
    {
        if state.is_broken() {
            return;
        }
        state.kind = StateKind::Idle;
        *gauge = Gauge::default();
        *intent = ActionIntent::default();
        *target = Target::default();
    }
}
