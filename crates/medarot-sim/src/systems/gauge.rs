//! Gauge system: advances charge and cooldown gauges by one tick.

use hecs::{Entity, World};

use medarot_core::components::{ActionIntent, ActionState, Gauge, Settings, Target};
use medarot_core::constants::GAUGE_FULL;
use medarot_core::enums::{StateKind, Team};

/// Advance every charging or cooling-down combatant.
///
/// Completed charges are appended to `ready_queue` in (team, draw index)
/// order; completed cooldowns return to idle with intent and target cleared.
/// Broken combatants never progress.
pub fn run(world: &mut World, ready_queue: &mut Vec<Entity>) {
    let mut charged: Vec<(Team, u8, Entity)> = Vec::new();
    let mut cooled: Vec<Entity> = Vec::new();

    for (entity, (settings, state, gauge)) in
        world.query_mut::<(&Settings, &mut ActionState, &mut Gauge)>()
    {
        if !matches!(state.kind, StateKind::Charging | StateKind::Cooldown) {
            continue;
        }
        gauge.progress = gauge.progress.saturating_add(1);
        gauge.current = GAUGE_FULL * gauge.normalized();
        if gauge.progress < gauge.total_duration {
            continue;
        }
        match state.kind {
            StateKind::Charging => {
                state.kind = StateKind::Ready;
                gauge.current = GAUGE_FULL;
                charged.push((settings.team, settings.draw_index, entity));
            }
            StateKind::Cooldown => {
                state.kind = StateKind::Idle;
                gauge.current = 0.0;
                gauge.progress = 0;
                cooled.push(entity);
            }
            _ => {}
        }
    }

    charged.sort_by_key(|(team, draw_index, _)| (*team, *draw_index));
    for (_, _, entity) in charged {
        if !ready_queue.contains(&entity) {
            ready_queue.push(entity);
        }
    }

    for entity in cooled {
        if let Ok(mut intent) = world.get::<&mut ActionIntent>(entity) {
            *intent = ActionIntent::default();
        }
        if let Ok(mut target) = world.get::<&mut Target>(entity) {
            *target = Target::default();
        }
    }
}
