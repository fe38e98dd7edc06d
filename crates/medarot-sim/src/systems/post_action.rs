//! Post-action effects: applies an `ActionResult` to the world exactly once.

use hecs::{Entity, World};
use tracing::info;

use medarot_core::catalog::Catalog;
use medarot_core::components::*;
use medarot_core::config::GameConfig;
use medarot_core::enums::{PartSlot, StateKind};
use medarot_core::events::BattleEvent;

use crate::battle_log::{message_lines, LogEvent};
use crate::resources::BattleResources;
use crate::roster::name_of;
use crate::systems::charge::start_cooldown;

/// What happened to a part that took damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartDamage {
    pub remaining_armor: i32,
    pub part_broken: bool,
    pub combatant_broken: bool,
}

/// Subtract armor from one part and cascade any break: buffs sourced from
/// the part are removed, and losing the head or every part breaks the
/// combatant. Only armor actually removed is logged.
pub fn apply_part_damage(
    world: &mut World,
    res: &mut BattleResources,
    entity: Entity,
    slot: PartSlot,
    amount: i32,
) -> Option<PartDamage> {
    let (dealt, remaining_armor, part_broken, part_id, head_or_all_lost) = {
        let mut parts = world.get::<&mut Parts>(entity).ok()?;
        let part = parts.get_mut(slot);
        let before = part.current_armor;
        let broke = part.apply_damage(amount);
        let remaining = part.current_armor;
        let part_id = part.definition_id.clone();
        let lost = broke && (slot == PartSlot::Head || parts.all_broken());
        (before - remaining, remaining, broke, part_id, lost)
    };
    let name = name_of(world, entity);
    if dealt > 0 {
        res.log.record(
            res.tick,
            LogEvent::Damage {
                defender: name.clone(),
                slot,
                amount: dealt,
                remaining_armor,
            },
        );
    }

    let mut combatant_broken = false;
    if part_broken {
        let removed = res.team_buffs.remove_from_source(entity, slot);
        if removed > 0 {
            res.log.record(
                res.tick,
                LogEvent::BuffsRemoved {
                    combatant: name.clone(),
                    count: removed,
                },
            );
        }
        res.log.record(
            res.tick,
            LogEvent::PartBroken {
                combatant: name,
                slot,
                part_id: part_id.clone(),
            },
        );
        res.events.push(BattleEvent::PartBroken {
            entity,
            slot,
            part_id,
        });
        if head_or_all_lost {
            combatant_broken = mark_broken(world, res, entity);
        }
    }
    Some(PartDamage {
        remaining_armor,
        part_broken,
        combatant_broken,
    })
}

/// Move a combatant into the terminal broken state. Returns false when it
/// was already broken.
pub fn mark_broken(world: &mut World, res: &mut BattleResources, entity: Entity) -> bool {
    {
        let Ok(mut state) = world.get::<&mut ActionState>(entity) else {
            return false;
        };
        if state.is_broken() {
            return false;
        }
        state.kind = StateKind::Broken;
        state.broken_at_tick = Some(res.tick);
    }
    res.remove_from_queues(entity);
    let removed = res.team_buffs.remove_entity(entity);
    let name = name_of(world, entity);
    info!(?entity, combatant = %name, tick = res.tick, "combatant broken");
    if removed > 0 {
        res.log.record(
            res.tick,
            LogEvent::BuffsRemoved {
                combatant: name.clone(),
                count: removed,
            },
        );
    }
    res.log.record(res.tick, LogEvent::CombatantBroken { combatant: name });
    true
}

/// Apply the pending result: damage, history, user debuffs, then cooldown.
///
/// Returns the message lines for the result, or `None` when there is no
/// result or it was already applied.
pub fn apply_action_result(
    world: &mut World,
    catalog: &Catalog,
    config: &GameConfig,
    res: &mut BattleResources,
) -> Option<Vec<String>> {
    if res.last_result.consumed {
        return None;
    }
    let mut result = res.last_result.result.clone()?;
    res.last_result.consumed = true;
    let actor = result.actor;

    if let (true, Some(target), Some(slot)) =
        (result.deals_damage(), result.target, result.actual_hit_slot)
    {
        if let Some(outcome) = apply_part_damage(world, res, target, slot, result.damage_to_apply) {
            result.is_target_part_broken = outcome.part_broken;
        }
    }

    if result.action_did_hit {
        if let Some(target) = result.target {
            if let Ok(mut history) = world.get::<&mut TargetHistory>(target) {
                history.last_attacker = Some(actor);
            }
            if let Ok(mut history) = world.get::<&mut LastActionHistory>(actor) {
                history.last_hit_target = Some(target);
                history.last_hit_slot = result.actual_hit_slot.or(result.intended_slot);
            }
        }
    }

    if !result.applied_effects.is_empty() {
        if let Ok(mut effects) = world.get::<&mut ActiveEffects>(actor) {
            effects.effects.extend(result.applied_effects.iter().copied());
        }
    }

    start_cooldown(world, catalog, config, actor);

    let lines = message_lines(&result);
    res.last_result.result = Some(result);
    Some(lines)
}
