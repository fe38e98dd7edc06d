//! Status effect system: per-tick payloads and duration bookkeeping.

use hecs::World;

use medarot_core::components::{ActiveEffects, EffectPayload, Parts};
use medarot_core::enums::PartSlot;

use crate::calculators::zero_roll_damage;
use crate::resources::BattleResources;
use crate::roster::{combatants_sorted, is_broken};
use crate::systems::post_action::apply_part_damage;

/// First intact non-head part in slot order, else the head.
pub fn status_damage_slot(parts: &Parts) -> Option<PartSlot> {
    [PartSlot::RightArm, PartSlot::LeftArm, PartSlot::Legs, PartSlot::Head]
        .into_iter()
        .find(|slot| !parts.is_broken(*slot))
}

/// Decrement every effect, drop expired ones and apply damage-over-time.
///
/// Each hit picks its slot against the armor left by the previous one and
/// goes through the same break path as action damage. A combatant stops
/// taking status hits the moment it breaks. Returns the number of hits
/// applied.
pub fn run(world: &mut World, res: &mut BattleResources) -> usize {
    let mut applied = 0;
    for entity in combatants_sorted(world) {
        if is_broken(world, entity) {
            continue;
        }
        let dot: Vec<i32> = {
            let Ok(mut effects) = world.get::<&mut ActiveEffects>(entity) else {
                continue;
            };
            let dot = effects
                .effects
                .iter()
                .filter_map(|e| match e.payload {
                    EffectPayload::DamageOverTime { damage } => Some(zero_roll_damage(damage)),
                    _ => None,
                })
                .collect();
            for effect in effects.effects.iter_mut() {
                effect.remaining_ticks = effect.remaining_ticks.saturating_sub(1);
            }
            effects.effects.retain(|e| e.remaining_ticks > 0);
            dot
        };

        for amount in dot {
            if is_broken(world, entity) {
                break;
            }
            let slot = world
                .get::<&Parts>(entity)
                .ok()
                .and_then(|parts| status_damage_slot(&parts));
            let Some(slot) = slot else {
                break;
            };
            if apply_part_damage(world, res, entity, slot, amount).is_some() {
                applied += 1;
            }
        }
    }
    applied
}
