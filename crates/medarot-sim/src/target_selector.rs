//! Target and part selection used when actions execute.

use hecs::{Entity, World};

use medarot_core::components::{ActionState, Parts};
use medarot_core::enums::PartSlot;
use medarot_core::rng::RollSource;
use medarot_ai::targeting::pick_damage_slot;

use crate::part_info::PartInfo;
use crate::roster::{combatants_sorted, is_broken, team_of};

/// Live members of the opposing team, in (team, draw index) order.
pub fn candidate_enemies(world: &World, actor: Entity) -> Vec<Entity> {
    let Some(team) = team_of(world, actor) else {
        return Vec::new();
    };
    combatants_sorted(world)
        .into_iter()
        .filter(|e| team_of(world, *e) == Some(team.opponent()) && !is_broken(world, *e))
        .collect()
}

/// Part that guards for `target`: legs, then right arm, then left arm, then head.
pub fn defense_part(world: &World, target: Entity) -> Option<PartSlot> {
    let parts = world.get::<&Parts>(target).ok()?;
    [
        PartSlot::Legs,
        PartSlot::RightArm,
        PartSlot::LeftArm,
        PartSlot::Head,
    ]
    .into_iter()
    .find(|slot| !parts.is_broken(*slot))
}

/// Random intact non-head part of `target`; the head only when nothing else is left.
pub fn part_to_damage(world: &World, target: Entity, rng: &mut dyn RollSource) -> Option<PartSlot> {
    let intact = world.get::<&Parts>(target).ok()?.intact_slots();
    pick_damage_slot(&intact, rng)
}

/// Enemy nearest to the actor on the attack axis. Ties keep roster order.
pub fn closest_enemy(world: &World, info: &PartInfo<'_>, actor: Entity) -> Option<Entity> {
    let actor_x = info.battlefield_x(actor)?;
    let mut best: Option<(Entity, f64)> = None;
    for enemy in candidate_enemies(world, actor) {
        let Some(x) = info.battlefield_x(enemy) else {
            continue;
        };
        let distance = (actor_x - x).abs();
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((enemy, distance));
        }
    }
    best.map(|(entity, _)| entity)
}

/// Whether `target` can still be hit, optionally at `slot`.
pub fn is_valid_target(world: &World, target: Entity, slot: Option<PartSlot>) -> bool {
    let Ok(state) = world.get::<&ActionState>(target) else {
        return false;
    };
    if state.is_broken() {
        return false;
    }
    match slot {
        Some(slot) => world
            .get::<&Parts>(target)
            .map(|parts| !parts.is_broken(slot))
            .unwrap_or(false),
        None => true,
    }
}
