//! Player input system: queues idle player-controlled combatants.

use std::collections::VecDeque;

use hecs::{Entity, World};

use medarot_core::catalog::Catalog;
use medarot_core::components::{ActionState, PlayerControlled};
use medarot_core::enums::StateKind;

use crate::roster::{combatants_sorted, has_component};
use crate::systems::ai_input::available_parts;

/// Append idle player-controlled combatants that still have a usable action
/// part and are not already waiting. Returns the newly queued entities.
pub fn run(world: &World, catalog: &Catalog, player_queue: &mut VecDeque<Entity>) -> Vec<Entity> {
    let mut queued = Vec::new();
    for entity in combatants_sorted(world) {
        if !has_component::<PlayerControlled>(world, entity) || player_queue.contains(&entity) {
            continue;
        }
        let idle = world
            .get::<&ActionState>(entity)
            .map(|s| s.kind == StateKind::Idle)
            .unwrap_or(false);
        if idle && !available_parts(world, catalog, entity).is_empty() {
            player_queue.push_back(entity);
            queued.push(entity);
        }
    }
    queued
}
