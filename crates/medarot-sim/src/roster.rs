//! Deterministic lookups over combatant entities.
//!
//! hecs iteration order depends on archetype layout, so every system that
//! needs stable ordering goes through `combatants_sorted`.

use hecs::{Component, Entity, World};

use medarot_core::components::{ActionState, Settings};
use medarot_core::enums::{StateKind, Team};

/// All combatants ordered by (team, draw index).
pub fn combatants_sorted(world: &World) -> Vec<Entity> {
    let mut entries: Vec<(Team, u8, Entity)> = world
        .query::<&Settings>()
        .iter()
        .map(|(entity, settings)| (settings.team, settings.draw_index, entity))
        .collect();
    entries.sort_by_key(|(team, draw_index, _)| (*team, *draw_index));
    entries.into_iter().map(|(_, _, entity)| entity).collect()
}

pub fn has_component<T: Component>(world: &World, entity: Entity) -> bool {
    world
        .entity(entity)
        .map(|entity_ref| entity_ref.has::<T>())
        .unwrap_or(false)
}

pub fn state_of(world: &World, entity: Entity) -> Option<StateKind> {
    world.get::<&ActionState>(entity).ok().map(|s| s.kind)
}

pub fn is_broken(world: &World, entity: Entity) -> bool {
    state_of(world, entity).map_or(true, |kind| kind == StateKind::Broken)
}

pub fn team_of(world: &World, entity: Entity) -> Option<Team> {
    world.get::<&Settings>(entity).ok().map(|s| s.team)
}

pub fn name_of(world: &World, entity: Entity) -> String {
    world
        .get::<&Settings>(entity)
        .map(|s| s.name.clone())
        .unwrap_or_default()
}
