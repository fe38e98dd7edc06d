//! Snapshot system: queries the ECS world and builds a `BattleSnapshot`.
//!
//! Read-only: never modifies the world.

use hecs::{Entity, World};

use medarot_core::components::*;
use medarot_core::enums::PartSlot;
use medarot_core::state::*;

use crate::resources::BattleResources;
use crate::roster::combatants_sorted;

/// Build the complete snapshot for the current tick.
pub fn build_snapshot(world: &World, res: &BattleResources) -> BattleSnapshot {
    BattleSnapshot {
        tick: res.tick,
        phase: res.phase,
        combatants: combatants_sorted(world)
            .into_iter()
            .filter_map(|entity| build_combatant(world, entity))
            .collect(),
        team_buffs: build_team_buffs(res),
        ready_queue: res
            .ready_queue
            .iter()
            .filter_map(|e| world.get::<&Settings>(*e).ok().map(|s| s.id.clone()))
            .collect(),
        outcome: res.outcome,
    }
}

fn build_combatant(world: &World, entity: Entity) -> Option<CombatantView> {
    let settings = world.get::<&Settings>(entity).ok()?;
    let state = world.get::<&ActionState>(entity).ok()?;
    let parts = world.get::<&Parts>(entity).ok()?;
    let gauge = world.get::<&Gauge>(entity).map(|g| g.current).unwrap_or(0.0);
    let selected_slot = world.get::<&ActionIntent>(entity).ok().and_then(|i| i.slot);

    Some(CombatantView {
        id: settings.id.clone(),
        name: settings.name.clone(),
        team: settings.team,
        is_leader: settings.is_leader,
        draw_index: settings.draw_index,
        state: state.kind,
        gauge,
        selected_slot,
        parts: PartSlot::ALL
            .into_iter()
            .map(|slot| {
                let part = parts.get(slot);
                PartView {
                    slot,
                    part_id: part.definition_id.clone(),
                    current_armor: part.current_armor,
                    max_armor: part.max_armor,
                    is_broken: part.is_broken,
                }
            })
            .collect(),
    })
}

fn build_team_buffs(res: &BattleResources) -> Vec<TeamBuffView> {
    res.team_buffs
        .entries()
        .into_iter()
        .map(|(team, buff, sources)| TeamBuffView {
            team,
            buff,
            multiplier: sources.iter().map(|s| s.value).product(),
            sources: sources.len(),
        })
        .collect()
}
