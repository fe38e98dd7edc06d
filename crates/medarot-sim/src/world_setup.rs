//! Entity spawn factories for setting up the battle world.
//!
//! Validates loadouts against the catalog and spawns one combatant entity
//! per loadout with its full component bundle.

use std::collections::{HashMap, HashSet};

use hecs::{Entity, World};

use medarot_core::catalog::{Catalog, Loadout};
use medarot_core::components::*;
use medarot_core::constants::TEAM_SIZE;
use medarot_core::enums::{PartSlot, Team};
use medarot_core::error::{BattleError, Result};

/// Check team composition and catalog references before anything spawns.
pub fn validate_loadouts(catalog: &Catalog, loadouts: &[Loadout]) -> Result<()> {
    let mut members: HashMap<Team, usize> = HashMap::new();
    let mut leaders: HashMap<Team, usize> = HashMap::new();
    let mut draw_indices: HashSet<(Team, u8)> = HashSet::new();
    let mut ids: HashSet<&str> = HashSet::new();

    for loadout in loadouts {
        if !ids.insert(loadout.id.as_str()) {
            return Err(BattleError::DuplicateDefinition {
                kind: "loadout",
                id: loadout.id.clone(),
            });
        }
        catalog.require_medal(&loadout.medal_id)?;
        for slot in PartSlot::ALL {
            let part = catalog.require_part(loadout.part_id(slot))?;
            if part.part_type != slot {
                return Err(BattleError::InvalidLoadout(format!(
                    "{}: part '{}' cannot be equipped as {}",
                    loadout.id,
                    part.id,
                    slot.label()
                )));
            }
        }
        *members.entry(loadout.team).or_default() += 1;
        if loadout.is_leader {
            *leaders.entry(loadout.team).or_default() += 1;
        }
        if !draw_indices.insert((loadout.team, loadout.draw_index)) {
            return Err(BattleError::InvalidLoadout(format!(
                "{}: draw index {} already used on team {}",
                loadout.id,
                loadout.draw_index,
                u8::from(loadout.team)
            )));
        }
    }

    for team in [Team::One, Team::Two] {
        let count = members.get(&team).copied().unwrap_or(0);
        let team_id = u8::from(team);
        if count == 0 {
            return Err(BattleError::InvalidLoadout(format!("team {team_id} has no members")));
        }
        if count > TEAM_SIZE {
            return Err(BattleError::InvalidLoadout(format!(
                "team {team_id} has {count} members, at most {TEAM_SIZE} allowed"
            )));
        }
        let leader_count = leaders.get(&team).copied().unwrap_or(0);
        if leader_count != 1 {
            return Err(BattleError::InvalidLoadout(format!(
                "team {team_id} must have exactly one leader, found {leader_count}"
            )));
        }
    }
    Ok(())
}

/// Validate `loadouts` and spawn every combatant. Returns the entities in
/// loadout order. Nothing is spawned when validation fails.
pub fn initialize_battle_world(
    world: &mut World,
    catalog: &Catalog,
    loadouts: &[Loadout],
) -> Result<Vec<Entity>> {
    validate_loadouts(catalog, loadouts)?;
    loadouts
        .iter()
        .map(|loadout| spawn_combatant(world, catalog, loadout))
        .collect()
}

/// Spawn one combatant with full armor, idle state and empty histories.
pub fn spawn_combatant(world: &mut World, catalog: &Catalog, loadout: &Loadout) -> Result<Entity> {
    let instance = |slot: PartSlot| -> Result<PartInstance> {
        let definition = catalog.require_part(loadout.part_id(slot))?;
        Ok(PartInstance::new(definition.id.clone(), definition.max_armor))
    };
    let parts = Parts {
        head: instance(PartSlot::Head)?,
        right_arm: instance(PartSlot::RightArm)?,
        left_arm: instance(PartSlot::LeftArm)?,
        legs: instance(PartSlot::Legs)?,
    };
    let medal = catalog.require_medal(&loadout.medal_id)?;

    let entity = world.spawn((
        Settings {
            id: loadout.id.clone(),
            name: loadout.name.clone(),
            team: loadout.team,
            is_leader: loadout.is_leader,
            draw_index: loadout.draw_index,
        },
        parts,
        Medal {
            id: medal.id.clone(),
            name: medal.name.clone(),
            personality: medal.personality.clone(),
            skill_level: medal.skill_level,
        },
        Gauge::default(),
        ActionState::default(),
        ActionIntent::default(),
        Target::default(),
        ActiveEffects::default(),
        TargetHistory::default(),
        LastActionHistory::default(),
    ));

    if loadout.player_controlled {
        world
            .insert_one(entity, PlayerControlled)
            .map_err(|_| BattleError::UnknownEntity)?;
    } else {
        world
            .insert_one(
                entity,
                AiControl {
                    personality: medal.personality.clone(),
                },
            )
            .map_err(|_| BattleError::UnknownEntity)?;
    }
    Ok(entity)
}
