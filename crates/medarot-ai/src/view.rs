//! Plain-data view of the battlefield handed to targeting strategies.

use hecs::Entity;

use medarot_core::enums::{PartCategory, PartSlot, Team};

/// One part as targeting sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotView {
    pub slot: PartSlot,
    pub category: PartCategory,
    pub current_armor: i32,
    pub propulsion: i32,
    pub is_broken: bool,
}

/// One combatant as targeting sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitView {
    pub entity: Entity,
    pub team: Team,
    pub is_leader: bool,
    pub is_broken: bool,
    pub is_ai: bool,
    /// Parts in canonical slot order.
    pub parts: Vec<SlotView>,
    pub last_attacker: Option<Entity>,
    pub last_hit: Option<(Entity, PartSlot)>,
}

impl UnitView {
    pub fn part(&self, slot: PartSlot) -> Option<&SlotView> {
        self.parts.iter().find(|p| p.slot == slot)
    }

    pub fn is_part_intact(&self, slot: PartSlot) -> bool {
        self.part(slot).is_some_and(|p| !p.is_broken)
    }

    pub fn intact_parts(&self) -> impl Iterator<Item = &SlotView> {
        self.parts.iter().filter(|p| !p.is_broken)
    }
}

/// Everything a target strategy may read. `units` must be in a stable order
/// (team, then draw index) for tie-breaking to be deterministic.
#[derive(Debug, Clone, Copy)]
pub struct TargetingContext<'a> {
    pub actor: Entity,
    pub units: &'a [UnitView],
}

impl<'a> TargetingContext<'a> {
    pub fn unit(&self, entity: Entity) -> Option<&'a UnitView> {
        self.units.iter().find(|u| u.entity == entity)
    }

    pub fn actor_unit(&self) -> Option<&'a UnitView> {
        self.unit(self.actor)
    }

    /// Non-broken combatants on the opposing team.
    pub fn enemies(&self) -> Vec<&'a UnitView> {
        let Some(actor) = self.actor_unit() else {
            return Vec::new();
        };
        self.units
            .iter()
            .filter(|u| u.team != actor.team && !u.is_broken)
            .collect()
    }

    /// Non-broken teammates, excluding the actor.
    pub fn allies(&self) -> Vec<&'a UnitView> {
        let Some(actor) = self.actor_unit() else {
            return Vec::new();
        };
        self.units
            .iter()
            .filter(|u| u.team == actor.team && u.entity != actor.entity && !u.is_broken)
            .collect()
    }

    /// The opposing team's leader, while it is still fighting.
    pub fn enemy_leader(&self) -> Option<&'a UnitView> {
        self.enemies().into_iter().find(|u| u.is_leader)
    }

    /// Whether `entity` is a live enemy of the actor.
    pub fn is_live_enemy(&self, entity: Entity) -> bool {
        self.enemies().iter().any(|u| u.entity == entity)
    }
}
