//! The complete record of a single action's inputs and outcomes.

use hecs::Entity;

use crate::components::ActiveEffect;
use crate::enums::*;

/// Why an action produced no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFailure {
    NoValidTarget,
}

/// Outcome of one executed action. Produced by a trait handler, consumed
/// exactly once by post-action effects, then read by the logger and UI.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub actor: Entity,
    pub acting_slot: PartSlot,
    pub target: Option<Entity>,
    pub intended_slot: Option<PartSlot>,
    pub action_did_hit: bool,
    pub is_defended: bool,
    pub is_critical: bool,
    /// Defending slot when defended, otherwise the intended slot.
    pub actual_hit_slot: Option<PartSlot>,
    pub original_damage: i32,
    pub damage_dealt: i32,
    pub damage_to_apply: i32,
    /// Definition id of the part at `actual_hit_slot`.
    pub target_part_id: Option<String>,
    pub is_target_part_broken: bool,
    pub attacker_name: String,
    pub defender_name: String,
    pub action_name: String,
    pub action_trait: PartTrait,
    pub category: PartCategory,
    pub weapon_type: WeaponType,
    /// Debuffs the action applies to its user once resolved.
    pub applied_effects: Vec<ActiveEffect>,
    pub failure: Option<ActionFailure>,
}

impl ActionResult {
    /// An empty result for `actor` acting with `acting_slot`.
    pub fn new(actor: Entity, acting_slot: PartSlot) -> Self {
        Self {
            actor,
            acting_slot,
            target: None,
            intended_slot: None,
            action_did_hit: false,
            is_defended: false,
            is_critical: false,
            actual_hit_slot: None,
            original_damage: 0,
            damage_dealt: 0,
            damage_to_apply: 0,
            target_part_id: None,
            is_target_part_broken: false,
            attacker_name: String::new(),
            defender_name: String::new(),
            action_name: String::new(),
            action_trait: PartTrait::None,
            category: PartCategory::None,
            weapon_type: WeaponType::None,
            applied_effects: Vec::new(),
            failure: None,
        }
    }

    /// Whether this result should subtract armor from a part.
    pub fn deals_damage(&self) -> bool {
        self.action_did_hit && self.damage_to_apply > 0 && self.actual_hit_slot.is_some()
    }
}

/// Most recent action result plus the flag that guards double application.
#[derive(Debug, Clone, Default)]
pub struct LastActionResult {
    pub result: Option<ActionResult>,
    pub consumed: bool,
}

impl LastActionResult {
    pub fn set(&mut self, result: ActionResult) {
        self.result = Some(result);
        self.consumed = false;
    }
}
