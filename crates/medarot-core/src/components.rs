//! ECS components for hecs entities.
//!
//! Components are plain data structs. Game logic lives in systems, not
//! components; the few methods here are lookups over the component's own data.

use hecs::Entity;
use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Identity and team placement of a combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub id: String,
    pub name: String,
    pub team: Team,
    pub is_leader: bool,
    /// Stable ordering within the team (0..TEAM_SIZE).
    pub draw_index: u8,
}

/// Live state of one equipped part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartInstance {
    pub definition_id: String,
    pub current_armor: i32,
    pub max_armor: i32,
    pub is_broken: bool,
}

impl PartInstance {
    pub fn new(definition_id: impl Into<String>, max_armor: i32) -> Self {
        let max_armor = max_armor.max(0);
        Self {
            definition_id: definition_id.into(),
            current_armor: max_armor,
            max_armor,
            is_broken: max_armor == 0,
        }
    }

    /// Subtract damage, clamping at zero. Returns true if this call broke the part.
    pub fn apply_damage(&mut self, damage: i32) -> bool {
        if self.is_broken {
            return false;
        }
        self.current_armor = (self.current_armor - damage.max(0)).clamp(0, self.max_armor);
        if self.current_armor == 0 {
            self.is_broken = true;
            return true;
        }
        false
    }
}

/// The four equipped parts, one per slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parts {
    pub head: PartInstance,
    pub right_arm: PartInstance,
    pub left_arm: PartInstance,
    pub legs: PartInstance,
}

impl Parts {
    pub fn get(&self, slot: PartSlot) -> &PartInstance {
        match slot {
            PartSlot::Head => &self.head,
            PartSlot::RightArm => &self.right_arm,
            PartSlot::LeftArm => &self.left_arm,
            PartSlot::Legs => &self.legs,
        }
    }

    pub fn get_mut(&mut self, slot: PartSlot) -> &mut PartInstance {
        match slot {
            PartSlot::Head => &mut self.head,
            PartSlot::RightArm => &mut self.right_arm,
            PartSlot::LeftArm => &mut self.left_arm,
            PartSlot::Legs => &mut self.legs,
        }
    }

    pub fn is_broken(&self, slot: PartSlot) -> bool {
        self.get(slot).is_broken
    }

    /// Slots whose parts are still intact, in canonical order.
    pub fn intact_slots(&self) -> Vec<PartSlot> {
        PartSlot::ALL
            .into_iter()
            .filter(|slot| !self.is_broken(*slot))
            .collect()
    }

    pub fn all_broken(&self) -> bool {
        PartSlot::ALL.iter().all(|slot| self.is_broken(*slot))
    }
}

/// Value copy of the equipped medal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medal {
    pub id: String,
    pub name: String,
    pub personality: String,
    pub skill_level: i32,
}

/// Charge / cooldown gauge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Gauge {
    pub progress: u32,
    /// Total duration in ticks; always >= 1 while charging or cooling down.
    pub total_duration: u32,
    /// Fill level in [0, 100].
    pub current: f64,
}

impl Gauge {
    /// Progress / total, clamped to [0, 1].
    pub fn normalized(&self) -> f64 {
        if self.total_duration == 0 {
            return 0.0;
        }
        (self.progress as f64 / self.total_duration as f64).clamp(0.0, 1.0)
    }

    pub fn restart(&mut self, total_duration: u32) {
        self.progress = 0;
        self.total_duration = total_duration.max(1);
        self.current = 0.0;
    }
}

/// Simulation state plus the tick at which the combatant broke.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionState {
    pub kind: StateKind,
    pub broken_at_tick: Option<u64>,
}

impl ActionState {
    pub fn is_broken(&self) -> bool {
        self.kind == StateKind::Broken
    }
}

/// Part selected for the current action. Meaningful only while charging or ready.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionIntent {
    pub slot: Option<PartSlot>,
}

/// Target of the current action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Target {
    pub policy: TargetPolicy,
    pub entity: Option<Entity>,
    pub slot: Option<PartSlot>,
}

/// Tagged status effect payloads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectPayload {
    /// Multiplies the holder's evasion rate.
    EvasionDebuff { multiplier: f64 },
    /// Multiplies the holder's defense rate.
    DefenseDebuff { multiplier: f64 },
    /// Fixed damage each tick to the holder's first intact part.
    DamageOverTime { damage: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub payload: EffectPayload,
    pub remaining_ticks: u32,
}

/// Status effects currently applied to a combatant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub effects: Vec<ActiveEffect>,
}

impl ActiveEffects {
    /// Product of all evasion debuff multipliers.
    pub fn evasion_multiplier(&self) -> f64 {
        self.effects
            .iter()
            .filter_map(|e| match e.payload {
                EffectPayload::EvasionDebuff { multiplier } => Some(multiplier),
                _ => None,
            })
            .product()
    }

    /// Product of all defense debuff multipliers.
    pub fn defense_multiplier(&self) -> f64 {
        self.effects
            .iter()
            .filter_map(|e| match e.payload {
                EffectPayload::DefenseDebuff { multiplier } => Some(multiplier),
                _ => None,
            })
            .product()
    }
}

/// Who last damaged this combatant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetHistory {
    pub last_attacker: Option<Entity>,
}

/// What this combatant last hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastActionHistory {
    pub last_hit_target: Option<Entity>,
    pub last_hit_slot: Option<PartSlot>,
}

/// Present only on AI-controlled combatants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiControl {
    pub personality: String,
}

/// Marks a combatant whose actions are chosen through the action modal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerControlled;
