//! Immutable catalog definitions: parts, medals, action formulas, loadouts.
//!
//! The catalog is built once at startup and shared read-only (behind an
//! `Arc`) by every battle.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::error::{BattleError, Result};

/// Static definition of a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDefinition {
    pub id: String,
    #[serde(rename = "part_name")]
    pub name: String,
    #[serde(rename = "type")]
    pub part_type: PartSlot,
    #[serde(default)]
    pub category: PartCategory,
    #[serde(default, rename = "trait")]
    pub part_trait: PartTrait,
    #[serde(default)]
    pub weapon_type: WeaponType,
    pub max_armor: i32,
    #[serde(default)]
    pub power: i32,
    /// Charge base in seconds at 1x game speed.
    #[serde(default)]
    pub charge: f64,
    /// Cooldown base in seconds at 1x game speed.
    #[serde(default)]
    pub cooldown: f64,
    #[serde(default)]
    pub defense: i32,
    #[serde(default)]
    pub accuracy: i32,
    #[serde(default)]
    pub mobility: i32,
    #[serde(default)]
    pub propulsion: i32,
    #[serde(default)]
    pub stability: i32,
}

impl PartDefinition {
    /// Raw value of a base parameter.
    pub fn parameter(&self, parameter: PartParameter) -> f64 {
        let value = match parameter {
            PartParameter::MaxArmor => self.max_armor,
            PartParameter::Power => self.power,
            PartParameter::Defense => self.defense,
            PartParameter::Accuracy => self.accuracy,
            PartParameter::Mobility => self.mobility,
            PartParameter::Propulsion => self.propulsion,
            PartParameter::Stability => self.stability,
        };
        value as f64
    }
}

/// Static definition of a medal (the combatant's "brain").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedalDefinition {
    pub id: String,
    pub name: String,
    /// Key into the AI personality registry.
    pub personality: String,
    #[serde(default)]
    pub skill_level: i32,
}

/// A parameter-driven bonus: `multiplier * value(source)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormulaBonus {
    pub source: PartParameter,
    pub multiplier: f64,
}

/// A debuff applied to the user of an action after it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserDebuff {
    pub kind: DebuffKind,
    pub multiplier: f64,
    pub duration_ticks: u32,
}

/// Per-trait modifiers used by the damage and hit calculators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionFormula {
    #[serde(default)]
    pub power_bonuses: Vec<FormulaBonus>,
    #[serde(default)]
    pub success_rate_bonuses: Vec<FormulaBonus>,
    #[serde(default)]
    pub critical_rate_bonus: f64,
    #[serde(default)]
    pub user_debuffs: Vec<UserDebuff>,
}

/// One combatant's starting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    pub id: String,
    pub name: String,
    #[serde(rename = "team_id")]
    pub team: Team,
    #[serde(default)]
    pub is_leader: bool,
    pub draw_index: u8,
    pub medal_id: String,
    pub head_id: String,
    pub right_arm_id: String,
    pub left_arm_id: String,
    pub legs_id: String,
    #[serde(default)]
    pub player_controlled: bool,
}

impl Loadout {
    /// Part id assigned to a slot.
    pub fn part_id(&self, slot: PartSlot) -> &str {
        match slot {
            PartSlot::Head => &self.head_id,
            PartSlot::RightArm => &self.right_arm_id,
            PartSlot::LeftArm => &self.left_arm_id,
            PartSlot::Legs => &self.legs_id,
        }
    }
}

/// The complete immutable catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    parts: HashMap<String, PartDefinition>,
    medals: HashMap<String, MedalDefinition>,
    formulas: HashMap<PartTrait, ActionFormula>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(
        parts: Vec<PartDefinition>,
        medals: Vec<MedalDefinition>,
        formulas: HashMap<PartTrait, ActionFormula>,
    ) -> Result<Self> {
        let mut catalog = Catalog {
            formulas,
            ..Default::default()
        };
        for part in parts {
            if catalog.parts.contains_key(&part.id) {
                return Err(BattleError::DuplicateDefinition {
                    kind: "part",
                    id: part.id,
                });
            }
            catalog.parts.insert(part.id.clone(), part);
        }
        for medal in medals {
            if catalog.medals.contains_key(&medal.id) {
                return Err(BattleError::DuplicateDefinition {
                    kind: "medal",
                    id: medal.id,
                });
            }
            catalog.medals.insert(medal.id.clone(), medal);
        }
        Ok(catalog)
    }

    pub fn part(&self, id: &str) -> Option<&PartDefinition> {
        self.parts.get(id)
    }

    /// Look up a part, failing with `CatalogMissingDefinition`.
    pub fn require_part(&self, id: &str) -> Result<&PartDefinition> {
        self.parts
            .get(id)
            .ok_or_else(|| BattleError::CatalogMissingDefinition {
                kind: "part",
                id: id.to_string(),
            })
    }

    pub fn medal(&self, id: &str) -> Option<&MedalDefinition> {
        self.medals.get(id)
    }

    /// Look up a medal, failing with `CatalogMissingDefinition`.
    pub fn require_medal(&self, id: &str) -> Result<&MedalDefinition> {
        self.medals
            .get(id)
            .ok_or_else(|| BattleError::CatalogMissingDefinition {
                kind: "medal",
                id: id.to_string(),
            })
    }

    /// Formula for a trait, falling back to the shoot formula, then to an
    /// empty formula.
    pub fn formula(&self, part_trait: PartTrait) -> ActionFormula {
        self.formulas
            .get(&part_trait)
            .or_else(|| self.formulas.get(&PartTrait::Shoot))
            .cloned()
            .unwrap_or_default()
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn medal_count(&self) -> usize {
        self.medals.len()
    }
}
