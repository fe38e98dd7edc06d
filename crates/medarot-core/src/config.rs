//! Game settings used by the calculators and gauge timing.
//!
//! Every section has defaults so a partial `game_settings.json` still loads.

use serde::{Deserialize, Serialize};

/// A chance with its clamping bounds, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChanceSettings {
    pub base_chance: f64,
    pub min_chance: f64,
    pub max_chance: f64,
}

impl ChanceSettings {
    /// `base + delta`, clamped to `[min_chance, max_chance]`.
    pub fn resolve(&self, delta: f64) -> f64 {
        (self.base_chance + delta).clamp(self.min_chance, self.max_chance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticalSettings {
    pub base_chance: f64,
    pub success_rate_factor: f64,
    pub min_chance: f64,
    pub max_chance: f64,
}

impl Default for CriticalSettings {
    fn default() -> Self {
        Self {
            base_chance: 5.0,
            success_rate_factor: 0.1,
            min_chance: 0.0,
            max_chance: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageSettings {
    /// Divisor applied to (success - evasion).
    pub damage_adjustment_factor: f64,
    /// Half-width of the damage jitter (0.1 = x[0.9, 1.1]).
    pub random_variance: f64,
    /// Damage added per medal skill level.
    pub medal_skill_factor: f64,
    pub critical: CriticalSettings,
}

impl Default for DamageSettings {
    fn default() -> Self {
        Self {
            damage_adjustment_factor: 5.0,
            random_variance: 0.1,
            medal_skill_factor: 1.0,
            critical: CriticalSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorSettings {
    /// Weight of legs stability in the evasion rate.
    pub evasion_stability_factor: f64,
    /// Weight of legs stability in the defense rate.
    pub defense_stability_factor: f64,
}

impl Default for FactorSettings {
    fn default() -> Self {
        Self {
            evasion_stability_factor: 0.5,
            defense_stability_factor: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSettings {
    pub game_speed_multiplier: f64,
    pub propulsion_effect_rate: f64,
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self {
            game_speed_multiplier: 1.0,
            propulsion_effect_rate: 1.0,
        }
    }
}

/// All numeric tuning consumed by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub hit: ChanceSettings,
    pub defense: ChanceSettings,
    pub damage: DamageSettings,
    pub factors: FactorSettings,
    pub time: TimeSettings,
    /// Armor bar animation speed; read by presentation only.
    pub hp_animation_speed: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            hit: ChanceSettings {
                base_chance: 50.0,
                min_chance: 10.0,
                max_chance: 95.0,
            },
            defense: ChanceSettings {
                base_chance: 10.0,
                min_chance: 5.0,
                max_chance: 95.0,
            },
            damage: DamageSettings::default(),
            factors: FactorSettings::default(),
            time: TimeSettings::default(),
            hp_animation_speed: 1.0,
        }
    }
}

/// Per-battle runtime options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleConfig {
    /// RNG seed. Same seed and catalog = same battle.
    pub seed: u64,
    /// When set the engine acknowledges animations and messages itself.
    pub headless: bool,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            headless: true,
        }
    }
}
