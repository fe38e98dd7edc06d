//! Pure combat arithmetic: chances, damage and roll comparison.
//!
//! Calculators never fail. Chances are clamped to their configured bounds
//! and damage is floored at 1.

use medarot_core::config::{CriticalSettings, DamageSettings, GameConfig};

/// Hit chance in percent: base + (success - evasion), clamped.
pub fn hit_chance(config: &GameConfig, success_rate: f64, evasion_rate: f64) -> f64 {
    config.hit.resolve(success_rate - evasion_rate)
}

/// Defense chance in percent: base + (defense - success), clamped.
pub fn defense_chance(config: &GameConfig, defense_rate: f64, success_rate: f64) -> f64 {
    config.defense.resolve(defense_rate - success_rate)
}

pub fn critical_chance(critical: &CriticalSettings, success_rate: f64, bonus: f64) -> f64 {
    (critical.base_chance + success_rate * critical.success_rate_factor + bonus)
        .clamp(critical.min_chance, critical.max_chance)
}

/// A roll in [0, 100) succeeds when it is strictly below the chance.
pub fn roll_succeeds(roll: f64, chance: f64) -> bool {
    roll < chance
}

/// Damage multiplier for a variance draw in [-1, 1).
pub fn jitter(damage: &DamageSettings, variance_draw: f64) -> f64 {
    1.0 + variance_draw.clamp(-1.0, 1.0) * damage.random_variance
}

/// Inputs of one damage computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageInput {
    pub success_rate: f64,
    /// Already zeroed by the caller on a critical hit.
    pub evasion_rate: f64,
    pub power: f64,
    pub medal_skill: i32,
    pub jitter: f64,
}

/// `((success - evasion) / adjustment + power + skill * factor) * jitter`,
/// floored and never below 1.
pub fn damage(settings: &DamageSettings, input: DamageInput) -> i32 {
    let accuracy_term = if settings.damage_adjustment_factor > 0.0 {
        (input.success_rate - input.evasion_rate) / settings.damage_adjustment_factor
    } else {
        0.0
    };
    let raw = (accuracy_term
        + input.power
        + input.medal_skill as f64 * settings.medal_skill_factor)
        * input.jitter;
    floor_damage(raw)
}

/// Damage after a successful guard.
pub fn defended_damage(original: i32, legs_defense: f64) -> i32 {
    floor_damage(original as f64 - legs_defense)
}

/// Damage applied without any roll (status effects).
pub fn zero_roll_damage(base: i32) -> i32 {
    base.max(1)
}

fn floor_damage(raw: f64) -> i32 {
    if !raw.is_finite() {
        return 1;
    }
    (raw.floor() as i32).max(1)
}
