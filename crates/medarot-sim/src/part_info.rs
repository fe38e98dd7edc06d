//! Read-only provider of derived combat numbers.
//!
//! Everything here is computed from the world, the catalog and the config;
//! nothing is mutated.

use hecs::{Entity, World};

use medarot_core::catalog::{ActionFormula, Catalog, FormulaBonus, PartDefinition};
use medarot_core::components::{ActionState, ActiveEffects, Gauge, Medal, Parts, Settings};
use medarot_core::config::{GameConfig, TimeSettings};
use medarot_core::constants::*;
use medarot_core::enums::{BuffType, PartParameter, PartSlot, StateKind, Team};

use crate::buffs::TeamBuffs;

/// Which gauge is being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeKind {
    Charge,
    Cooldown,
}

/// Convert a base duration in seconds into ticks, scaled by a legs stat.
///
/// The result is rounded up and never below one tick.
pub fn gauge_duration_ticks(base_seconds: f64, stat: f64, time: &TimeSettings) -> u32 {
    let stat_factor = (1.0 + (stat - NEUTRAL_GAUGE_STAT) / 100.0 * time.propulsion_effect_rate)
        .max(MIN_GAUGE_SPEED_FACTOR);
    let speed = time.game_speed_multiplier.max(f64::EPSILON);
    let ticks = (base_seconds.max(0.0) * TICK_RATE as f64 / (speed * stat_factor)).ceil();
    if !ticks.is_finite() || ticks < 1.0 {
        return 1;
    }
    ticks.min(u32::MAX as f64) as u32
}

/// Home and execution line on the attack axis for a team.
pub fn team_lines(team: Team) -> (f64, f64) {
    match team {
        Team::One => (TEAM_ONE_HOME_X, TEAM_ONE_EXECUTION_X),
        Team::Two => (TEAM_TWO_HOME_X, TEAM_TWO_EXECUTION_X),
    }
}

pub struct PartInfo<'w> {
    world: &'w World,
    catalog: &'w Catalog,
    config: &'w GameConfig,
    buffs: Option<&'w TeamBuffs>,
}

impl<'w> PartInfo<'w> {
    pub fn new(world: &'w World, catalog: &'w Catalog, config: &'w GameConfig) -> Self {
        Self {
            world,
            catalog,
            config,
            buffs: None,
        }
    }

    /// Include team buffs in success-rate computations.
    pub fn with_buffs(mut self, buffs: &'w TeamBuffs) -> Self {
        self.buffs = Some(buffs);
        self
    }

    /// Definition of the part equipped in `slot`, broken or not.
    pub fn definition(&self, entity: Entity, slot: PartSlot) -> Option<&'w PartDefinition> {
        let parts = self.world.get::<&Parts>(entity).ok()?;
        self.catalog.part(&parts.get(slot).definition_id)
    }

    /// Definition of the part in `slot`, or None when the part is broken.
    pub fn intact_definition(&self, entity: Entity, slot: PartSlot) -> Option<&'w PartDefinition> {
        let broken = self.world.get::<&Parts>(entity).ok()?.is_broken(slot);
        if broken {
            return None;
        }
        self.definition(entity, slot)
    }

    /// Base parameter of the part in `slot`; 0 when broken or absent.
    pub fn part_parameter(&self, entity: Entity, slot: PartSlot, parameter: PartParameter) -> f64 {
        self.intact_definition(entity, slot)
            .map_or(0.0, |def| def.parameter(parameter))
    }

    fn bonus_sum(&self, attacker: Entity, slot: PartSlot, bonuses: &[FormulaBonus]) -> f64 {
        bonuses
            .iter()
            .map(|bonus| {
                let source_slot = if bonus.source.is_legs_parameter() {
                    PartSlot::Legs
                } else {
                    slot
                };
                bonus.multiplier * self.part_parameter(attacker, source_slot, bonus.source)
            })
            .sum()
    }

    /// Accuracy of the acting part plus formula bonuses, times the team
    /// accuracy buff when buffs are attached.
    pub fn success_rate(&self, attacker: Entity, slot: PartSlot, formula: &ActionFormula) -> f64 {
        let base = self.part_parameter(attacker, slot, PartParameter::Accuracy)
            + self.bonus_sum(attacker, slot, &formula.success_rate_bonuses);
        base * self.team_accuracy_multiplier(attacker)
    }

    /// Power of the acting part plus formula bonuses.
    pub fn power(&self, attacker: Entity, slot: PartSlot, formula: &ActionFormula) -> f64 {
        self.part_parameter(attacker, slot, PartParameter::Power)
            + self.bonus_sum(attacker, slot, &formula.power_bonuses)
    }

    fn effects_of(&self, entity: Entity) -> Option<hecs::Ref<'w, ActiveEffects>> {
        self.world.get::<&ActiveEffects>(entity).ok()
    }

    pub fn evasion_rate(&self, target: Entity) -> f64 {
        let mobility = self.part_parameter(target, PartSlot::Legs, PartParameter::Mobility);
        let stability = self.part_parameter(target, PartSlot::Legs, PartParameter::Stability);
        let debuff = self.effects_of(target).map_or(1.0, |e| e.evasion_multiplier());
        (mobility + self.config.factors.evasion_stability_factor * stability) * debuff
    }

    pub fn defense_rate(&self, target: Entity) -> f64 {
        let defense = self.part_parameter(target, PartSlot::Legs, PartParameter::Defense);
        let stability = self.part_parameter(target, PartSlot::Legs, PartParameter::Stability);
        let debuff = self.effects_of(target).map_or(1.0, |e| e.defense_multiplier());
        (defense + self.config.factors.defense_stability_factor * stability) * debuff
    }

    pub fn overall_propulsion(&self, entity: Entity) -> f64 {
        self.part_parameter(entity, PartSlot::Legs, PartParameter::Propulsion)
    }

    pub fn overall_mobility(&self, entity: Entity) -> f64 {
        self.part_parameter(entity, PartSlot::Legs, PartParameter::Mobility)
    }

    /// Ticks needed for a gauge of `base_seconds` on this entity.
    pub fn gauge_duration(&self, base_seconds: f64, entity: Entity, kind: GaugeKind) -> u32 {
        let stat = match kind {
            GaugeKind::Charge => self.overall_mobility(entity),
            GaugeKind::Cooldown => self.overall_propulsion(entity),
        };
        gauge_duration_ticks(base_seconds, stat, &self.config.time)
    }

    /// Position inside the current gauge, in [0, 1].
    pub fn normalized_progress(&self, entity: Entity) -> f64 {
        let Ok(state) = self.world.get::<&ActionState>(entity) else {
            return 0.0;
        };
        match state.kind {
            StateKind::Ready => 1.0,
            StateKind::Idle | StateKind::Broken => 0.0,
            StateKind::Charging | StateKind::Cooldown => self
                .world
                .get::<&Gauge>(entity)
                .map_or(0.0, |gauge| gauge.normalized()),
        }
    }

    /// Normalized x on the attack axis. Charging moves from the home line to
    /// the execution line, cooldown moves back.
    pub fn battlefield_x(&self, entity: Entity) -> Option<f64> {
        let team = self.world.get::<&Settings>(entity).ok()?.team;
        let kind = self.world.get::<&ActionState>(entity).ok()?.kind;
        let (home, execution) = team_lines(team);
        let progress = self.normalized_progress(entity);
        Some(match kind {
            StateKind::Idle | StateKind::Broken => home,
            StateKind::Charging => home + (execution - home) * progress,
            StateKind::Ready => execution,
            StateKind::Cooldown => execution + (home - execution) * progress,
        })
    }

    /// Product of the accuracy buffs on the entity's team; 1.0 without buffs.
    pub fn team_accuracy_multiplier(&self, entity: Entity) -> f64 {
        let Some(buffs) = self.buffs else {
            return 1.0;
        };
        self.world
            .get::<&Settings>(entity)
            .map_or(1.0, |s| buffs.multiplier(s.team, BuffType::Accuracy))
    }

    pub fn medal_skill(&self, entity: Entity) -> i32 {
        self.world
            .get::<&Medal>(entity)
            .map_or(0, |m| m.skill_level)
    }

    pub fn config(&self) -> &'w GameConfig {
        self.config
    }

    pub fn catalog(&self) -> &'w Catalog {
        self.catalog
    }
}
