//! Trait handlers: turn a ready actor's intent into an `ActionResult`.
//!
//! Handlers only read the world. The one piece of shared state they mutate
//! is the team buff ledger (support). Armor changes happen later, in
//! post-action effects.

use hecs::{Entity, World};
use tracing::debug;

use medarot_core::catalog::{ActionFormula, Catalog, PartDefinition};
use medarot_core::components::{ActiveEffect, EffectPayload, Parts, Target};
use medarot_core::config::GameConfig;
use medarot_core::enums::{BuffType, DebuffKind, PartParameter, PartSlot, PartTrait, TargetPolicy};
use medarot_core::result::{ActionFailure, ActionResult};
use medarot_core::rng::RollSource;

use crate::battle_log::{BattleLog, LogEvent};
use crate::buffs::{BuffSource, TeamBuffs};
use crate::calculators::{self, DamageInput};
use crate::part_info::PartInfo;
use crate::roster::{name_of, team_of};
use crate::target_selector::{closest_enemy, defense_part, is_valid_target, part_to_damage};

/// Everything a handler may touch while executing.
pub struct ActionContext<'a> {
    pub world: &'a World,
    pub catalog: &'a Catalog,
    pub config: &'a GameConfig,
    pub buffs: &'a mut TeamBuffs,
    pub log: &'a mut BattleLog,
    pub rng: &'a mut dyn RollSource,
    pub tick: u64,
}

/// Execution behaviour selected by a part's trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraitHandler {
    /// Shoot, aim, strike and berserk: hit, critical, damage and guard rolls.
    Attack,
    /// Team accuracy buff.
    Support,
    /// Needs a live preselected target; no on-hit effect.
    Obstruct,
}

impl TraitHandler {
    pub fn for_trait(part_trait: PartTrait) -> TraitHandler {
        match part_trait {
            PartTrait::Support => TraitHandler::Support,
            PartTrait::Obstruct => TraitHandler::Obstruct,
            PartTrait::Shoot
            | PartTrait::Aim
            | PartTrait::Strike
            | PartTrait::Berserk
            | PartTrait::None => TraitHandler::Attack,
        }
    }

    pub fn execute(
        self,
        ctx: &mut ActionContext<'_>,
        actor: Entity,
        slot: PartSlot,
        definition: &PartDefinition,
    ) -> ActionResult {
        let formula = ctx.catalog.formula(definition.part_trait);
        let mut result = ActionResult::new(actor, slot);
        result.attacker_name = name_of(ctx.world, actor);
        result.action_name = definition.name.clone();
        result.action_trait = definition.part_trait;
        result.category = definition.category;
        result.weapon_type = definition.weapon_type;

        match self {
            TraitHandler::Attack => attack(ctx, &formula, &mut result),
            TraitHandler::Support => support(ctx, &formula, &mut result),
            TraitHandler::Obstruct => obstruct(ctx, &mut result),
        }
        result
    }
}

fn user_debuffs(formula: &ActionFormula) -> Vec<ActiveEffect> {
    formula
        .user_debuffs
        .iter()
        .map(|debuff| ActiveEffect {
            payload: match debuff.kind {
                DebuffKind::Evasion => EffectPayload::EvasionDebuff {
                    multiplier: debuff.multiplier,
                },
                DebuffKind::Defense => EffectPayload::DefenseDebuff {
                    multiplier: debuff.multiplier,
                },
            },
            remaining_ticks: debuff.duration_ticks,
        })
        .collect()
}

fn recorded_target(world: &World, actor: Entity) -> Target {
    world
        .get::<&Target>(actor)
        .map(|t| *t)
        .unwrap_or_default()
}

/// Target entity for an attack, plus the slot when it was recorded at
/// charge time. A recorded slot that has since broken invalidates the attack.
fn resolve_attack_target(
    ctx: &ActionContext<'_>,
    actor: Entity,
) -> Option<(Entity, Option<PartSlot>)> {
    let recorded = recorded_target(ctx.world, actor);
    match recorded.policy {
        TargetPolicy::Preselected => {
            let target = recorded
                .entity
                .filter(|e| is_valid_target(ctx.world, *e, None))?;
            match recorded.slot {
                Some(slot) => is_valid_target(ctx.world, target, Some(slot))
                    .then_some((target, Some(slot))),
                None => Some((target, None)),
            }
        }
        TargetPolicy::ClosestAtExecution => {
            let info = PartInfo::new(ctx.world, ctx.catalog, ctx.config);
            closest_enemy(ctx.world, &info, actor).map(|target| (target, None))
        }
    }
}

fn part_id_at(world: &World, entity: Entity, slot: PartSlot) -> Option<String> {
    world
        .get::<&Parts>(entity)
        .ok()
        .map(|parts| parts.get(slot).definition_id.clone())
}

fn current_armor(world: &World, entity: Entity, slot: PartSlot) -> i32 {
    world
        .get::<&Parts>(entity)
        .map_or(0, |parts| parts.get(slot).current_armor)
}

/// Draws happen in a fixed order: hit, critical, jitter, defense, then the
/// damaged part when none was recorded at charge time. Misses still pick
/// the part so the result names what was aimed at.
fn attack(ctx: &mut ActionContext<'_>, formula: &ActionFormula, result: &mut ActionResult) {
    let actor = result.actor;
    let Some((target, recorded_slot)) = resolve_attack_target(ctx, actor) else {
        debug!(?actor, "attack has no valid target");
        result.failure = Some(ActionFailure::NoValidTarget);
        return;
    };
    result.target = Some(target);
    result.defender_name = name_of(ctx.world, target);
    result.applied_effects = user_debuffs(formula);

    let info = PartInfo::new(ctx.world, ctx.catalog, ctx.config).with_buffs(&*ctx.buffs);
    let success = info.success_rate(actor, result.acting_slot, formula);
    let evasion = info.evasion_rate(target);

    let hit_chance = calculators::hit_chance(ctx.config, success, evasion);
    let hit_roll = ctx.rng.roll_percent();
    debug!(success, evasion, hit_chance, hit_roll, "hit check");
    if !calculators::roll_succeeds(hit_roll, hit_chance) {
        result.intended_slot =
            recorded_slot.or_else(|| part_to_damage(ctx.world, target, &mut *ctx.rng));
        return;
    }

    let critical_chance = calculators::critical_chance(
        &ctx.config.damage.critical,
        success,
        formula.critical_rate_bonus,
    );
    let critical_roll = ctx.rng.roll_percent();
    let is_critical = calculators::roll_succeeds(critical_roll, critical_chance);
    debug!(critical_chance, critical_roll, critical = is_critical, "critical check");

    let jitter = calculators::jitter(&ctx.config.damage, ctx.rng.variance());
    let damage = calculators::damage(
        &ctx.config.damage,
        DamageInput {
            success_rate: success,
            evasion_rate: if is_critical { 0.0 } else { evasion },
            power: info.power(actor, result.acting_slot, formula),
            medal_skill: info.medal_skill(actor),
            jitter,
        },
    );

    let mut guarded_by = None;
    if let Some(guard_slot) = defense_part(ctx.world, target) {
        let chance = calculators::defense_chance(ctx.config, info.defense_rate(target), success);
        let roll = ctx.rng.roll_percent();
        debug!(chance, roll, ?guard_slot, "defense check");
        if calculators::roll_succeeds(roll, chance) {
            guarded_by = Some(guard_slot);
        }
    }

    let Some(intended) =
        recorded_slot.or_else(|| part_to_damage(ctx.world, target, &mut *ctx.rng))
    else {
        result.failure = Some(ActionFailure::NoValidTarget);
        return;
    };

    let (hit_slot, final_damage) = match guarded_by {
        Some(guard_slot) => {
            let legs_defense = info.part_parameter(target, PartSlot::Legs, PartParameter::Defense);
            (guard_slot, calculators::defended_damage(damage, legs_defense))
        }
        None => (intended, damage),
    };

    result.action_did_hit = true;
    result.is_critical = is_critical;
    result.is_defended = guarded_by.is_some();
    result.intended_slot = Some(intended);
    result.original_damage = damage;
    result.actual_hit_slot = Some(hit_slot);
    result.damage_to_apply = final_damage;
    result.damage_dealt = final_damage.min(current_armor(ctx.world, target, hit_slot));
    result.target_part_id = part_id_at(ctx.world, target, hit_slot);
}

fn support(ctx: &mut ActionContext<'_>, formula: &ActionFormula, result: &mut ActionResult) {
    let actor = result.actor;
    let Some(team) = team_of(ctx.world, actor) else {
        result.failure = Some(ActionFailure::NoValidTarget);
        return;
    };
    let power = PartInfo::new(ctx.world, ctx.catalog, ctx.config).power(actor, result.acting_slot, formula);
    let multiplier = 1.0 + power / 100.0;
    ctx.buffs.add(
        team,
        BuffType::Accuracy,
        BuffSource {
            source: actor,
            slot: result.acting_slot,
            value: multiplier,
        },
    );
    ctx.log.record(
        ctx.tick,
        LogEvent::BuffApplied {
            team,
            buff: BuffType::Accuracy,
            multiplier,
        },
    );
    result.applied_effects = user_debuffs(formula);
    result.action_did_hit = true;
}

fn obstruct(ctx: &mut ActionContext<'_>, result: &mut ActionResult) {
    let recorded = recorded_target(ctx.world, result.actor);
    match recorded
        .entity
        .filter(|e| is_valid_target(ctx.world, *e, None))
    {
        Some(target) => {
            result.target = Some(target);
            result.intended_slot = recorded.slot;
            result.defender_name = name_of(ctx.world, target);
            result.action_did_hit = true;
        }
        None => result.failure = Some(ActionFailure::NoValidTarget),
    }
}
