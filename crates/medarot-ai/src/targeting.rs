//! Target-selection strategies.
//!
//! Each strategy returns the (entity, slot) to preselect, or `None` when no
//! enemy part is targetable. Deterministic ties resolve in `units` order then
//! slot order; randomised choices draw one `pick` from the roll source.

use hecs::Entity;
use tracing::debug;

use medarot_core::enums::{PartCategory, PartSlot};
use medarot_core::rng::RollSource;

use crate::view::{TargetingContext, UnitView};

/// A targetable enemy part.
pub type TargetPick = (Entity, PartSlot);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStrategy {
    /// Highest current armor among enemy parts, non-head first.
    Crusher,
    /// Lowest current armor among enemy parts, non-head first.
    Hunter,
    /// Uniform over every intact enemy part including heads.
    Joker,
    /// Random intact part of the enemy leader.
    Leader,
    /// Fastest enemy legs.
    Chase,
    /// Enemy arms carrying melee or ranged weapons.
    Duel,
    /// Enemy parts that are neither melee nor ranged.
    Intercept,
    /// Whoever last damaged the actor.
    Counter,
    /// Whoever last damaged the actor's leader.
    Guard,
    /// The part the actor last hit.
    Focus,
    /// The part an AI teammate last hit.
    Assist,
}

impl TargetStrategy {
    pub fn select(self, ctx: &TargetingContext<'_>, rng: &mut dyn RollSource) -> Option<TargetPick> {
        let pick = match self {
            TargetStrategy::Crusher => crusher(ctx),
            TargetStrategy::Hunter => hunter(ctx),
            TargetStrategy::Joker => joker(ctx, rng),
            TargetStrategy::Leader => leader(ctx, rng),
            TargetStrategy::Chase => chase(ctx, rng),
            TargetStrategy::Duel => duel(ctx, rng),
            TargetStrategy::Intercept => intercept(ctx, rng),
            TargetStrategy::Counter => counter(ctx, rng),
            TargetStrategy::Guard => guard(ctx, rng),
            TargetStrategy::Focus => focus(ctx, rng),
            TargetStrategy::Assist => assist(ctx, rng),
        };
        debug!(strategy = ?self, ?pick, "target selected");
        pick
    }
}

/// Uniform pick over intact non-head slots, falling back to the head.
pub fn pick_damage_slot(intact: &[PartSlot], rng: &mut dyn RollSource) -> Option<PartSlot> {
    let body: Vec<PartSlot> = intact
        .iter()
        .copied()
        .filter(|s| *s != PartSlot::Head)
        .collect();
    if !body.is_empty() {
        return Some(body[rng.pick(body.len())]);
    }
    intact.iter().copied().find(|s| *s == PartSlot::Head)
}

fn pick_one(candidates: &[TargetPick], rng: &mut dyn RollSource) -> Option<TargetPick> {
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.pick(candidates.len())])
}

/// Intact enemy parts matching `filter`, in units then slot order.
fn enemy_parts(
    ctx: &TargetingContext<'_>,
    filter: impl Fn(&UnitView, PartSlot, PartCategory) -> bool,
) -> Vec<(TargetPick, i32)> {
    ctx.enemies()
        .into_iter()
        .flat_map(|unit| {
            unit.intact_parts()
                .filter(|p| filter(unit, p.slot, p.category))
                .map(|p| ((unit.entity, p.slot), p.current_armor))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Enemy parts with the non-head preference applied.
fn body_first(ctx: &TargetingContext<'_>) -> Vec<(TargetPick, i32)> {
    let body = enemy_parts(ctx, |_, slot, _| slot != PartSlot::Head);
    if body.is_empty() {
        enemy_parts(ctx, |_, _, _| true)
    } else {
        body
    }
}

fn crusher(ctx: &TargetingContext<'_>) -> Option<TargetPick> {
    body_first(ctx)
        .into_iter()
        .fold(None, |best: Option<(TargetPick, i32)>, cand| match best {
            Some(b) if b.1 >= cand.1 => Some(b),
            _ => Some(cand),
        })
        .map(|(pick, _)| pick)
}

fn hunter(ctx: &TargetingContext<'_>) -> Option<TargetPick> {
    body_first(ctx)
        .into_iter()
        .fold(None, |best: Option<(TargetPick, i32)>, cand| match best {
            Some(b) if b.1 <= cand.1 => Some(b),
            _ => Some(cand),
        })
        .map(|(pick, _)| pick)
}

pub fn joker(ctx: &TargetingContext<'_>, rng: &mut dyn RollSource) -> Option<TargetPick> {
    let all: Vec<TargetPick> = enemy_parts(ctx, |_, _, _| true)
        .into_iter()
        .map(|(pick, _)| pick)
        .collect();
    pick_one(&all, rng)
}

fn leader(ctx: &TargetingContext<'_>, rng: &mut dyn RollSource) -> Option<TargetPick> {
    if let Some(leader) = ctx.enemy_leader() {
        let parts: Vec<TargetPick> = leader
            .intact_parts()
            .map(|p| (leader.entity, p.slot))
            .collect();
        if let Some(pick) = pick_one(&parts, rng) {
            return Some(pick);
        }
    }
    joker(ctx, rng)
}

fn chase(ctx: &TargetingContext<'_>, rng: &mut dyn RollSource) -> Option<TargetPick> {
    let legs: Vec<(Entity, i32)> = ctx
        .enemies()
        .into_iter()
        .filter_map(|u| {
            u.part(PartSlot::Legs)
                .filter(|p| !p.is_broken)
                .map(|p| (u.entity, p.propulsion))
        })
        .collect();
    if let Some(fastest) = legs.iter().map(|(_, prop)| *prop).max() {
        let tied: Vec<TargetPick> = legs
            .iter()
            .filter(|(_, prop)| *prop == fastest)
            .map(|(e, _)| (*e, PartSlot::Legs))
            .collect();
        return pick_one(&tied, rng);
    }
    let non_legs: Vec<TargetPick> = enemy_parts(ctx, |_, slot, _| slot != PartSlot::Legs)
        .into_iter()
        .map(|(pick, _)| pick)
        .collect();
    if let Some(pick) = pick_one(&non_legs, rng) {
        return Some(pick);
    }
    joker(ctx, rng)
}

fn duel(ctx: &TargetingContext<'_>, rng: &mut dyn RollSource) -> Option<TargetPick> {
    let arms: Vec<TargetPick> = enemy_parts(ctx, |_, slot, category| {
        slot.is_arm() && matches!(category, PartCategory::Melee | PartCategory::Ranged)
    })
    .into_iter()
    .map(|(pick, _)| pick)
    .collect();
    pick_one(&arms, rng).or_else(|| joker(ctx, rng))
}

fn intercept(ctx: &TargetingContext<'_>, rng: &mut dyn RollSource) -> Option<TargetPick> {
    let parts: Vec<TargetPick> = enemy_parts(ctx, |_, _, category| {
        !matches!(category, PartCategory::Melee | PartCategory::Ranged)
    })
    .into_iter()
    .map(|(pick, _)| pick)
    .collect();
    pick_one(&parts, rng).or_else(|| joker(ctx, rng))
}

/// A random damageable part on `entity` if it is still a live enemy.
fn strike_back(
    ctx: &TargetingContext<'_>,
    entity: Option<Entity>,
    rng: &mut dyn RollSource,
) -> Option<TargetPick> {
    let entity = entity.filter(|e| ctx.is_live_enemy(*e))?;
    let unit = ctx.unit(entity)?;
    let intact: Vec<PartSlot> = unit.intact_parts().map(|p| p.slot).collect();
    pick_damage_slot(&intact, rng).map(|slot| (entity, slot))
}

fn counter(ctx: &TargetingContext<'_>, rng: &mut dyn RollSource) -> Option<TargetPick> {
    let attacker = ctx.actor_unit().and_then(|u| u.last_attacker);
    strike_back(ctx, attacker, rng).or_else(|| joker(ctx, rng))
}

fn guard(ctx: &TargetingContext<'_>, rng: &mut dyn RollSource) -> Option<TargetPick> {
    let team = ctx.actor_unit().map(|u| u.team);
    let attacker = ctx
        .units
        .iter()
        .find(|u| Some(u.team) == team && u.is_leader)
        .and_then(|leader| leader.last_attacker);
    strike_back(ctx, attacker, rng).or_else(|| joker(ctx, rng))
}

/// `last_hit` if the entity is a live enemy and the slot is intact.
fn still_valid(ctx: &TargetingContext<'_>, last_hit: Option<TargetPick>) -> Option<TargetPick> {
    let (entity, slot) = last_hit?;
    if !ctx.is_live_enemy(entity) {
        return None;
    }
    ctx.unit(entity)
        .filter(|u| u.is_part_intact(slot))
        .map(|_| (entity, slot))
}

fn focus(ctx: &TargetingContext<'_>, rng: &mut dyn RollSource) -> Option<TargetPick> {
    let last_hit = ctx.actor_unit().and_then(|u| u.last_hit);
    still_valid(ctx, last_hit).or_else(|| joker(ctx, rng))
}

fn assist(ctx: &TargetingContext<'_>, rng: &mut dyn RollSource) -> Option<TargetPick> {
    ctx.allies()
        .into_iter()
        .filter(|u| u.is_ai)
        .find_map(|u| still_valid(ctx, u.last_hit))
        .or_else(|| joker(ctx, rng))
}
