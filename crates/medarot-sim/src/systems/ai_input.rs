//! AI input system: idle AI combatants pick a part and a target, then charge.

use std::collections::HashSet;

use hecs::{Entity, World};
use tracing::{debug, warn};

use medarot_ai::part_selection::PartChoice;
use medarot_ai::view::{SlotView, TargetingContext, UnitView};
use medarot_ai::PersonalityRegistry;
use medarot_core::catalog::Catalog;
use medarot_core::components::*;
use medarot_core::config::GameConfig;
use medarot_core::enums::{PartCategory, PartSlot, StateKind};
use medarot_core::rng::RollSource;

use crate::roster::{combatants_sorted, has_component};
use crate::systems::charge::start_charge;

/// Plain-data view of every combatant for the targeting strategies.
pub fn build_unit_views(world: &World, catalog: &Catalog) -> Vec<UnitView> {
    combatants_sorted(world)
        .into_iter()
        .filter_map(|entity| {
            let settings = world.get::<&Settings>(entity).ok()?;
            let state = world.get::<&ActionState>(entity).ok()?;
            let parts = world.get::<&Parts>(entity).ok()?;
            let last_attacker = world
                .get::<&TargetHistory>(entity)
                .ok()
                .and_then(|h| h.last_attacker);
            let last_hit = world.get::<&LastActionHistory>(entity).ok().and_then(|h| {
                h.last_hit_target.zip(h.last_hit_slot)
            });
            let slots = PartSlot::ALL
                .into_iter()
                .map(|slot| {
                    let part = parts.get(slot);
                    let definition = catalog.part(&part.definition_id);
                    SlotView {
                        slot,
                        category: definition.map_or(PartCategory::None, |d| d.category),
                        current_armor: part.current_armor,
                        propulsion: definition.map_or(0, |d| d.propulsion),
                        is_broken: part.is_broken,
                    }
                })
                .collect();
            Some(UnitView {
                entity,
                team: settings.team,
                is_leader: settings.is_leader,
                is_broken: state.is_broken(),
                is_ai: has_component::<AiControl>(world, entity),
                parts: slots,
                last_attacker,
                last_hit,
            })
        })
        .collect()
}

/// Intact head and arm parts that carry an action.
pub fn available_parts<'c>(world: &World, catalog: &'c Catalog, actor: Entity) -> Vec<PartChoice<'c>> {
    let Ok(parts) = world.get::<&Parts>(actor) else {
        return Vec::new();
    };
    PartSlot::ACTION_SLOTS
        .into_iter()
        .filter(|slot| !parts.is_broken(*slot))
        .filter_map(|slot| {
            let definition = catalog.part(&parts.get(slot).definition_id)?;
            definition
                .category
                .is_action()
                .then_some(PartChoice { slot, definition })
        })
        .collect()
}

/// Run one pass of AI decisions. `warned` remembers actors whose unknown
/// personality id was already reported.
pub fn run(
    world: &mut World,
    catalog: &Catalog,
    config: &GameConfig,
    registry: &PersonalityRegistry,
    rng: &mut dyn RollSource,
    warned: &mut HashSet<Entity>,
) {
    let idle_ai: Vec<(Entity, String)> = combatants_sorted(world)
        .into_iter()
        .filter_map(|entity| {
            let ai = world.get::<&AiControl>(entity).ok()?;
            let idle = world.get::<&ActionState>(entity).ok()?.kind == StateKind::Idle;
            idle.then(|| (entity, ai.personality.clone()))
        })
        .collect();
    if idle_ai.is_empty() {
        return;
    }
    let views = build_unit_views(world, catalog);

    for (actor, personality_id) in idle_ai {
        let available = available_parts(world, catalog, actor);
        if available.is_empty() {
            debug!(?actor, "no usable action parts");
            continue;
        }
        let (personality, used_fallback) = registry.resolve(&personality_id);
        if used_fallback && warned.insert(actor) {
            warn!(
                ?actor,
                personality = %personality_id,
                fallback = personality.name,
                "unknown personality id, using fallback"
            );
        }
        let Some(choice) = personality.select_part(&available) else {
            continue;
        };
        let ctx = TargetingContext {
            actor,
            units: &views,
        };
        let pick = personality.select_target(&ctx, rng);
        let target = match choice.definition.category {
            PartCategory::Melee | PartCategory::Support => None,
            _ => pick.map(|(entity, slot)| (entity, Some(slot))),
        };
        debug!(?actor, slot = ?choice.slot, ?target, personality = personality.name, "ai decision");
        if let Err(rejection) = start_charge(world, catalog, config, actor, choice.slot, target) {
            warn!(?actor, %rejection, "ai charge rejected");
        }
    }
}
