//! Action queue executor: at most one ready actor acts per tick.

use hecs::{Entity, World};
use tracing::debug;

use medarot_core::catalog::Catalog;
use medarot_core::components::{ActionIntent, Parts};
use medarot_core::config::GameConfig;
use medarot_core::result::ActionResult;
use medarot_core::rng::RollSource;

use crate::handlers::{ActionContext, TraitHandler};
use crate::part_info::PartInfo;
use crate::resources::BattleResources;
use crate::roster::is_broken;
use crate::systems::charge::reset_to_idle;

/// The ready queue ordered for execution: descending legs propulsion,
/// arrival order among equals.
pub fn execution_order(
    world: &World,
    catalog: &Catalog,
    config: &GameConfig,
    ready_queue: &[Entity],
) -> Vec<Entity> {
    let info = PartInfo::new(world, catalog, config);
    let mut order: Vec<(f64, Entity)> = ready_queue
        .iter()
        .map(|e| (info.overall_propulsion(*e), *e))
        .collect();
    order.sort_by(|a, b| b.0.total_cmp(&a.0));
    order.into_iter().map(|(_, e)| e).collect()
}

/// Remove the fastest ready actor and execute its action.
///
/// Returns `None` when the queue is empty or the action was dropped
/// (actor broken, or acting part broken or unknown).
pub fn execute_next(
    world: &mut World,
    catalog: &Catalog,
    config: &GameConfig,
    res: &mut BattleResources,
    rng: &mut dyn RollSource,
) -> Option<ActionResult> {
    let head = *execution_order(world, catalog, config, &res.ready_queue).first()?;
    if let Some(position) = res.ready_queue.iter().position(|e| *e == head) {
        res.ready_queue.remove(position);
    }
    execute_action(world, catalog, config, res, rng, head)
}

fn execute_action(
    world: &mut World,
    catalog: &Catalog,
    config: &GameConfig,
    res: &mut BattleResources,
    rng: &mut dyn RollSource,
    actor: Entity,
) -> Option<ActionResult> {
    if is_broken(world, actor) {
        return None;
    }
    let slot = world.get::<&ActionIntent>(actor).ok().and_then(|i| i.slot);
    let definition = slot.and_then(|slot| {
        let parts = world.get::<&Parts>(actor).ok()?;
        let part = parts.get(slot);
        if part.is_broken {
            return None;
        }
        catalog.part(&part.definition_id)
    });
    let (Some(slot), Some(definition)) = (slot, definition) else {
        debug!(?actor, "acting part unavailable, action dropped");
        reset_to_idle(world, actor);
        return None;
    };

    let mut ctx = ActionContext {
        world: &*world,
        catalog,
        config,
        buffs: &mut res.team_buffs,
        log: &mut res.log,
        rng,
        tick: res.tick,
    };
    let result = TraitHandler::for_trait(definition.part_trait).execute(&mut ctx, actor, slot, definition);
    res.log.record_result(res.tick, &result);
    Some(result)
}
