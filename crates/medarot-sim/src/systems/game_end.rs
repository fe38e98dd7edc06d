//! Game-end detection.

use hecs::World;

use medarot_core::components::{ActionState, Settings};
use medarot_core::enums::{BattleOutcome, Team};

/// Whether a team has lost, and the tick its defeat is dated from.
fn defeat(world: &World, team: Team) -> Option<u64> {
    let mut members = 0usize;
    let mut broken_members = 0usize;
    let mut latest_break = 0u64;
    let mut leader_break: Option<u64> = None;

    for (_, (settings, state)) in world.query::<(&Settings, &ActionState)>().iter() {
        if settings.team != team {
            continue;
        }
        members += 1;
        if state.is_broken() {
            broken_members += 1;
            let tick = state.broken_at_tick.unwrap_or(0);
            latest_break = latest_break.max(tick);
            if settings.is_leader {
                leader_break = Some(tick);
            }
        }
    }

    if leader_break.is_some() {
        return leader_break;
    }
    (members > 0 && broken_members == members).then_some(latest_break)
}

/// Outcome once at least one team has lost.
///
/// When both teams are defeated the team whose leader (or last member)
/// broke earlier loses; identical ticks are a draw.
pub fn check(world: &World) -> Option<BattleOutcome> {
    match (defeat(world, Team::One), defeat(world, Team::Two)) {
        (None, None) => None,
        (Some(_), None) => Some(BattleOutcome::Winner(Team::Two)),
        (None, Some(_)) => Some(BattleOutcome::Winner(Team::One)),
        (Some(one), Some(two)) => Some(match one.cmp(&two) {
            std::cmp::Ordering::Less => BattleOutcome::Winner(Team::Two),
            std::cmp::Ordering::Greater => BattleOutcome::Winner(Team::One),
            std::cmp::Ordering::Equal => BattleOutcome::Draw,
        }),
    }
}
