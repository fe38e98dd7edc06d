//! Battle-wide singletons held outside the ECS world.

use std::collections::VecDeque;

use hecs::Entity;

use medarot_core::constants::OUTBOUND_EVENT_CAPACITY;
use medarot_core::enums::{BattleOutcome, BattlePhase};
use medarot_core::events::BattleEvent;
use medarot_core::result::LastActionResult;

use crate::battle_log::BattleLog;
use crate::buffs::TeamBuffs;
use crate::event_bus::EventBus;

#[derive(Debug)]
pub struct BattleResources {
    pub tick: u64,
    pub phase: BattlePhase,
    /// Player-controlled actors waiting for an action choice.
    pub player_queue: VecDeque<Entity>,
    /// Actors whose charge completed, in arrival order. Never bounded.
    pub ready_queue: Vec<Entity>,
    pub last_result: LastActionResult,
    pub team_buffs: TeamBuffs,
    pub log: BattleLog,
    pub events: EventBus<BattleEvent>,
    pub outcome: Option<BattleOutcome>,
}

impl Default for BattleResources {
    fn default() -> Self {
        Self {
            tick: 0,
            phase: BattlePhase::default(),
            player_queue: VecDeque::new(),
            ready_queue: Vec::new(),
            last_result: LastActionResult::default(),
            team_buffs: TeamBuffs::default(),
            log: BattleLog::default(),
            events: EventBus::new("battle", OUTBOUND_EVENT_CAPACITY),
            outcome: None,
        }
    }
}

impl BattleResources {
    /// Drop an actor from both queues.
    pub fn remove_from_queues(&mut self, entity: Entity) {
        self.player_queue.retain(|e| *e != entity);
        self.ready_queue.retain(|e| *e != entity);
    }
}
