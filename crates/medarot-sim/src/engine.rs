//! The battle engine.
//!
//! `BattleEngine` owns one battle: its hecs world, its roll source and the
//! battle singletons. Each tick it drains UI events, advances one phase and
//! returns a `BattleSnapshot`. It never touches presentation, so a battle can
//! be replayed exactly from its seed.

use std::collections::HashSet;
use std::sync::Arc;

use hecs::{Entity, World};
use tracing::{info, warn};

use medarot_ai::PersonalityRegistry;
use medarot_core::catalog::{Catalog, Loadout};
use medarot_core::components::Settings;
use medarot_core::config::{BattleConfig, GameConfig};
use medarot_core::constants::INBOUND_EVENT_CAPACITY;
use medarot_core::enums::{BattleOutcome, BattlePhase, PartSlot};
use medarot_core::error::{BattleError, Result};
use medarot_core::events::{BattleEvent, UiEvent};
use medarot_core::result::LastActionResult;
use medarot_core::rng::RollSource;
use medarot_core::state::BattleSnapshot;

use crate::battle_log::BattleLog;
use crate::buffs::TeamBuffs;
use crate::event_bus::EventBus;
use crate::resources::BattleResources;
use crate::rng::BattleRng;
use crate::systems;
use crate::world_setup;

/// A player's action choice waiting for confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingIntent {
    pub actor: Entity,
    pub slot: PartSlot,
    pub target: Option<Entity>,
    pub target_slot: Option<PartSlot>,
}

/// The battle engine. Owns the ECS world and all battle state.
pub struct BattleEngine {
    pub(crate) world: World,
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) config: GameConfig,
    pub(crate) battle: BattleConfig,
    pub(crate) rng: Box<dyn RollSource>,
    pub(crate) registry: PersonalityRegistry,
    pub(crate) res: BattleResources,
    pub(crate) inbound: EventBus<UiEvent>,
    pub(crate) warned_personality: HashSet<Entity>,
    pub(crate) pending_intent: Option<PendingIntent>,
    pub(crate) modal_shown: Option<Entity>,
    pub(crate) animation_done: bool,
    pub(crate) message_done: bool,
    pub(crate) exit_requested: bool,
    roster: Vec<Entity>,
}

impl BattleEngine {
    /// Create a battle seeded from `battle.seed`.
    pub fn new(
        catalog: Arc<Catalog>,
        config: GameConfig,
        battle: BattleConfig,
        loadouts: &[Loadout],
    ) -> Result<Self> {
        let rng = Box::new(BattleRng::seed_from_u64(battle.seed));
        Self::with_rng(catalog, config, battle, loadouts, rng)
    }

    /// Create a battle drawing from an explicit roll source.
    pub fn with_rng(
        catalog: Arc<Catalog>,
        config: GameConfig,
        battle: BattleConfig,
        loadouts: &[Loadout],
        rng: Box<dyn RollSource>,
    ) -> Result<Self> {
        let mut world = World::new();
        let roster = world_setup::initialize_battle_world(&mut world, &catalog, loadouts)?;
        info!(
            seed = battle.seed,
            combatants = roster.len(),
            headless = battle.headless,
            "battle created"
        );
        Ok(Self {
            world,
            catalog,
            config,
            battle,
            rng,
            registry: PersonalityRegistry::builtin(),
            res: BattleResources::default(),
            inbound: EventBus::new("ui", INBOUND_EVENT_CAPACITY),
            warned_personality: HashSet::new(),
            pending_intent: None,
            modal_shown: None,
            animation_done: false,
            message_done: false,
            exit_requested: false,
            roster,
        })
    }

    /// Queue a UI event for processing at the next tick boundary.
    pub fn send(&mut self, event: UiEvent) -> bool {
        self.inbound.push(event)
    }

    /// Advance the battle by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> BattleSnapshot {
        self.process_inbound();
        self.update_phase();
        self.res.tick += 1;
        self.snapshot()
    }

    /// Tick until the battle ends or `max_ticks` elapse. Outbound events are
    /// discarded, so this is only meant for headless runs.
    pub fn run_to_completion(&mut self, max_ticks: u64) -> Option<BattleOutcome> {
        while self.res.outcome.is_none() && self.res.tick < max_ticks {
            self.tick();
            self.res.events.drain();
        }
        self.res.outcome
    }

    /// Start a charge on behalf of the caller.
    pub fn start_charge(
        &mut self,
        actor: Entity,
        slot: PartSlot,
        target: Option<(Entity, Option<PartSlot>)>,
    ) -> Result<()> {
        systems::charge::start_charge(&mut self.world, &self.catalog, &self.config, actor, slot, target)
            .map_err(BattleError::InvalidCharge)
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        self.res.events.drain()
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        systems::snapshot::build_snapshot(&self.world, &self.res)
    }

    pub fn phase(&self) -> BattlePhase {
        self.res.phase
    }

    /// Ticks elapsed since the battle started.
    pub fn current_tick(&self) -> u64 {
        self.res.tick
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.res.outcome
    }

    /// Whether the player asked to leave after game over.
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn log(&self) -> &BattleLog {
        &self.res.log
    }

    pub fn team_buffs(&self) -> &TeamBuffs {
        &self.res.team_buffs
    }

    pub fn last_result(&self) -> &LastActionResult {
        &self.res.last_result
    }

    /// Combatant entities in loadout order.
    pub fn combatants(&self) -> &[Entity] {
        &self.roster
    }

    /// Combatant spawned from the loadout with `id`.
    pub fn find(&self, id: &str) -> Option<Entity> {
        self.roster.iter().copied().find(|e| {
            self.world
                .get::<&Settings>(*e)
                .map(|s| s.id == id)
                .unwrap_or(false)
        })
    }

    #[cfg(test)]
    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[cfg(test)]
    pub(crate) fn resources_mut(&mut self) -> &mut BattleResources {
        &mut self.res
    }

    pub(crate) fn emit(&mut self, event: BattleEvent) {
        self.res.events.push(event);
    }

    /// Process all queued UI events.
    fn process_inbound(&mut self) {
        while let Some(event) = self.inbound.pop() {
            self.handle_ui_event(event);
        }
    }

    /// Handle a single UI event. Events that do not fit the current phase
    /// are ignored.
    fn handle_ui_event(&mut self, event: UiEvent) {
        let phase = self.res.phase;
        match event {
            UiEvent::PlayerActionIntent {
                actor,
                slot,
                target,
                target_slot,
            } => {
                if phase == BattlePhase::PlayerActionSelect
                    && self.res.player_queue.front() == Some(&actor)
                {
                    self.pending_intent = Some(PendingIntent {
                        actor,
                        slot,
                        target,
                        target_slot,
                    });
                } else {
                    warn!(?actor, ?phase, "player intent ignored");
                }
            }
            UiEvent::ActionConfirmed => {
                if phase == BattlePhase::PlayerActionSelect {
                    self.confirm_player_action();
                }
            }
            UiEvent::ActionCanceled => {
                if phase == BattlePhase::PlayerActionSelect {
                    self.pending_intent = None;
                    self.modal_shown = None;
                }
            }
            UiEvent::ActionAnimationFinished => {
                if phase == BattlePhase::AnimatingAction {
                    self.animation_done = true;
                }
            }
            UiEvent::MessageDisplayFinished => {
                if phase == BattlePhase::Message {
                    self.message_done = true;
                }
            }
            UiEvent::GoToTitle => {
                if phase == BattlePhase::GameOver && !self.exit_requested {
                    self.exit_requested = true;
                    info!("leaving battle");
                    self.emit(BattleEvent::ExitRequested);
                }
            }
        }
    }

    /// Commit the pending intent through charge initiation. A rejection
    /// re-shows the modal for the same actor.
    fn confirm_player_action(&mut self) {
        let Some(intent) = self.pending_intent.take() else {
            warn!("action confirmed without a pending intent");
            return;
        };
        let target = match intent.target {
            Some(entity) => Some((entity, intent.target_slot)),
            None => self.default_target(intent.actor).map(|e| (e, None)),
        };
        match systems::charge::start_charge(
            &mut self.world,
            &self.catalog,
            &self.config,
            intent.actor,
            intent.slot,
            target,
        ) {
            Ok(()) => {
                self.res.player_queue.retain(|e| *e != intent.actor);
                self.modal_shown = None;
                self.emit(BattleEvent::HideActionModal);
            }
            Err(rejection) => {
                warn!(actor = ?intent.actor, %rejection, "player action rejected");
                self.modal_shown = None;
            }
        }
    }
}
