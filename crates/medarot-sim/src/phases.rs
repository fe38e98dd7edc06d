//! Battle phase state machine. Exactly one phase updates per tick.

use hecs::Entity;
use tracing::info;

use medarot_core::enums::{BattleOutcome, BattlePhase, PartCategory, StateKind, TargetPolicy};
use medarot_core::events::{ActionModalView, ActionOption, BattleEvent};

use crate::battle_log::LogEvent;
use crate::engine::BattleEngine;
use crate::part_info::PartInfo;
use crate::roster::{name_of, state_of};
use crate::systems;
use crate::target_selector::closest_enemy;

impl BattleEngine {
    pub(crate) fn update_phase(&mut self) {
        match self.res.phase {
            BattlePhase::GaugeProgress => self.gauge_progress(),
            BattlePhase::PlayerActionSelect => self.player_action_select(),
            BattlePhase::ActionExecution => self.action_execution(),
            BattlePhase::AnimatingAction => {
                if self.animation_done {
                    self.transition(BattlePhase::PostAction);
                }
            }
            BattlePhase::PostAction => self.post_action(),
            BattlePhase::Message => {
                if self.message_done {
                    match systems::game_end::check(&self.world) {
                        Some(outcome) => self.finish(outcome),
                        None => self.transition(BattlePhase::GaugeProgress),
                    }
                }
            }
            BattlePhase::GameOver => {}
        }
    }

    fn gauge_progress(&mut self) {
        systems::gauge::run(&mut self.world, &mut self.res.ready_queue);

        let queued = systems::player_input::run(&self.world, &self.catalog, &mut self.res.player_queue);
        for actor in queued {
            self.emit(BattleEvent::PlayerActionRequired { actor });
        }

        systems::ai_input::run(
            &mut self.world,
            &self.catalog,
            &self.config,
            &self.registry,
            self.rng.as_mut(),
            &mut self.warned_personality,
        );

        systems::status_effects::run(&mut self.world, &mut self.res);

        if let Some(outcome) = systems::game_end::check(&self.world) {
            self.finish(outcome);
        } else if !self.res.player_queue.is_empty() {
            self.transition(BattlePhase::PlayerActionSelect);
        } else if !self.res.ready_queue.is_empty() {
            self.transition(BattlePhase::ActionExecution);
        }
    }

    fn player_action_select(&mut self) {
        while let Some(&head) = self.res.player_queue.front() {
            if state_of(&self.world, head) == Some(StateKind::Idle) {
                break;
            }
            self.res.player_queue.pop_front();
            if self.modal_shown == Some(head) {
                self.modal_shown = None;
                self.emit(BattleEvent::HideActionModal);
            }
        }
        let Some(&head) = self.res.player_queue.front() else {
            self.pending_intent = None;
            self.transition(BattlePhase::GaugeProgress);
            return;
        };
        if self.modal_shown != Some(head) {
            let view = self.action_modal(head);
            self.modal_shown = Some(head);
            self.emit(BattleEvent::ShowActionModal(view));
        }
    }

    fn action_execution(&mut self) {
        let result = systems::action_queue::execute_next(
            &mut self.world,
            &self.catalog,
            &self.config,
            &mut self.res,
            self.rng.as_mut(),
        );
        match result {
            Some(result) => {
                self.res.last_result.set(result.clone());
                self.emit(BattleEvent::ActionAnimationStarted(result));
                self.transition(BattlePhase::AnimatingAction);
            }
            None => self.transition(BattlePhase::GaugeProgress),
        }
    }

    fn post_action(&mut self) {
        let lines = systems::post_action::apply_action_result(
            &mut self.world,
            &self.catalog,
            &self.config,
            &mut self.res,
        )
        .unwrap_or_default();
        self.emit(BattleEvent::MessageDisplayRequest(lines));
        self.transition(BattlePhase::Message);
    }

    /// Closest live enemy, suggested as the target of preselected actions.
    pub(crate) fn default_target(&self, actor: Entity) -> Option<Entity> {
        let info = PartInfo::new(&self.world, &self.catalog, &self.config);
        closest_enemy(&self.world, &info, actor)
    }

    fn action_modal(&self, actor: Entity) -> ActionModalView {
        let suggestion = self.default_target(actor);
        let options = systems::ai_input::available_parts(&self.world, &self.catalog, actor)
            .into_iter()
            .map(|choice| {
                let category = choice.definition.category;
                let preselected = TargetPolicy::for_category(category) == TargetPolicy::Preselected
                    && category != PartCategory::Support;
                ActionOption {
                    slot: choice.slot,
                    part_name: choice.definition.name.clone(),
                    category,
                    part_trait: choice.definition.part_trait,
                    default_target: if preselected { suggestion } else { None },
                }
            })
            .collect();
        ActionModalView {
            actor,
            actor_name: name_of(&self.world, actor),
            options,
        }
    }

    pub(crate) fn transition(&mut self, phase: BattlePhase) {
        info!(tick = self.res.tick, from = ?self.res.phase, to = ?phase, "phase change");
        self.res.phase = phase;
        match phase {
            BattlePhase::AnimatingAction => self.animation_done = self.battle.headless,
            BattlePhase::Message => self.message_done = self.battle.headless,
            _ => {}
        }
        self.emit(BattleEvent::StateChangeRequested(phase));
    }

    /// Record the outcome and enter game over. Runs at most once.
    fn finish(&mut self, outcome: BattleOutcome) {
        if self.res.outcome.is_some() {
            return;
        }
        self.res.outcome = Some(outcome);
        self.res.log.record(self.res.tick, LogEvent::GameOver { outcome });
        self.emit(BattleEvent::GameOver(outcome));
        self.transition(BattlePhase::GameOver);
    }
}
