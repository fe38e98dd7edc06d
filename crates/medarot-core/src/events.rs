//! Typed events crossing the simulation / presentation boundary.
//!
//! `BattleEvent` flows from the simulation to presentation, `UiEvent` flows
//! back. Neither direction carries callbacks.

use hecs::Entity;

use crate::enums::*;
use crate::result::ActionResult;

/// One selectable action in the action modal.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOption {
    pub slot: PartSlot,
    pub part_name: String,
    pub category: PartCategory,
    pub part_trait: PartTrait,
    /// Suggested enemy for preselected actions (closest on the attack axis).
    pub default_target: Option<Entity>,
}

/// View model for the action selection modal.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionModalView {
    pub actor: Entity,
    pub actor_name: String,
    pub options: Vec<ActionOption>,
}

/// Events emitted by the simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum BattleEvent {
    PlayerActionRequired { actor: Entity },
    ShowActionModal(ActionModalView),
    HideActionModal,
    ActionAnimationStarted(ActionResult),
    PartBroken {
        entity: Entity,
        slot: PartSlot,
        part_id: String,
    },
    GameOver(BattleOutcome),
    StateChangeRequested(BattlePhase),
    MessageDisplayRequest(Vec<String>),
    /// The host should leave the battle scene.
    ExitRequested,
}

/// Events consumed by the simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    PlayerActionIntent {
        actor: Entity,
        slot: PartSlot,
        target: Option<Entity>,
        target_slot: Option<PartSlot>,
    },
    ActionConfirmed,
    ActionCanceled,
    ActionAnimationFinished,
    MessageDisplayFinished,
    GoToTitle,
}
