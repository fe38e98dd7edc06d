//! ECS systems that operate on the battle world each tick.
//!
//! Systems are plain functions over `&mut World` (or `&World` for read-only
//! work) plus whichever battle singletons they need. They own no state.

pub mod action_queue;
pub mod ai_input;
pub mod charge;
pub mod game_end;
pub mod gauge;
pub mod player_input;
pub mod post_action;
pub mod snapshot;
pub mod status_effects;
