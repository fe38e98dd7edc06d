//! AI for Medarot combatants.
//!
//! A personality pairs a part-selection strategy with a target-selection
//! strategy. Strategies are pure functions over plain data
//! ([`view::TargetingContext`]) and draw randomness only from the battle's
//! injected roll source. No ECS dependency beyond entity handles.

pub mod part_selection;
pub mod personality;
pub mod targeting;
pub mod view;

pub use medarot_core as core;
pub use personality::{Personality, PersonalityRegistry};
