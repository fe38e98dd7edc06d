//! Battle simulation engine for Medarot.
//!
//! Owns the hecs ECS world and the per-battle RNG, runs the phase state
//! machine one tick at a time, and produces `BattleSnapshot`s and typed
//! events for presentation. Completely headless.

pub mod battle_log;
pub mod buffs;
pub mod calculators;
pub mod engine;
pub mod event_bus;
pub mod handlers;
pub mod loader;
pub mod part_info;
mod phases;
pub mod resources;
pub mod rng;
pub mod roster;
pub mod systems;
pub mod target_selector;
pub mod world_setup;

pub use engine::BattleEngine;
pub use medarot_core as core;

#[cfg(test)]
mod tests;
